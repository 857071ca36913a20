//! 2-D checkerboard pattern between two child textures, UV-tiled
//! (spec.md §4.F, `textures::checkerboard`).

use crate::core::geometry::Point2f;
use crate::core::pbrt::Float;
use crate::core::texture::{FloatTexture, SpectrumTexture};
use std::sync::Arc;

#[derive(Clone)]
pub struct Checkerboard2D<T> {
    pub tex1: Arc<T>,
    pub tex2: Arc<T>,
    pub u_scale: Float,
    pub v_scale: Float,
}

macro_rules! impl_checkerboard {
    ($texture_ty:ty, $out:ty) => {
        impl Checkerboard2D<$texture_ty> {
            pub fn new(tex1: Arc<$texture_ty>, tex2: Arc<$texture_ty>, u_scale: Float, v_scale: Float) -> Self {
                Checkerboard2D { tex1, tex2, u_scale, v_scale }
            }

            pub fn evaluate(&self, uv: Point2f) -> $out {
                let u = uv.x * self.u_scale;
                let v = uv.y * self.v_scale;
                if (u.floor() as i64 + v.floor() as i64) % 2 == 0 {
                    self.tex1.evaluate(uv)
                } else {
                    self.tex2.evaluate(uv)
                }
            }
        }
    };
}

impl_checkerboard!(FloatTexture, Float);
impl_checkerboard!(SpectrumTexture, crate::core::spectrum::Spectrum);
