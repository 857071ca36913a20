//! Texture contract shared by `textures::{constant, image, checkerboard}`:
//! evaluate a value at a surface UV. Two closed tagged unions, one per
//! result type, rather than a generic `Texture<T>` trait object (spec.md
//! §4.F, §9 "Polymorphism without inheritance").

use crate::core::geometry::Point2f;
use crate::core::pbrt::Float;
use crate::core::spectrum::Spectrum;
use crate::textures::checkerboard::Checkerboard2D;
use crate::textures::constant::ConstantTexture;
use crate::textures::imagemap::ImageTexture;

#[derive(Clone)]
pub enum FloatTexture {
    Constant(ConstantTexture<Float>),
    Image(ImageTexture<Float>),
    Checkerboard(Checkerboard2D<FloatTexture>),
}

impl FloatTexture {
    pub fn constant(v: Float) -> Self {
        FloatTexture::Constant(ConstantTexture::new(v))
    }

    pub fn evaluate(&self, uv: Point2f) -> Float {
        match self {
            FloatTexture::Constant(t) => t.evaluate(uv),
            FloatTexture::Image(t) => t.evaluate(uv),
            FloatTexture::Checkerboard(t) => t.evaluate(uv),
        }
    }
}

#[derive(Clone)]
pub enum SpectrumTexture {
    Constant(ConstantTexture<Spectrum>),
    Image(ImageTexture<Spectrum>),
    Checkerboard(Checkerboard2D<SpectrumTexture>),
}

impl SpectrumTexture {
    pub fn constant(v: Spectrum) -> Self {
        SpectrumTexture::Constant(ConstantTexture::new(v))
    }

    pub fn evaluate(&self, uv: Point2f) -> Spectrum {
        match self {
            SpectrumTexture::Constant(t) => t.evaluate(uv),
            SpectrumTexture::Image(t) => t.evaluate(uv),
            SpectrumTexture::Checkerboard(t) => t.evaluate(uv),
        }
    }
}
