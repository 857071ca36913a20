//! `ImageTexture` (spec.md §4.F): nearest-neighbor lookup over a decoded
//! image, cached by filename at construction. sRGB 8-bit channels decode
//! to linear as `(x/255)^2.2`.

use std::path::Path;
use std::sync::Arc;

use image::GenericImageView;

use crate::core::geometry::{Point2f, Point2i};
use crate::core::pbrt::Float;
use crate::core::spectrum::Spectrum;
use crate::error::{BuildResult, SceneBuildError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageWrap {
    Repeat,
    Clamp,
}

#[derive(Clone)]
pub struct ImageTexture<T> {
    resolution: Point2i,
    texels: Arc<Vec<T>>,
    wrap: ImageWrap,
}

fn srgb_to_linear(x: Float) -> Float {
    (x / 255.0).powf(2.2)
}

impl ImageTexture<Spectrum> {
    pub fn load(filename: &str, wrap: ImageWrap) -> BuildResult<Self> {
        let path = Path::new(filename);
        let img = image::open(path).map_err(|_| SceneBuildError::TextureDecode(filename.to_string()))?;
        let (w, h) = img.dimensions();
        let rgb = img.to_rgb8();
        let texels: Vec<Spectrum> = rgb
            .pixels()
            .map(|p| {
                Spectrum::rgb(
                    srgb_to_linear(p[0] as Float),
                    srgb_to_linear(p[1] as Float),
                    srgb_to_linear(p[2] as Float),
                )
            })
            .collect();
        Ok(ImageTexture {
            resolution: Point2i::new(w as i32, h as i32),
            texels: Arc::new(texels),
            wrap,
        })
    }
}

impl ImageTexture<Float> {
    pub fn load_luminance(filename: &str, wrap: ImageWrap) -> BuildResult<Self> {
        let spectrum_tex = ImageTexture::<Spectrum>::load(filename, wrap)?;
        let texels: Vec<Float> = spectrum_tex.texels.iter().map(|s| s.y()).collect();
        Ok(ImageTexture {
            resolution: spectrum_tex.resolution,
            texels: Arc::new(texels),
            wrap,
        })
    }
}

impl<T: Copy + Default> ImageTexture<T> {
    #[cfg(test)]
    pub(crate) fn from_texels(resolution: Point2i, texels: Vec<T>, wrap: ImageWrap) -> Self {
        ImageTexture { resolution, texels: Arc::new(texels), wrap }
    }

    fn wrap_coord(&self, i: i32, dim: i32) -> Option<i32> {
        match self.wrap {
            ImageWrap::Repeat => Some(i.rem_euclid(dim)),
            ImageWrap::Clamp => Some(i.clamp(0, dim - 1)),
        }
    }

    pub fn evaluate(&self, uv: Point2f) -> T {
        let x = (uv.x * self.resolution.x as Float).floor() as i32;
        let y = ((1.0 - uv.y) * self.resolution.y as Float).floor() as i32;
        match (
            self.wrap_coord(x, self.resolution.x),
            self.wrap_coord(y, self.resolution.y),
        ) {
            (Some(x), Some(y)) => {
                let idx = (y * self.resolution.x + x) as usize;
                self.texels.get(idx).copied().unwrap_or_default()
            }
            _ => T::default(),
        }
    }
}
