//! Smooth and rough dielectric interfaces (spec.md §4.G "Dielectric",
//! "Thin dielectric").

use std::sync::Arc;

use crate::core::material::{DielectricMaterial, Material, RoughDielectricMaterial, ThinDielectricMaterial};
use crate::core::pbrt::Float;
use crate::core::texture::FloatTexture;

pub fn create(eta: Float) -> Material {
    Material::Dielectric(DielectricMaterial { eta })
}

pub fn create_thin(eta: Float) -> Material {
    Material::ThinDielectric(ThinDielectricMaterial { eta })
}

pub fn create_rough(eta: Float, roughness: Arc<FloatTexture>) -> Material {
    Material::RoughDielectric(RoughDielectricMaterial { eta, roughness })
}
