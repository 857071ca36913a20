//! Lambertian-only material (spec.md §4.G "Lambertian").

use std::sync::Arc;

use crate::core::material::{DiffuseMaterial, Material};
use crate::core::texture::SpectrumTexture;

pub fn create(albedo: Arc<SpectrumTexture>) -> Material {
    Material::Diffuse(DiffuseMaterial { albedo })
}
