//! Emissive surface material backing area lights (spec.md §4.H `Le`).

use std::sync::Arc;

use crate::core::material::{DiffuseLightMaterial, Material};
use crate::core::texture::SpectrumTexture;

pub fn create(emission: Arc<SpectrumTexture>, two_sided: bool) -> Material {
    Material::DiffuseLight(DiffuseLightMaterial { emission, two_sided })
}
