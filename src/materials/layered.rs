//! Coat-over-base layered material (spec.md §4.G "Layered").

use std::sync::Arc;

use crate::core::material::{LayeredMaterial, Material};
use crate::core::spectrum::Spectrum;
use crate::core::texture::{FloatTexture, SpectrumTexture};

pub fn create(coat_f0: Spectrum, coat_roughness: Arc<FloatTexture>, base_albedo: Arc<SpectrumTexture>) -> Material {
    Material::Layered(LayeredMaterial {
        coat_f0,
        coat_roughness,
        base_albedo,
    })
}
