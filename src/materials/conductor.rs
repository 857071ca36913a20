//! Rough conductor (spec.md §4.G "Conductor"): GGX NDF, height-correlated
//! Smith masking-shadowing, complex Fresnel.

use std::sync::Arc;

use crate::core::material::{ConductorMaterial, Material};
use crate::core::spectrum::Spectrum;
use crate::core::texture::FloatTexture;

pub fn create(eta: Spectrum, k: Spectrum, roughness: Arc<FloatTexture>) -> Material {
    Material::Conductor(ConductorMaterial { eta, k, roughness })
}
