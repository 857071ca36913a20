//! Subsurface scattering via the Christensen-Burley diffusion profile
//! (spec.md §4.G "Subsurface"); see `core::bssrdf` for the profile itself.

use std::sync::Arc;

use crate::core::material::{Material, SubsurfaceMaterial};
use crate::core::pbrt::Float;
use crate::core::spectrum::Spectrum;
use crate::core::texture::SpectrumTexture;

pub fn create(albedo: Arc<SpectrumTexture>, eta: Float, g: Float, mfp: Spectrum) -> Material {
    Material::Subsurface(SubsurfaceMaterial { albedo, eta, g, mfp })
}
