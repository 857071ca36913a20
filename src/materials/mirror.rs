//! Perfectly specular conductor (spec.md §4.G "Mirror"): a `Conductor`
//! material with zero roughness, kept as its own builder for the common
//! mirror-via-default-aluminum-IOR case the teacher's `mirror.h` covered.

use std::sync::Arc;

use crate::core::material::{ConductorMaterial, Material};
use crate::core::spectrum::Spectrum;
use crate::core::texture::FloatTexture;

pub fn create() -> Material {
    Material::Conductor(ConductorMaterial {
        eta: Spectrum::rgb(0.2, 0.92, 1.1),
        k: Spectrum::rgb(3.9, 2.45, 2.14),
        roughness: Arc::new(FloatTexture::constant(0.0)),
    })
}

pub fn create_with_ior(eta: Spectrum, k: Spectrum) -> Material {
    Material::Conductor(ConductorMaterial {
        eta,
        k,
        roughness: Arc::new(FloatTexture::constant(0.0)),
    })
}
