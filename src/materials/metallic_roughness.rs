//! glTF-style metallic/roughness workflow (spec.md §4.G "Microfacet
//! (GGX / GGX-VNDF)"): Cook-Torrance specular mixed with Lambertian diffuse
//! by a Schlick-derived sampling weight.

use std::sync::Arc;

use crate::core::material::{Material, MetallicRoughnessMaterial};
use crate::core::texture::{FloatTexture, SpectrumTexture};

pub fn create(
    basecolor: Arc<SpectrumTexture>,
    metallic: Arc<FloatTexture>,
    roughness: Arc<FloatTexture>,
) -> Material {
    Material::MetallicRoughness(MetallicRoughnessMaterial {
        basecolor,
        metallic,
        roughness,
    })
}
