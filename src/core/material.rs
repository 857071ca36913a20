//! Material dispatcher: a closed tagged union over concrete material
//! kinds, each producing a `Bsdf` (or a `Bssrdf` for subsurface), an
//! emitted radiance, an alpha test and an optional normal map. Grounded
//! on `original_source/include/bulbit/material.h`'s `Materials` type
//! pack and `DynamicDispatcher` pattern (spec.md §4.H).

use std::sync::Arc;

use crate::core::bssrdf::TabulatedBssrdf;
use crate::core::geometry::{Point2f, Vector3f};
use crate::core::interaction::Intersection;
use crate::core::pbrt::Float;
use crate::core::reflection::{
    Bsdf, Bxdf, FresnelSpecular, LambertianReflection, LayeredBxdf, MetallicRoughness,
    MicrofacetReflection, MicrofacetTransmission, SpecularReflection, ThinDielectric,
};
use crate::core::spectrum::Spectrum;
use crate::core::texture::{FloatTexture, SpectrumTexture};

/// Whether a ray carries radiance (camera → light) or importance
/// (light → camera); only affects the non-symmetry correction applied
/// to refraction (spec.md §4.G "Dielectric").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Radiance,
    Importance,
}

impl Default for TransportMode {
    fn default() -> Self {
        TransportMode::Radiance
    }
}

#[derive(Clone)]
pub struct DiffuseMaterial {
    pub albedo: Arc<SpectrumTexture>,
}

#[derive(Clone)]
pub struct MirrorMaterial {
    pub reflectance: Arc<SpectrumTexture>,
    pub eta: Spectrum,
    pub k: Spectrum,
}

#[derive(Clone)]
pub struct DielectricMaterial {
    pub eta: Float,
}

#[derive(Clone)]
pub struct ThinDielectricMaterial {
    pub eta: Float,
}

#[derive(Clone)]
pub struct ConductorMaterial {
    pub eta: Spectrum,
    pub k: Spectrum,
    pub roughness: Arc<FloatTexture>,
}

#[derive(Clone)]
pub struct MetallicRoughnessMaterial {
    pub basecolor: Arc<SpectrumTexture>,
    pub metallic: Arc<FloatTexture>,
    pub roughness: Arc<FloatTexture>,
}

#[derive(Clone)]
pub struct RoughDielectricMaterial {
    pub eta: Float,
    pub roughness: Arc<FloatTexture>,
}

#[derive(Clone)]
pub struct LayeredMaterial {
    pub coat_f0: Spectrum,
    pub coat_roughness: Arc<FloatTexture>,
    pub base_albedo: Arc<SpectrumTexture>,
}

#[derive(Clone)]
pub struct SubsurfaceMaterial {
    pub albedo: Arc<SpectrumTexture>,
    pub eta: Float,
    pub g: Float,
    pub mfp: Spectrum,
}

#[derive(Clone)]
pub struct DiffuseLightMaterial {
    pub emission: Arc<SpectrumTexture>,
    pub two_sided: bool,
}

/// Chooses deterministically between two child materials by hashing
/// `(point, wo)` against the mix amount, stable across bounces for the
/// same shading point (spec.md §4.H, Open Question resolved in
/// DESIGN.md).
#[derive(Clone)]
pub struct MixMaterial {
    pub amount: Float,
    pub a: Arc<Material>,
    pub b: Arc<Material>,
}

fn hash_point_dir(p: &crate::core::geometry::Point3f, wo: &Vector3f) -> u64 {
    let bits = [p.x, p.y, p.z, wo.x, wo.y, wo.z];
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for v in bits.iter() {
        h ^= v.to_bits() as u64;
        h = h.wrapping_mul(0x100_0000_01b3);
    }
    h
}

#[derive(Clone)]
pub enum Material {
    Diffuse(DiffuseMaterial),
    Mirror(MirrorMaterial),
    Dielectric(DielectricMaterial),
    ThinDielectric(ThinDielectricMaterial),
    Conductor(ConductorMaterial),
    MetallicRoughness(MetallicRoughnessMaterial),
    RoughDielectric(RoughDielectricMaterial),
    Layered(LayeredMaterial),
    Subsurface(SubsurfaceMaterial),
    DiffuseLight(DiffuseLightMaterial),
    Mix(MixMaterial),
}

impl Material {
    /// Builds the BSDF at this intersection, or `None` if the material
    /// carries no surface lobe here (e.g. a pure light with no BRDF).
    pub fn get_bsdf(&self, isect: &Intersection) -> Option<Bsdf> {
        let mut bsdf = Bsdf::new(isect.shading_normal, isect.geometric_normal);
        match self {
            Material::Diffuse(m) => {
                let r = m.albedo.evaluate(isect.uv);
                bsdf.add(Bxdf::Lambertian(LambertianReflection { r }));
            }
            Material::Mirror(m) => {
                let r = m.reflectance.evaluate(isect.uv);
                bsdf.add(Bxdf::SpecularReflection(SpecularReflection {
                    r,
                    eta: m.eta,
                    k: m.k,
                }));
            }
            Material::Dielectric(m) => {
                bsdf.add(Bxdf::FresnelSpecular(FresnelSpecular {
                    r: Spectrum::new(1.0),
                    t: Spectrum::new(1.0),
                    eta_a: 1.0,
                    eta_b: m.eta,
                    mode: TransportMode::Radiance,
                }));
            }
            Material::ThinDielectric(m) => {
                bsdf.add(Bxdf::ThinDielectric(ThinDielectric {
                    r: Spectrum::new(1.0),
                    t: Spectrum::new(1.0),
                    eta: m.eta,
                }));
            }
            Material::Conductor(m) => {
                let roughness = m.roughness.evaluate(isect.uv);
                bsdf.add(Bxdf::MicrofacetReflection(MicrofacetReflection::new(
                    Spectrum::new(1.0),
                    m.eta,
                    m.k,
                    roughness,
                )));
            }
            Material::MetallicRoughness(m) => {
                let basecolor = m.basecolor.evaluate(isect.uv);
                let metallic = m.metallic.evaluate(isect.uv);
                let roughness = m.roughness.evaluate(isect.uv);
                let f0 = crate::core::microfacet::f0_from_basecolor(basecolor, metallic);
                let diffuse = basecolor * (1.0 - metallic);
                bsdf.add(Bxdf::MetallicRoughness(MetallicRoughness::new(diffuse, f0, roughness)));
            }
            Material::RoughDielectric(m) => {
                let roughness = m.roughness.evaluate(isect.uv);
                bsdf.add(Bxdf::MicrofacetTransmission(MicrofacetTransmission::new(
                    Spectrum::new(1.0),
                    1.0,
                    m.eta,
                    roughness,
                    TransportMode::Radiance,
                )));
            }
            Material::Layered(m) => {
                let roughness = m.coat_roughness.evaluate(isect.uv);
                let base_albedo = m.base_albedo.evaluate(isect.uv);
                bsdf.add(Bxdf::Layered(LayeredBxdf {
                    coat: MicrofacetReflection::new(Spectrum::new(1.0), Spectrum::new(1.5), Spectrum::black(), roughness),
                    base: LambertianReflection { r: base_albedo },
                    coat_f0: m.coat_f0,
                }));
            }
            Material::Subsurface(m) => {
                let r = m.albedo.evaluate(isect.uv);
                bsdf.add(Bxdf::FresnelSpecular(FresnelSpecular {
                    r: Spectrum::new(1.0),
                    t: r,
                    eta_a: 1.0,
                    eta_b: m.eta,
                    mode: TransportMode::Radiance,
                }));
            }
            Material::DiffuseLight(_) => return None,
            Material::Mix(m) => {
                let h = hash_point_dir(&isect.point, &Vector3f::default());
                let u = (h as Float) / (u64::MAX as Float);
                let chosen = if u < m.amount { &m.a } else { &m.b };
                return chosen.get_bsdf(isect);
            }
        }
        Some(bsdf)
    }

    /// Separable-profile subsurface scattering, `None` for every other
    /// material kind (spec.md §4.G "Subsurface").
    pub fn get_bssrdf(&self, isect: &Intersection) -> Option<TabulatedBssrdf> {
        match self {
            Material::Subsurface(m) => Some(TabulatedBssrdf::new(m.eta, m.g, m.mfp, isect.point)),
            Material::Mix(m) => {
                let h = hash_point_dir(&isect.point, &Vector3f::default());
                let u = (h as Float) / (u64::MAX as Float);
                if u < m.amount {
                    m.a.get_bssrdf(isect)
                } else {
                    m.b.get_bssrdf(isect)
                }
            }
            _ => None,
        }
    }

    pub fn is_light_source(&self) -> bool {
        matches!(self, Material::DiffuseLight(_))
    }

    /// Emitted radiance towards `wi` at `isect`, zero for non-emissive
    /// materials and for the back face of a one-sided area light.
    pub fn emit(&self, isect: &Intersection, wi: &Vector3f) -> Spectrum {
        match self {
            Material::DiffuseLight(m) => {
                let facing = crate::core::geometry::vec3_dot_nrmf(&-*wi, &isect.geometric_normal) > 0.0;
                if facing || m.two_sided {
                    m.emission.evaluate(isect.uv)
                } else {
                    Spectrum::black()
                }
            }
            Material::Mix(m) => {
                let h = hash_point_dir(&isect.point, wi);
                let u = (h as Float) / (u64::MAX as Float);
                if u < m.amount {
                    m.a.emit(isect, wi)
                } else {
                    m.b.emit(isect, wi)
                }
            }
            _ => Spectrum::black(),
        }
    }

    pub fn test_alpha(&self, _uv: Point2f) -> bool {
        true
    }

    pub fn get_normal_map(&self) -> Option<Arc<SpectrumTexture>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Point3f, Vector3f};

    #[test]
    fn mix_material_selection_is_deterministic_at_same_point() {
        let p = Point3f::new(1.0, 2.0, 3.0);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let h1 = hash_point_dir(&p, &wo);
        let h2 = hash_point_dir(&p, &wo);
        assert_eq!(h1, h2);
    }
}
