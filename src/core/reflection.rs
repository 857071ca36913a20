//! BSDF lobes. The closed set of surface scattering models named in
//! SPEC_FULL.md §4.A: a perfectly diffuse lobe, a specular mirror, a
//! smooth dielectric (Fresnel-split reflect/refract), a thin dielectric,
//! a rough conductor and a rough dielectric built on the GGX/VNDF
//! machinery in `microfacet.rs`. Dispatch is a closed tagged union
//! rather than a trait object, matching the teacher's `Bxdf` enum.

use crate::core::geometry::{
    nrm_faceforward_vec3, vec3_dot_vec3f, vec3_same_hemisphere_vec3, Normal3f, Point2f, Vector3f,
};
use crate::core::material::TransportMode;
use crate::core::microfacet::{
    d_ggx, fresnel_schlick, g2_smith_correlated, ggx_vndf_pdf, roughness_to_alpha,
    sample_ggx_vndf_spherical_caps,
};
use crate::core::pbrt::{clamp_t, Float, INV_PI};
use crate::core::sampling::cosine_sample_hemisphere;
use crate::core::spectrum::Spectrum;

#[inline]
pub fn cos_theta(w: &Vector3f) -> Float {
    w.z
}

#[inline]
pub fn abs_cos_theta(w: &Vector3f) -> Float {
    w.z.abs()
}

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum BxdfType {
    BsdfReflection = 1,
    BsdfTransmission = 2,
    BsdfDiffuse = 4,
    BsdfGlossy = 8,
    BsdfSpecular = 16,
    BsdfAll = 31,
}

/// Reflects `wo` perfectly about the local shading normal (`+z`).
fn specular_reflect_local(wo: &Vector3f) -> Vector3f {
    Vector3f::new(-wo.x, -wo.y, wo.z)
}

/// Refracts `wo` through the local shading normal with relative IOR `eta`
/// (incident-over-transmitted), returning `None` on total internal
/// reflection.
fn refract_local(wo: &Vector3f, eta: Float) -> Option<Vector3f> {
    let n = nrm_faceforward_vec3(&Normal3f::new(0.0, 0.0, 1.0), wo);
    crate::core::geometry::refract(wo, &n, eta)
}

pub fn fr_dielectric(cos_theta_i: Float, eta_i: Float, eta_t: Float) -> Float {
    let mut cos_theta_i = clamp_t(cos_theta_i, -1.0, 1.0);
    let entering = cos_theta_i > 0.0;
    let (mut ei, mut et) = (eta_i, eta_t);
    if !entering {
        std::mem::swap(&mut ei, &mut et);
        cos_theta_i = cos_theta_i.abs();
    }
    let sin_theta_i = (1.0 - cos_theta_i * cos_theta_i).max(0.0).sqrt();
    let sin_theta_t = ei / et * sin_theta_i;
    if sin_theta_t >= 1.0 {
        return 1.0;
    }
    let cos_theta_t = (1.0 - sin_theta_t * sin_theta_t).max(0.0).sqrt();
    let r_parl = (et * cos_theta_i - ei * cos_theta_t) / (et * cos_theta_i + ei * cos_theta_t);
    let r_perp = (ei * cos_theta_i - et * cos_theta_t) / (ei * cos_theta_i + et * cos_theta_t);
    (r_parl * r_parl + r_perp * r_perp) / 2.0
}

pub fn fr_conductor(cos_theta_i: Float, eta: Spectrum, k: Spectrum) -> Spectrum {
    let cos_theta_i = clamp_t(cos_theta_i, 0.0, 1.0);
    let cos2 = cos_theta_i * cos_theta_i;
    let sin2 = 1.0 - cos2;
    let eta2 = eta * eta;
    let k2 = k * k;
    let t0 = eta2 - k2 - Spectrum::new(sin2);
    let a2plusb2 = (t0 * t0 + eta2 * k2 * Spectrum::new(4.0)).sqrt();
    let t1 = a2plusb2 + Spectrum::new(cos2);
    let a = ((a2plusb2 + t0) * Spectrum::new(0.5)).sqrt();
    let t2 = a * Spectrum::new(2.0 * cos_theta_i);
    let rs = (t1 - t2) / (t1 + t2);
    let t3 = a2plusb2 * Spectrum::new(cos2) + Spectrum::new(sin2 * sin2);
    let t4 = t2 * Spectrum::new(sin2);
    let rp = rs * (t3 - t4) / (t3 + t4);
    (rp + rs) * Spectrum::new(0.5)
}

#[derive(Debug, Default, Copy, Clone)]
pub struct LambertianReflection {
    pub r: Spectrum,
}

impl LambertianReflection {
    pub fn f(&self, _wo: &Vector3f, _wi: &Vector3f) -> Spectrum {
        self.r * INV_PI
    }
    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> (Vector3f, Float, Spectrum) {
        let mut wi = cosine_sample_hemisphere(u);
        if wo.z < 0.0 {
            wi.z *= -1.0;
        }
        let pdf = self.pdf(wo, &wi);
        (wi, pdf, self.f(wo, &wi))
    }
    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if vec3_same_hemisphere_vec3(wo, wi) {
            abs_cos_theta(wi) * INV_PI
        } else {
            0.0
        }
    }
    pub fn get_type(&self) -> u8 {
        BxdfType::BsdfDiffuse as u8 | BxdfType::BsdfReflection as u8
    }
}

/// Perfect mirror, Fresnel-weighted by a conductor's complex IOR
/// (`eta`, `k`) so a single lobe covers both plain mirrors (`k` large)
/// and colored metals.
#[derive(Debug, Default, Copy, Clone)]
pub struct SpecularReflection {
    pub r: Spectrum,
    pub eta: Spectrum,
    pub k: Spectrum,
}

impl SpecularReflection {
    pub fn f(&self, _wo: &Vector3f, _wi: &Vector3f) -> Spectrum {
        Spectrum::black()
    }
    pub fn sample_f(&self, wo: &Vector3f) -> (Vector3f, Float, Spectrum) {
        let wi = specular_reflect_local(wo);
        let fr = fr_conductor(abs_cos_theta(&wi), self.eta, self.k);
        (wi, 1.0, self.r * fr / abs_cos_theta(&wi))
    }
    pub fn pdf(&self, _wo: &Vector3f, _wi: &Vector3f) -> Float {
        0.0
    }
    pub fn get_type(&self) -> u8 {
        BxdfType::BsdfReflection as u8 | BxdfType::BsdfSpecular as u8
    }
}

/// Smooth dielectric: one lobe, stochastically reflect or refract with
/// probability given by `fr_dielectric` (spec.md §4.A "Dielectric").
#[derive(Debug, Default, Copy, Clone)]
pub struct FresnelSpecular {
    pub r: Spectrum,
    pub t: Spectrum,
    pub eta_a: Float,
    pub eta_b: Float,
    pub mode: TransportMode,
}

impl FresnelSpecular {
    pub fn f(&self, _wo: &Vector3f, _wi: &Vector3f) -> Spectrum {
        Spectrum::black()
    }
    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> (Vector3f, Float, Spectrum) {
        let f = fr_dielectric(cos_theta(wo), self.eta_a, self.eta_b);
        if u.x < f {
            let wi = specular_reflect_local(wo);
            (wi, f, self.r * f / abs_cos_theta(&wi))
        } else {
            let entering = cos_theta(wo) > 0.0;
            let (eta_i, eta_t) = if entering {
                (self.eta_a, self.eta_b)
            } else {
                (self.eta_b, self.eta_a)
            };
            match refract_local(wo, eta_i / eta_t) {
                None => (Vector3f::default(), 0.0, Spectrum::black()),
                Some(wi) => {
                    let mut ft = self.t * (1.0 - f);
                    if self.mode == TransportMode::Radiance {
                        ft *= (eta_i * eta_i) / (eta_t * eta_t);
                    }
                    (wi, 1.0 - f, ft / abs_cos_theta(&wi))
                }
            }
        }
    }
    pub fn pdf(&self, _wo: &Vector3f, _wi: &Vector3f) -> Float {
        0.0
    }
    pub fn get_type(&self) -> u8 {
        BxdfType::BsdfReflection as u8 | BxdfType::BsdfTransmission as u8 | BxdfType::BsdfSpecular as u8
    }
}

/// Thin dielectric slab: no refraction, only a view-dependent reflect/
/// transmit split that accounts for internal inter-reflection between
/// the two interfaces (spec.md §4.A "ThinDielectric").
#[derive(Debug, Default, Copy, Clone)]
pub struct ThinDielectric {
    pub r: Spectrum,
    pub t: Spectrum,
    pub eta: Float,
}

impl ThinDielectric {
    pub fn f(&self, _wo: &Vector3f, _wi: &Vector3f) -> Spectrum {
        Spectrum::black()
    }
    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> (Vector3f, Float, Spectrum) {
        let mut f = fr_dielectric(cos_theta(wo).abs(), 1.0, self.eta);
        if f < 1.0 {
            f += (1.0 - f) * (1.0 - f) * f / (1.0 - f * f);
        }
        if u.x < f {
            let wi = specular_reflect_local(wo);
            (wi, f, self.r * f / abs_cos_theta(&wi))
        } else {
            let wi = -*wo;
            (wi, 1.0 - f, self.t * (1.0 - f) / abs_cos_theta(&wi))
        }
    }
    pub fn pdf(&self, _wo: &Vector3f, _wi: &Vector3f) -> Float {
        0.0
    }
    pub fn get_type(&self) -> u8 {
        BxdfType::BsdfReflection as u8 | BxdfType::BsdfTransmission as u8 | BxdfType::BsdfSpecular as u8
    }
}

/// Rough conductor: GGX distribution, height-correlated Smith masking,
/// visible-normal sampling (spec.md §4.A "Conductor").
#[derive(Debug, Default, Copy, Clone)]
pub struct MicrofacetReflection {
    pub r: Spectrum,
    pub eta: Spectrum,
    pub k: Spectrum,
    pub alpha: Float,
}

impl MicrofacetReflection {
    pub fn new(r: Spectrum, eta: Spectrum, k: Spectrum, roughness: Float) -> Self {
        MicrofacetReflection {
            r,
            eta,
            k,
            alpha: roughness_to_alpha(roughness),
        }
    }

    pub fn f(&self, wo: &Vector3f, wi: &Vector3f) -> Spectrum {
        let n_o_v = abs_cos_theta(wo);
        let n_o_l = abs_cos_theta(wi);
        if n_o_v == 0.0 || n_o_l == 0.0 {
            return Spectrum::black();
        }
        let wh = *wo + *wi;
        if wh.length_squared() == 0.0 {
            return Spectrum::black();
        }
        let wh = wh.normalize();
        let alpha2 = self.alpha * self.alpha;
        let d = d_ggx(wh.z.abs(), alpha2);
        let g = g2_smith_correlated(n_o_v, n_o_l, alpha2);
        let fr = fr_conductor(vec3_dot_vec3f(wo, &wh).abs(), self.eta, self.k);
        self.r * fr * (d * g / (4.0 * n_o_v * n_o_l))
    }

    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> (Vector3f, Float, Spectrum) {
        if wo.z == 0.0 {
            return (Vector3f::default(), 0.0, Spectrum::black());
        }
        let wh = sample_ggx_vndf_spherical_caps(wo, self.alpha, self.alpha, u);
        let wi = crate::core::geometry::reflect(wo, &wh);
        if !vec3_same_hemisphere_vec3(wo, &wi) {
            return (wi, 0.0, Spectrum::black());
        }
        let pdf = self.pdf(wo, &wi);
        (wi, pdf, self.f(wo, &wi))
    }

    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if !vec3_same_hemisphere_vec3(wo, wi) {
            return 0.0;
        }
        let wh = (*wo + *wi);
        if wh.length_squared() == 0.0 {
            return 0.0;
        }
        let wh = wh.normalize();
        let alpha2 = self.alpha * self.alpha;
        ggx_vndf_pdf(wo, &wh, alpha2) / (4.0 * vec3_dot_vec3f(wo, &wh).abs())
    }

    pub fn get_type(&self) -> u8 {
        BxdfType::BsdfReflection as u8 | BxdfType::BsdfGlossy as u8
    }
}

/// Cook-Torrance specular lobe plus a Lambertian diffuse lobe, picked
/// stochastically by a Schlick-derived weight `t` (spec.md §4.A
/// "Microfacet (GGX / GGX-VNDF)"). Uses the classical (non-visible)
/// half-vector sampler, matching the spec's `D·NoH/(4·LoH)` PDF term.
#[derive(Debug, Default, Copy, Clone)]
pub struct MetallicRoughness {
    pub diffuse: Spectrum,
    pub f0: Spectrum,
    pub alpha: Float,
    pub specular_weight: Float,
}

impl MetallicRoughness {
    pub fn new(diffuse: Spectrum, f0: Spectrum, roughness: Float) -> Self {
        let t = fresnel_schlick(f0, 1.0).average().max(0.15).min(0.9);
        MetallicRoughness {
            diffuse,
            f0,
            alpha: roughness_to_alpha(roughness),
            specular_weight: t,
        }
    }

    pub fn f(&self, wo: &Vector3f, wi: &Vector3f) -> Spectrum {
        if !vec3_same_hemisphere_vec3(wo, wi) {
            return Spectrum::black();
        }
        let n_o_v = abs_cos_theta(wo);
        let n_o_l = abs_cos_theta(wi);
        if n_o_v == 0.0 || n_o_l == 0.0 {
            return Spectrum::black();
        }
        let wh = *wo + *wi;
        let spec = if wh.length_squared() > 0.0 {
            let wh = wh.normalize();
            let alpha2 = self.alpha * self.alpha;
            let d = d_ggx(wh.z.abs(), alpha2);
            let g = g2_smith_correlated(n_o_v, n_o_l, alpha2);
            let fr = fresnel_schlick(self.f0, vec3_dot_vec3f(wo, &wh).abs());
            fr * (d * g / (4.0 * n_o_v * n_o_l))
        } else {
            Spectrum::black()
        };
        let diff = self.diffuse * INV_PI * (Spectrum::new(1.0) - fresnel_schlick(self.f0, n_o_v));
        spec + diff
    }

    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> (Vector3f, Float, Spectrum) {
        if wo.z == 0.0 {
            return (Vector3f::default(), 0.0, Spectrum::black());
        }
        let t = self.specular_weight;
        let wi = if u.x < t {
            let remapped = Point2f::new((u.x / t).min(crate::core::rng::FLOAT_ONE_MINUS_EPSILON), u.y);
            let wh = crate::core::microfacet::sample_ggx_distribution(self.alpha, self.alpha, &remapped);
            crate::core::geometry::reflect(wo, &wh)
        } else {
            let remapped = Point2f::new(
                ((u.x - t) / (1.0 - t)).min(crate::core::rng::FLOAT_ONE_MINUS_EPSILON),
                u.y,
            );
            let mut d = cosine_sample_hemisphere(&remapped);
            if wo.z < 0.0 {
                d.z *= -1.0;
            }
            d
        };
        if !vec3_same_hemisphere_vec3(wo, &wi) {
            return (wi, 0.0, Spectrum::black());
        }
        let pdf = self.pdf(wo, &wi);
        (wi, pdf, self.f(wo, &wi))
    }

    /// `(1−t)·cosθ/π + t·D·NoH/(4·LoH)`, per spec.md §4.A.
    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if !vec3_same_hemisphere_vec3(wo, wi) {
            return 0.0;
        }
        let t = self.specular_weight;
        let diffuse_pdf = abs_cos_theta(wi) * INV_PI;
        let wh = *wo + *wi;
        let spec_pdf = if wh.length_squared() > 0.0 {
            let wh = wh.normalize();
            let alpha2 = self.alpha * self.alpha;
            let l_o_h = vec3_dot_vec3f(wi, &wh).abs();
            if l_o_h > 0.0 {
                d_ggx(wh.z.abs(), alpha2) * wh.z.abs() / (4.0 * l_o_h)
            } else {
                0.0
            }
        } else {
            0.0
        };
        (1.0 - t) * diffuse_pdf + t * spec_pdf
    }

    pub fn get_type(&self) -> u8 {
        BxdfType::BsdfReflection as u8 | BxdfType::BsdfGlossy as u8 | BxdfType::BsdfDiffuse as u8
    }
}

/// Rough dielectric: same GGX machinery, transmission lobe split by
/// Fresnel like `FresnelSpecular` but evaluable (non-specular), per
/// spec.md §4.A "Conductor/Dielectric roughness generalization".
#[derive(Debug, Default, Copy, Clone)]
pub struct MicrofacetTransmission {
    pub t: Spectrum,
    pub eta_a: Float,
    pub eta_b: Float,
    pub alpha: Float,
    pub mode: TransportMode,
}

impl MicrofacetTransmission {
    pub fn new(t: Spectrum, eta_a: Float, eta_b: Float, roughness: Float, mode: TransportMode) -> Self {
        MicrofacetTransmission {
            t,
            eta_a,
            eta_b,
            alpha: roughness_to_alpha(roughness),
            mode,
        }
    }

    pub fn f(&self, wo: &Vector3f, wi: &Vector3f) -> Spectrum {
        if vec3_same_hemisphere_vec3(wo, wi) {
            return Spectrum::black();
        }
        let cos_o = cos_theta(wo);
        let cos_i = cos_theta(wi);
        if cos_o == 0.0 || cos_i == 0.0 {
            return Spectrum::black();
        }
        let eta = if cos_o > 0.0 {
            self.eta_b / self.eta_a
        } else {
            self.eta_a / self.eta_b
        };
        let mut wh = *wo + *wi * eta;
        if wh.length_squared() == 0.0 {
            return Spectrum::black();
        }
        wh = wh.normalize();
        if wh.z < 0.0 {
            wh = -wh;
        }
        let f = fr_dielectric(vec3_dot_vec3f(wo, &wh), self.eta_a, self.eta_b);
        let alpha2 = self.alpha * self.alpha;
        let d = d_ggx(wh.z.abs(), alpha2);
        let g = g2_smith_correlated(cos_o.abs(), cos_i.abs(), alpha2);
        let sqrt_denom = vec3_dot_vec3f(wo, &wh) + eta * vec3_dot_vec3f(wi, &wh);
        let factor = if self.mode == TransportMode::Radiance { 1.0 / eta } else { 1.0 };
        self.t
            * ((1.0 - f) * d * g * eta * eta * (vec3_dot_vec3f(wi, &wh) * vec3_dot_vec3f(wo, &wh)).abs()
                * factor
                * factor
                / (cos_i * cos_o * sqrt_denom * sqrt_denom))
                .abs()
    }

    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> (Vector3f, Float, Spectrum) {
        if wo.z == 0.0 {
            return (Vector3f::default(), 0.0, Spectrum::black());
        }
        let wh = sample_ggx_vndf_spherical_caps(wo, self.alpha, self.alpha, u);
        let entering = cos_theta(wo) > 0.0;
        let (eta_i, eta_t) = if entering {
            (self.eta_a, self.eta_b)
        } else {
            (self.eta_b, self.eta_a)
        };
        match crate::core::geometry::refract(wo, &nrm_faceforward_vec3(&wh, wo), eta_i / eta_t) {
            None => (Vector3f::default(), 0.0, Spectrum::black()),
            Some(wi) => {
                let pdf = self.pdf(wo, &wi);
                (wi, pdf, self.f(wo, &wi))
            }
        }
    }

    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if vec3_same_hemisphere_vec3(wo, wi) {
            return 0.0;
        }
        let cos_o = cos_theta(wo);
        let eta = if cos_o > 0.0 {
            self.eta_b / self.eta_a
        } else {
            self.eta_a / self.eta_b
        };
        let mut wh = *wo + *wi * eta;
        if wh.length_squared() == 0.0 {
            return 0.0;
        }
        wh = wh.normalize();
        if wh.z < 0.0 {
            wh = -wh;
        }
        let alpha2 = self.alpha * self.alpha;
        let sqrt_denom = vec3_dot_vec3f(wo, &wh) + eta * vec3_dot_vec3f(wi, &wh);
        let dwh_dwi = (eta * eta * vec3_dot_vec3f(wi, &wh)).abs() / (sqrt_denom * sqrt_denom);
        ggx_vndf_pdf(wo, &wh, alpha2) * dwh_dwi
    }

    pub fn get_type(&self) -> u8 {
        BxdfType::BsdfTransmission as u8 | BxdfType::BsdfGlossy as u8
    }
}

/// One or two microfacet lobes stacked with an energy-conserving weight
/// (Fresnel-Schlick blend), the `Layered` entry of spec.md §4.A, e.g. a
/// clear-coat dielectric atop a diffuse or conductor base.
#[derive(Debug, Default, Copy, Clone)]
pub struct LayeredBxdf {
    pub coat: MicrofacetReflection,
    pub base: LambertianReflection,
    pub coat_f0: Spectrum,
}

impl LayeredBxdf {
    pub fn f(&self, wo: &Vector3f, wi: &Vector3f) -> Spectrum {
        let coat_f = self.coat.f(wo, wi);
        let weight = fresnel_schlick(self.coat_f0, abs_cos_theta(wo).max(abs_cos_theta(wi)));
        let base_f = self.base.f(wo, wi);
        coat_f + base_f * (Spectrum::new(1.0) - weight)
    }
    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> (Vector3f, Float, Spectrum) {
        let weight = fresnel_schlick(self.coat_f0, abs_cos_theta(wo)).average();
        if u.x < weight {
            let remapped = Point2f::new((u.x / weight).min(0.999_999), u.y);
            let (wi, pdf, f) = self.coat.sample_f(wo, &remapped);
            (wi, pdf * weight, f)
        } else {
            let remapped = Point2f::new(((u.x - weight) / (1.0 - weight)).min(0.999_999), u.y);
            let (wi, pdf, f) = self.base.sample_f(wo, &remapped);
            (wi, pdf * (1.0 - weight), f * (Spectrum::new(1.0) - fresnel_schlick(self.coat_f0, abs_cos_theta(&wi))))
        }
    }
    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        let weight = fresnel_schlick(self.coat_f0, abs_cos_theta(wo)).average();
        weight * self.coat.pdf(wo, wi) + (1.0 - weight) * self.base.pdf(wo, wi)
    }
    pub fn get_type(&self) -> u8 {
        BxdfType::BsdfReflection as u8 | BxdfType::BsdfGlossy as u8 | BxdfType::BsdfDiffuse as u8
    }
}

#[derive(Copy, Clone)]
pub enum Bxdf {
    Lambertian(LambertianReflection),
    SpecularReflection(SpecularReflection),
    FresnelSpecular(FresnelSpecular),
    ThinDielectric(ThinDielectric),
    MicrofacetReflection(MicrofacetReflection),
    MicrofacetTransmission(MicrofacetTransmission),
    MetallicRoughness(MetallicRoughness),
    Layered(LayeredBxdf),
}

impl Bxdf {
    pub fn matches_flags(&self, t: u8) -> bool {
        self.get_type() & t == self.get_type()
    }

    pub fn get_type(&self) -> u8 {
        match self {
            Bxdf::Lambertian(b) => b.get_type(),
            Bxdf::SpecularReflection(b) => b.get_type(),
            Bxdf::FresnelSpecular(b) => b.get_type(),
            Bxdf::ThinDielectric(b) => b.get_type(),
            Bxdf::MicrofacetReflection(b) => b.get_type(),
            Bxdf::MicrofacetTransmission(b) => b.get_type(),
            Bxdf::MetallicRoughness(b) => b.get_type(),
            Bxdf::Layered(b) => b.get_type(),
        }
    }

    pub fn is_specular(&self) -> bool {
        self.get_type() & BxdfType::BsdfSpecular as u8 != 0
    }

    /// Widens an already-rough glossy lobe's alpha to a firefly-damping
    /// floor; delta lobes are left untouched.
    pub fn regularize(&mut self) {
        const MIN_ALPHA: Float = 0.3;
        match self {
            Bxdf::MicrofacetReflection(b) => b.alpha = b.alpha.max(MIN_ALPHA),
            Bxdf::MicrofacetTransmission(b) => b.alpha = b.alpha.max(MIN_ALPHA),
            Bxdf::MetallicRoughness(b) => b.alpha = b.alpha.max(MIN_ALPHA),
            Bxdf::Layered(b) => b.coat.alpha = b.coat.alpha.max(MIN_ALPHA),
            _ => {}
        }
    }

    pub fn f(&self, wo: &Vector3f, wi: &Vector3f) -> Spectrum {
        match self {
            Bxdf::Lambertian(b) => b.f(wo, wi),
            Bxdf::SpecularReflection(b) => b.f(wo, wi),
            Bxdf::FresnelSpecular(b) => b.f(wo, wi),
            Bxdf::ThinDielectric(b) => b.f(wo, wi),
            Bxdf::MicrofacetReflection(b) => b.f(wo, wi),
            Bxdf::MicrofacetTransmission(b) => b.f(wo, wi),
            Bxdf::MetallicRoughness(b) => b.f(wo, wi),
            Bxdf::Layered(b) => b.f(wo, wi),
        }
    }

    /// Returns `(wi, pdf, f)` in the local shading frame.
    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> (Vector3f, Float, Spectrum) {
        match self {
            Bxdf::Lambertian(b) => b.sample_f(wo, u),
            Bxdf::SpecularReflection(b) => b.sample_f(wo),
            Bxdf::FresnelSpecular(b) => b.sample_f(wo, u),
            Bxdf::ThinDielectric(b) => b.sample_f(wo, u),
            Bxdf::MicrofacetReflection(b) => b.sample_f(wo, u),
            Bxdf::MicrofacetTransmission(b) => b.sample_f(wo, u),
            Bxdf::MetallicRoughness(b) => b.sample_f(wo, u),
            Bxdf::Layered(b) => b.sample_f(wo, u),
        }
    }

    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        match self {
            Bxdf::Lambertian(b) => b.pdf(wo, wi),
            Bxdf::SpecularReflection(b) => b.pdf(wo, wi),
            Bxdf::FresnelSpecular(b) => b.pdf(wo, wi),
            Bxdf::ThinDielectric(b) => b.pdf(wo, wi),
            Bxdf::MicrofacetReflection(b) => b.pdf(wo, wi),
            Bxdf::MicrofacetTransmission(b) => b.pdf(wo, wi),
            Bxdf::MetallicRoughness(b) => b.pdf(wo, wi),
            Bxdf::Layered(b) => b.pdf(wo, wi),
        }
    }
}

const MAX_BXDFS: usize = 4;

/// Holds the local shading frame plus the stacked `Bxdf` lobes for one
/// surface point, matching the teacher's `Bsdf` container shape
/// (`world_to_local`/`local_to_world`, flag-filtered `f`/`sample_f`/`pdf`).
#[derive(Clone)]
pub struct Bsdf {
    pub frame: crate::core::geometry::Frame,
    pub geometric_normal: Normal3f,
    pub bxdfs: smallvec::SmallVec<[Bxdf; MAX_BXDFS]>,
}

impl Bsdf {
    pub fn new(shading_normal: Normal3f, geometric_normal: Normal3f) -> Self {
        let frame = crate::core::geometry::Frame::from_normal(&shading_normal);
        Bsdf {
            frame,
            geometric_normal,
            bxdfs: smallvec::SmallVec::new(),
        }
    }

    pub fn add(&mut self, b: Bxdf) {
        self.bxdfs.push(b);
    }

    fn world_to_local(&self, v: &Vector3f) -> Vector3f {
        self.frame.to_local(v)
    }

    fn local_to_world(&self, v: &Vector3f) -> Vector3f {
        self.frame.to_world(v)
    }

    pub fn f(&self, wo_world: &Vector3f, wi_world: &Vector3f) -> Spectrum {
        let wo = self.world_to_local(wo_world);
        let wi = self.world_to_local(wi_world);
        if wo.z == 0.0 {
            return Spectrum::black();
        }
        let reflect = vec3_dot_vec3f(wi_world, &self.geometric_normal)
            * vec3_dot_vec3f(wo_world, &self.geometric_normal)
            > 0.0;
        let mut f = Spectrum::black();
        for bxdf in &self.bxdfs {
            let refl = bxdf.get_type() & BxdfType::BsdfReflection as u8 != 0;
            let trans = bxdf.get_type() & BxdfType::BsdfTransmission as u8 != 0;
            if (reflect && refl) || (!reflect && trans) {
                f += bxdf.f(&wo, &wi);
            }
        }
        f
    }

    /// Returns `(wi_world, pdf, f, is_specular)`, or `None` if nothing
    /// could be sampled.
    pub fn sample_f(&self, wo_world: &Vector3f, u: &Point2f) -> Option<(Vector3f, Float, Spectrum, bool)> {
        if self.bxdfs.is_empty() {
            return None;
        }
        let comp = ((u.x * self.bxdfs.len() as Float) as usize).min(self.bxdfs.len() - 1);
        let bxdf = &self.bxdfs[comp];
        let u_remapped = Point2f::new(
            (u.x * self.bxdfs.len() as Float - comp as Float).min(crate::core::rng::FLOAT_ONE_MINUS_EPSILON),
            u.y,
        );
        let wo = self.world_to_local(wo_world);
        if wo.z == 0.0 {
            return None;
        }
        let (wi, mut pdf, mut f) = bxdf.sample_f(&wo, &u_remapped);
        if pdf == 0.0 {
            return None;
        }
        let wi_world = self.local_to_world(&wi);
        let specular = bxdf.is_specular();
        if !specular && self.bxdfs.len() > 1 {
            for (i, other) in self.bxdfs.iter().enumerate() {
                if i != comp {
                    pdf += other.pdf(&wo, &wi);
                }
            }
            pdf /= self.bxdfs.len() as Float;

            let reflect = vec3_dot_vec3f(&wi_world, &self.geometric_normal)
                * vec3_dot_vec3f(wo_world, &self.geometric_normal)
                > 0.0;
            f = Spectrum::black();
            for other in &self.bxdfs {
                let refl = other.get_type() & BxdfType::BsdfReflection as u8 != 0;
                let trans = other.get_type() & BxdfType::BsdfTransmission as u8 != 0;
                if (reflect && refl) || (!reflect && trans) {
                    f += other.f(&wo, &wi);
                }
            }
        }
        Some((wi_world, pdf, f, specular))
    }

    pub fn pdf(&self, wo_world: &Vector3f, wi_world: &Vector3f) -> Float {
        if self.bxdfs.is_empty() {
            return 0.0;
        }
        let wo = self.world_to_local(wo_world);
        let wi = self.world_to_local(wi_world);
        if wo.z == 0.0 {
            return 0.0;
        }
        let sum: Float = self.bxdfs.iter().map(|b| b.pdf(&wo, &wi)).sum();
        sum / self.bxdfs.len() as Float
    }

    pub fn num_specular(&self) -> usize {
        self.bxdfs.iter().filter(|b| b.is_specular()).count()
    }

    pub fn regularize(&mut self) {
        for bxdf in &mut self.bxdfs {
            bxdf.regularize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lambertian_energy_conserving_below_one() {
        let bxdf = LambertianReflection { r: Spectrum::new(0.8) };
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        let f = bxdf.f(&wo, &wi);
        assert!(f.max_component() < 1.0);
    }

    #[test]
    fn fresnel_dielectric_is_total_internal_reflection_past_critical_angle() {
        // grazing ray from glass (eta=1.5) into air: expect near-total reflection
        let f = fr_dielectric(0.05, 1.5, 1.0);
        assert!(f > 0.9);
    }

    #[test]
    fn microfacet_reflection_pdf_matches_sample_direction() {
        let bxdf = MicrofacetReflection::new(Spectrum::new(0.9), Spectrum::new(1.0), Spectrum::new(3.0), 0.3);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let (wi, pdf, _f) = bxdf.sample_f(&wo, &Point2f::new(0.3, 0.6));
        if pdf > 0.0 {
            let pdf2 = bxdf.pdf(&wo, &wi);
            assert!((pdf - pdf2).abs() / pdf < 1e-3);
        }
    }
}
