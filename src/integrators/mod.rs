//! Path-integrator family (spec.md §4.K): six strategies sharing one
//! vertex loop shape — intersect, possibly sample a medium, build a BSDF,
//! estimate direct light, sample a continuation, apply Russian roulette.
//! Grounded on `original_source/src/integrator/*.cpp` and
//! `original_source/include/bulbit/integrator.h`'s `Integrator` hierarchy.

pub mod ao;
pub mod mis_path;
pub mod mis_volpath;
pub mod naive_path;
pub mod naive_volpath;
pub mod whitted;

use std::sync::Arc;

use crate::core::geometry::{vec3_dot_nrmf, Point3f, Ray, Vector3f};
use crate::core::interaction::Intersection;
use crate::core::light::Light;
use crate::core::medium::{sample_segment, Medium, MediumEvent, RayMajorantSegment};
use crate::core::pbrt::Float;
use crate::core::primitive::Primitive;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::core::spectrum::Spectrum;

/// `(accel, lights, sampler)` construction and a pure per-sample `Li`
/// entry point (spec.md §6 "Integrator API"); tile orchestration and the
/// `Render` driver loop live outside this crate.
pub trait Integrator {
    fn li(&self, ray: &Ray, scene: &Scene, sampler: &mut Sampler) -> Spectrum;
}

/// Picks one light uniformly and returns it with the reciprocal of its
/// selection probability, the weight every NEE estimate must carry
/// (spec.md §4.K "pick one light uniformly").
fn pick_one_light<'a>(scene: &'a Scene, sampler: &mut Sampler) -> Option<(&'a Arc<Light>, Float)> {
    let n = scene.lights.len();
    if n == 0 {
        return None;
    }
    let index = ((sampler.next_1d() * n as Float) as usize).min(n - 1);
    Some((&scene.lights[index], n as Float))
}

/// The medium a ray finds itself in after crossing a primitive's surface,
/// following the standard convention `dot(w, n) > 0 → outside medium,
/// else inside medium` (grounded on the teacher's
/// `EndpointInteraction::get_medium`).
pub fn medium_after_crossing(primitive: &Primitive, direction: &Vector3f, isect: &Intersection) -> Option<Arc<Medium>> {
    if vec3_dot_nrmf(direction, &isect.geometric_normal) > 0.0 {
        primitive.medium_interface.outside.clone()
    } else {
        primitive.medium_interface.inside.clone()
    }
}

/// Direct-light estimate at a surface vertex via next-event estimation,
/// MIS-weighted against the BSDF's directional PDF with the power
/// heuristic (spec.md §4.K "MIS path").
pub fn direct_lighting_surface(
    scene: &Scene,
    isect: &Intersection,
    wo: &Vector3f,
    bsdf: &crate::core::reflection::Bsdf,
    sampler: &mut Sampler,
) -> Spectrum {
    let mut ld = Spectrum::black();
    let (light, light_weight) = match pick_one_light(scene, sampler) {
        Some(lw) => lw,
        None => return ld,
    };

    let u = sampler.next_2d();
    let sample = light.sample_li(isect.point, crate::core::geometry::Point2f::new(u.0, u.1));
    if sample.pdf > 0.0 && !sample.li.is_black() {
        let f = bsdf.f(wo, &sample.wi) * vec3_dot_nrmf(&sample.wi, &isect.shading_normal).abs();
        if !f.is_black() {
            let (shadow_ray, t_max) = sample.visibility.shadow_ray();
            if !scene.intersect_p(&shadow_ray, Ray::EPSILON, t_max) {
                if light.is_delta() {
                    ld += f * sample.li * light_weight / sample.pdf;
                } else {
                    let bsdf_pdf = bsdf.pdf(wo, &sample.wi);
                    let weight = crate::core::sampling::power_heuristic(1.0, sample.pdf, 1.0, bsdf_pdf);
                    ld += f * sample.li * light_weight * weight / sample.pdf;
                }
            }
        }
    }

    if !light.is_delta() {
        let u_bsdf = sampler.next_2d();
        if let Some((wi, bsdf_pdf, f, specular)) = bsdf.sample_f(wo, &crate::core::geometry::Point2f::new(u_bsdf.0, u_bsdf.1)) {
            if bsdf_pdf > 0.0 && !specular && !f.is_black() {
                let cos = vec3_dot_nrmf(&wi, &isect.shading_normal).abs();
                let light_pdf = light.pdf_li(isect.point, wi);
                if light_pdf > 0.0 {
                    let shadow_ray = Ray::new(isect.offset_point(&wi), wi);
                    if let Some(hit) = scene.intersect(&shadow_ray, Ray::EPSILON, Float::INFINITY) {
                        let hit_primitive = scene.primitive(hit.primitive_index);
                        if hit_primitive.material.is_light_source() {
                            let li = hit_primitive.material.emit(&hit, &wi);
                            if !li.is_black() {
                                let weight = crate::core::sampling::power_heuristic(1.0, bsdf_pdf, 1.0, light_pdf);
                                ld += f * cos * li * light_weight * weight / bsdf_pdf;
                            }
                        }
                    } else {
                        let le = light.le(&shadow_ray);
                        if !le.is_black() {
                            let weight = crate::core::sampling::power_heuristic(1.0, bsdf_pdf, 1.0, light_pdf);
                            ld += f * cos * le * light_weight * weight / bsdf_pdf;
                        }
                    }
                }
            }
        }
    }

    ld
}

/// Direct-light estimate at a medium scattering vertex via NEE weighted
/// against the phase function's PDF (spec.md §4.K "MIS volumetric path").
pub fn direct_lighting_medium(
    scene: &Scene,
    point: crate::core::geometry::Point3f,
    wo: &Vector3f,
    phase: &crate::core::medium::HenyeyGreenstein,
    sampler: &mut Sampler,
) -> Spectrum {
    let mut ld = Spectrum::black();
    let (light, light_weight) = match pick_one_light(scene, sampler) {
        Some(lw) => lw,
        None => return ld,
    };

    let u = sampler.next_2d();
    let sample = light.sample_li(point, crate::core::geometry::Point2f::new(u.0, u.1));
    if sample.pdf <= 0.0 || sample.li.is_black() {
        return ld;
    }
    let p = phase.p(wo, &sample.wi);
    if p <= 0.0 {
        return ld;
    }
    let (shadow_ray, t_max) = sample.visibility.shadow_ray();
    if scene.intersect_p(&shadow_ray, Ray::EPSILON, t_max) {
        return ld;
    }
    if light.is_delta() {
        ld += Spectrum::new(p) * sample.li * light_weight / sample.pdf;
    } else {
        let phase_pdf = phase.pdf(wo, &sample.wi);
        let weight = crate::core::sampling::power_heuristic(1.0, sample.pdf, 1.0, phase_pdf);
        ld += Spectrum::new(p) * sample.li * light_weight * weight / sample.pdf;
    }
    ld
}

/// Russian-roulette survival probability after the minimum bounce count,
/// scaled by the transmission IOR correction `η_scale` (spec.md §4.K
/// "MIS path" — darker paths after high-IOR refraction terminate sooner).
pub fn rr_survival_probability(throughput: &Spectrum, eta_scale: Float, user_probability: Float) -> Float {
    (throughput.y() * eta_scale).min(user_probability).max(0.05)
}

/// `η_scale *= (η_b/η_a)²` when a bounce transmits through a dielectric
/// interface, tracked so Russian roulette doesn't prematurely kill a path
/// that only looks dim because it refracted into denser glass.
pub fn eta_scale_factor(bsdf: &crate::core::reflection::Bsdf, wo: &Vector3f, wi: &Vector3f, geometric_normal: Vector3f) -> Float {
    let transmitted = vec3_dot_nrmf(wo, &geometric_normal) * vec3_dot_nrmf(wi, &geometric_normal) < 0.0;
    if !transmitted {
        return 1.0;
    }
    for bxdf in &bsdf.bxdfs {
        match bxdf {
            crate::core::reflection::Bxdf::FresnelSpecular(b) => return (b.eta_b / b.eta_a).powi(2),
            crate::core::reflection::Bxdf::MicrofacetTransmission(b) => return (b.eta_b / b.eta_a).powi(2),
            _ => {}
        }
    }
    1.0
}

/// Where free-flight sampling through a medium landed.
pub enum MediumOutcome {
    Absorbed(Point3f),
    Scattered(Point3f),
    Escaped,
}

/// Marches a ray through `medium` up to `t_max`, restarting the
/// exponential free-flight draw at every null-scattering event within a
/// constant-majorant segment (valid by memorylessness) and advancing to
/// the iterator's next segment once the current one is exhausted. Returns
/// the classified outcome and the accumulated `σ_n/σ_maj` weight product
/// (spec.md §4.J "Delta / null-scattering tracking").
pub fn sample_medium_interaction(medium: &Medium, ray: &Ray, t_max: Float, sampler: &mut Sampler) -> (MediumOutcome, Spectrum) {
    let mut iter = medium.sample_ray(ray, Ray::EPSILON, t_max);
    let mut weight = Spectrum::new(1.0);

    while let Some(segment) = iter.next_segment() {
        let mut t_min = segment.t_min;
        loop {
            let u_distance = sampler.next_1d();
            let u_event = sampler.next_1d();
            let probe = RayMajorantSegment {
                t_min,
                t_max: segment.t_max,
                sigma_maj: segment.sigma_maj,
            };
            match sample_segment(&probe, medium, ray, u_distance, u_event) {
                None => break,
                Some((t, MediumEvent::Absorbed, w)) => return (MediumOutcome::Absorbed(ray.at(t)), weight * w),
                Some((t, MediumEvent::Scattered { .. }, w)) => return (MediumOutcome::Scattered(ray.at(t)), weight * w),
                Some((t, MediumEvent::Null, w)) => {
                    weight *= w;
                    t_min = t;
                }
            }
        }
    }

    (MediumOutcome::Escaped, weight)
}

/// A one-sphere, one-point-light scene shared by the integrator unit tests
/// below: a unit diffuse sphere at the origin lit from directly above.
#[cfg(test)]
pub(crate) mod test_scene {
    use std::sync::Arc;

    use crate::core::geometry::{Point3f, Transform};
    use crate::core::light::Light;
    use crate::core::material::Material;
    use crate::core::primitive::Primitive;
    use crate::core::scene::Scene;
    use crate::core::spectrum::Spectrum;
    use crate::core::texture::SpectrumTexture;
    use crate::shapes::{Shape, sphere::Sphere};
    use crate::{lights, materials};

    pub fn build() -> Scene {
        let albedo = Arc::new(SpectrumTexture::constant(Spectrum::new(0.8)));
        let material = Arc::new(materials::diffuse::create(albedo));
        let shape = Arc::new(Shape::Sphere(Sphere::new(Transform::default(), 1.0)));
        let primitive = Primitive::new(shape, material);

        let light = Arc::new(lights::point::create(Point3f::new(0.0, 5.0, 0.0), Spectrum::new(20.0)));

        Scene::build(vec![primitive], vec![light]).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Point3f, Vector3f};
    use crate::core::medium::HomogeneousMedium;

    #[test]
    fn purely_absorbing_medium_always_absorbs_before_t_max() {
        let medium = Medium::Homogeneous(HomogeneousMedium::new(Spectrum::new(4.0), Spectrum::new(0.0), Spectrum::new(0.0), 0.0));
        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        let mut sampler = Sampler::new(1);
        for _ in 0..16 {
            let (outcome, weight) = sample_medium_interaction(&medium, &ray, 100.0, &mut sampler);
            assert!(matches!(outcome, MediumOutcome::Absorbed(_)));
            assert!(weight.y() > 0.0);
        }
    }

    #[test]
    fn vacuum_like_medium_always_escapes() {
        let medium = Medium::Homogeneous(HomogeneousMedium::new(Spectrum::new(0.0), Spectrum::new(0.0), Spectrum::new(0.0), 0.0));
        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        let mut sampler = Sampler::new(1);
        let (outcome, weight) = sample_medium_interaction(&medium, &ray, 10.0, &mut sampler);
        assert!(matches!(outcome, MediumOutcome::Escaped));
        assert!((weight.y() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rr_never_drops_below_the_survival_floor() {
        let dim = Spectrum::new(1e-6);
        assert!((rr_survival_probability(&dim, 1.0, 0.95) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn eta_scale_factor_is_identity_on_a_pure_reflection() {
        use crate::core::reflection::{Bsdf, Bxdf, LambertianReflection};
        use crate::core::geometry::Normal3f;

        let up = Normal3f::new(0.0, 1.0, 0.0);
        let mut bsdf = Bsdf::new(up, up);
        bsdf.add(Bxdf::Lambertian(LambertianReflection { r: Spectrum::new(0.5) }));

        let wo = Vector3f::new(0.0, 1.0, 0.0);
        let wi = Vector3f::new(0.0, 1.0, 0.0);
        let geometric_normal = Vector3f::new(0.0, 1.0, 0.0);
        assert_eq!(eta_scale_factor(&bsdf, &wo, &wi, geometric_normal), 1.0);
    }
}
