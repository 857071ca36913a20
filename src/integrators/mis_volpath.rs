//! MIS path tracing extended with participating media: next-event
//! estimation fires at both surface and medium-scattering vertices, and
//! an optional BSDF-regularization pass widens roughness after the first
//! non-specular bounce to suppress fireflies (spec.md §4.K, grounded on
//! `original_source/src/integrator/vol_path_integrator.cpp`).

use std::sync::Arc;

use crate::core::geometry::{Point2f, Ray};
use crate::core::medium::Medium;
use crate::core::pbrt::Float;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::core::spectrum::Spectrum;

use super::{
    direct_lighting_medium, direct_lighting_surface, eta_scale_factor, medium_after_crossing, rr_survival_probability,
    sample_medium_interaction, Integrator, MediumOutcome,
};

pub struct MisVolumetricPathIntegrator {
    pub max_bounces: i32,
    pub rr_probability: Float,
    pub regularize_bsdf: bool,
}

impl Integrator for MisVolumetricPathIntegrator {
    fn li(&self, primary_ray: &Ray, scene: &Scene, sampler: &mut Sampler) -> Spectrum {
        let mut l = Spectrum::black();
        let mut throughput = Spectrum::new(1.0);
        let mut eta_scale: Float = 1.0;
        let mut ray = primary_ray.clone();
        let mut current_medium: Option<Arc<Medium>> = None;
        let mut bounce = 0;
        let mut specular_bounce = true;
        let mut any_non_specular_bounce = false;

        loop {
            let isect = scene.intersect(&ray, Ray::EPSILON, Float::INFINITY);
            let t_max = isect.map(|i| i.t).unwrap_or(Float::INFINITY);

            if let Some(medium) = current_medium.clone() {
                let (outcome, weight) = sample_medium_interaction(&medium, &ray, t_max, sampler);
                throughput *= weight;
                if throughput.is_black() {
                    break;
                }
                match outcome {
                    MediumOutcome::Absorbed(_) => {
                        l += throughput * medium.le();
                        break;
                    }
                    MediumOutcome::Scattered(point) => {
                        if bounce >= self.max_bounces {
                            break;
                        }
                        bounce += 1;
                        let wo = -ray.d;
                        let phase = medium.phase();
                        l += throughput * direct_lighting_medium(scene, point, &wo, &phase, sampler);
                        let u = sampler.next_2d();
                        let (wi, _pdf) = phase.sample_p(&wo, u);
                        ray = Ray::new(point, wi);
                        specular_bounce = false;
                        any_non_specular_bounce = true;
                        continue;
                    }
                    MediumOutcome::Escaped => {}
                }
            }

            let isect = match isect {
                Some(isect) => isect,
                None => {
                    for &index in &scene.infinite_light_indices {
                        l += throughput * scene.lights[index].le(&ray);
                    }
                    break;
                }
            };

            let primitive = scene.primitive(isect.primitive_index);
            let wo = -ray.d;

            if specular_bounce {
                l += throughput * primitive.material.emit(&isect, &ray.d);
            }

            if bounce >= self.max_bounces {
                break;
            }

            let mut bsdf = match primitive.material.get_bsdf(&isect) {
                Some(bsdf) => bsdf,
                None => break,
            };

            if self.regularize_bsdf && any_non_specular_bounce {
                bsdf.regularize();
            }

            if bsdf.num_specular() < bsdf.bxdfs.len() {
                l += throughput * direct_lighting_surface(scene, &isect, &wo, &bsdf, sampler);
            }

            let u = sampler.next_2d();
            let sample = match bsdf.sample_f(&wo, &Point2f::new(u.0, u.1)) {
                Some(sample) => sample,
                None => break,
            };
            let (wi, pdf, f, specular) = sample;
            if pdf <= 0.0 || f.is_black() {
                break;
            }
            bounce += 1;

            let cos = crate::core::geometry::vec3_dot_nrmf(&wi, &isect.shading_normal).abs();
            eta_scale *= eta_scale_factor(&bsdf, &wo, &wi, isect.geometric_normal);
            throughput *= f * (cos / pdf);
            specular_bounce = specular;
            any_non_specular_bounce = any_non_specular_bounce || !specular;
            current_medium = medium_after_crossing(primitive, &wi, &isect);

            if bounce > 2 {
                let q = rr_survival_probability(&throughput, eta_scale, self.rr_probability);
                if sampler.next_1d() > q {
                    break;
                }
                throughput = throughput / q;
            }

            ray = Ray::new(isect.offset_point(&wi), wi);
        }

        l
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Point3f, Vector3f};
    use crate::integrators::test_scene;

    #[test]
    fn vacuum_scene_matches_surface_only_mis_behavior() {
        // With no medium anywhere, this integrator degenerates to the
        // surface-only MIS path tracer's NEE behavior.
        let scene = test_scene::build();
        let mut sampler = Sampler::new(1);
        let integrator = MisVolumetricPathIntegrator { max_bounces: 2, rr_probability: 0.95, regularize_bsdf: true };
        let ray = Ray::new(Point3f::new(0.0, 5.0, 0.0), Vector3f::new(0.0, -1.0, 0.0));
        let l = integrator.li(&ray, &scene, &mut sampler);
        assert!(l.y() > 0.0);
    }

    #[test]
    fn missed_ray_is_black() {
        let scene = test_scene::build();
        let mut sampler = Sampler::new(1);
        let integrator = MisVolumetricPathIntegrator { max_bounces: 2, rr_probability: 0.95, regularize_bsdf: true };
        let ray = Ray::new(Point3f::new(10.0, 10.0, 10.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(integrator.li(&ray, &scene, &mut sampler).is_black());
    }
}
