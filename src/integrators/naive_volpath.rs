//! Naive path tracing extended with participating media: between surface
//! events, march the majorant iterator and resolve absorption, real
//! scattering, or null scattering before falling back to the naive
//! surface-bounce logic (spec.md §4.K, grounded on
//! `original_source/src/integrator/naive_vol_path_integrator.cpp`).

use std::sync::Arc;

use crate::core::geometry::{Point2f, Ray};
use crate::core::medium::Medium;
use crate::core::pbrt::Float;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::core::spectrum::Spectrum;

use super::{eta_scale_factor, medium_after_crossing, rr_survival_probability, sample_medium_interaction, Integrator, MediumOutcome};

pub struct NaiveVolumetricPathIntegrator {
    pub max_bounces: i32,
    pub rr_probability: Float,
}

impl Integrator for NaiveVolumetricPathIntegrator {
    fn li(&self, primary_ray: &Ray, scene: &Scene, sampler: &mut Sampler) -> Spectrum {
        let mut l = Spectrum::black();
        let mut throughput = Spectrum::new(1.0);
        let mut eta_scale: Float = 1.0;
        let mut ray = primary_ray.clone();
        let mut current_medium: Option<Arc<Medium>> = None;
        let mut bounce = 0;

        loop {
            let isect = scene.intersect(&ray, Ray::EPSILON, Float::INFINITY);
            let t_max = isect.as_ref().map(|i| i.t).unwrap_or(Float::INFINITY);

            if let Some(medium) = current_medium.clone() {
                let (outcome, weight) = sample_medium_interaction(&medium, &ray, t_max, sampler);
                throughput *= weight;
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
                        let u = sampler.next_2d();
                        let (wi, _pdf) = medium.phase().sample_p(&wo, u);
                        ray = Ray::new(point, wi);
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

            if bounce >= self.max_bounces {
                break;
            }
            bounce += 1;

            let primitive = scene.primitive(isect.primitive_index);
            let wo = -ray.d;
            l += throughput * primitive.material.emit(&isect, &ray.d);

            let bsdf = match primitive.material.get_bsdf(&isect) {
                Some(bsdf) => bsdf,
                None => break,
            };

            let u = sampler.next_2d();
            let sample = match bsdf.sample_f(&wo, &Point2f::new(u.0, u.1)) {
                Some(sample) => sample,
                None => break,
            };
            let (wi, pdf, f, _specular) = sample;
            if pdf <= 0.0 || f.is_black() {
                break;
            }

            let cos = crate::core::geometry::vec3_dot_nrmf(&wi, &isect.shading_normal).abs();
            eta_scale *= eta_scale_factor(&bsdf, &wo, &wi, isect.geometric_normal);
            throughput *= f * (cos / pdf);
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
    fn vacuum_point_light_scene_is_black_without_nee() {
        // With no medium anywhere and a delta light, this degenerates to
        // naive surface path tracing: unreachable by BSDF sampling alone.
        let scene = test_scene::build();
        let mut sampler = Sampler::new(1);
        let integrator = NaiveVolumetricPathIntegrator { max_bounces: 4, rr_probability: 0.95 };
        let ray = Ray::new(Point3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(integrator.li(&ray, &scene, &mut sampler).is_black());
    }

    #[test]
    fn missed_ray_is_black() {
        let scene = test_scene::build();
        let mut sampler = Sampler::new(1);
        let integrator = NaiveVolumetricPathIntegrator { max_bounces: 4, rr_probability: 0.95 };
        let ray = Ray::new(Point3f::new(10.0, 10.0, 10.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(integrator.li(&ray, &scene, &mut sampler).is_black());
    }
}
