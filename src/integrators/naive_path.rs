//! Naive path tracing: sample the material at every bounce, accumulate
//! emission, no next-event estimation (spec.md §4.K, grounded on
//! `original_source/src/integrator/naive_path_integrator.cpp`, flattened
//! from recursion into an explicit loop).

use crate::core::geometry::{Point2f, Ray};
use crate::core::pbrt::Float;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::core::spectrum::Spectrum;

use super::{eta_scale_factor, rr_survival_probability, Integrator};

pub struct NaivePathIntegrator {
    pub max_bounces: i32,
    pub rr_probability: Float,
}

impl Integrator for NaivePathIntegrator {
    fn li(&self, primary_ray: &Ray, scene: &Scene, sampler: &mut Sampler) -> Spectrum {
        let mut l = Spectrum::black();
        let mut throughput = Spectrum::new(1.0);
        let mut eta_scale: Float = 1.0;
        let mut ray = primary_ray.clone();

        for bounce in 0..=self.max_bounces {
            let isect = match scene.intersect(&ray, Ray::EPSILON, Float::INFINITY) {
                Some(isect) => isect,
                None => break,
            };
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

            if bounce >= 2 {
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
    fn point_light_only_scene_is_black_without_nee() {
        // A delta light has zero probability of being hit by BSDF sampling,
        // so naive path tracing (no next-event estimation) can never see it.
        let scene = test_scene::build();
        let mut sampler = Sampler::new(1);
        let integrator = NaivePathIntegrator { max_bounces: 4, rr_probability: 0.95 };
        let ray = Ray::new(Point3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(integrator.li(&ray, &scene, &mut sampler).is_black());
    }

    #[test]
    fn missed_ray_is_black() {
        let scene = test_scene::build();
        let mut sampler = Sampler::new(1);
        let integrator = NaivePathIntegrator { max_bounces: 4, rr_probability: 0.95 };
        let ray = Ray::new(Point3f::new(10.0, 10.0, 10.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(integrator.li(&ray, &scene, &mut sampler).is_black());
    }
}
