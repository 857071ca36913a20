//! Whitted-style ray tracing: specular bounces recurse (flattened into a
//! loop here), non-specular vertices sum only the delta-light
//! contributions analytically, depth-bounded (spec.md §4.K, grounded on
//! `original_source/src/integrator/whitted.cpp`).

use crate::core::geometry::{Point2f, Ray};
use crate::core::pbrt::Float;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::core::spectrum::Spectrum;

use super::Integrator;

pub struct WhittedIntegrator {
    pub max_depth: i32,
}

impl Integrator for WhittedIntegrator {
    fn li(&self, primary_ray: &Ray, scene: &Scene, sampler: &mut Sampler) -> Spectrum {
        let mut l = Spectrum::black();
        let mut throughput = Spectrum::new(1.0);
        let mut ray = primary_ray.clone();

        for _ in 0..self.max_depth {
            let isect = match scene.intersect(&ray, Ray::EPSILON, Float::INFINITY) {
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

            l += throughput * primitive.material.emit(&isect, &ray.d);

            let bsdf = match primitive.material.get_bsdf(&isect) {
                Some(bsdf) => bsdf,
                None => break,
            };

            let fully_specular = !bsdf.bxdfs.is_empty() && bsdf.num_specular() == bsdf.bxdfs.len();
            if fully_specular {
                let u = sampler.next_2d();
                match bsdf.sample_f(&wo, &Point2f::new(u.0, u.1)) {
                    Some((wi, pdf, f, _)) if pdf > 0.0 && !f.is_black() => {
                        let cos = crate::core::geometry::vec3_dot_nrmf(&wi, &isect.shading_normal).abs();
                        throughput *= f * (cos / pdf);
                        ray = Ray::new(isect.offset_point(&wi), wi);
                        continue;
                    }
                    _ => break,
                }
            }

            for light in scene.lights.iter().filter(|light| light.is_delta()) {
                let u = sampler.next_2d();
                let sample = light.sample_li(isect.point, Point2f::new(u.0, u.1));
                if sample.pdf <= 0.0 || sample.li.is_black() {
                    continue;
                }
                let f = bsdf.f(&wo, &sample.wi) * crate::core::geometry::vec3_dot_nrmf(&sample.wi, &isect.shading_normal).abs();
                if f.is_black() {
                    continue;
                }
                let (shadow_ray, t_max) = sample.visibility.shadow_ray();
                if !scene.intersect_p(&shadow_ray, Ray::EPSILON, t_max) {
                    l += throughput * f * sample.li / sample.pdf;
                }
            }
            break;
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
    fn delta_light_sum_lights_the_sphere_top() {
        let scene = test_scene::build();
        let mut sampler = Sampler::new(1);
        let integrator = WhittedIntegrator { max_depth: 5 };
        let ray = Ray::new(Point3f::new(0.0, 5.0, 0.0), Vector3f::new(0.0, -1.0, 0.0));
        let l = integrator.li(&ray, &scene, &mut sampler);
        assert!(l.y() > 0.0);
    }

    #[test]
    fn missed_ray_is_black() {
        let scene = test_scene::build();
        let mut sampler = Sampler::new(1);
        let integrator = WhittedIntegrator { max_depth: 5 };
        let ray = Ray::new(Point3f::new(10.0, 10.0, 10.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(integrator.li(&ray, &scene, &mut sampler).is_black());
    }
}
