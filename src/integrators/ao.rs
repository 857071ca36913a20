//! Ambient occlusion: a single cosine-weighted bounce whose contribution
//! is either 1 (unoccluded) or 0, importance sampling cancelling every
//! other term (spec.md §4.K, `original_source/src/integrator/ao_integrator.cpp`).

use crate::core::geometry::{Frame, Ray};
use crate::core::pbrt::Float;
use crate::core::rng::Sampler;
use crate::core::sampling::cosine_sample_hemisphere;
use crate::core::scene::Scene;
use crate::core::spectrum::Spectrum;

use super::Integrator;

pub struct AmbientOcclusionIntegrator {
    pub range: Float,
}

impl Integrator for AmbientOcclusionIntegrator {
    fn li(&self, ray: &Ray, scene: &Scene, sampler: &mut Sampler) -> Spectrum {
        let isect = match scene.intersect(ray, Ray::EPSILON, Float::INFINITY) {
            Some(isect) => isect,
            None => return Spectrum::black(),
        };

        let u = sampler.next_2d();
        let wi_local = cosine_sample_hemisphere(&crate::core::geometry::Point2f::new(u.0, u.1));
        if wi_local.z <= 0.0 {
            return Spectrum::black();
        }

        let frame = Frame::from_normal(&isect.shading_normal);
        let wi = frame.to_world(&wi_local);
        let ao_ray = Ray::new(isect.offset_point(&wi), wi);

        if scene.intersect_p(&ao_ray, Ray::EPSILON, self.range) {
            Spectrum::black()
        } else {
            Spectrum::new(1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Point3f, Vector3f};
    use crate::integrators::test_scene;

    #[test]
    fn camera_ray_missing_the_sphere_is_black() {
        let scene = test_scene::build();
        let mut sampler = Sampler::new(1);
        let integrator = AmbientOcclusionIntegrator { range: 10.0 };
        let ray = Ray::new(Point3f::new(10.0, 10.0, 10.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(integrator.li(&ray, &scene, &mut sampler).is_black());
    }

    #[test]
    fn short_range_never_finds_occlusion() {
        let scene = test_scene::build();
        let mut sampler = Sampler::new(1);
        // range shorter than any occluder distance from the sphere surface.
        let integrator = AmbientOcclusionIntegrator { range: 1e-3 };
        let ray = Ray::new(Point3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        for _ in 0..8 {
            let l = integrator.li(&ray, &scene, &mut sampler);
            assert!(l.y() > 0.0);
        }
    }
}
