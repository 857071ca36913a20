//! Analytic sphere (spec.md §4.C). Ray-sphere uses the classic quadratic
//! rather than the teacher's interval-arithmetic `EFloat` solver: the
//! specification asks for the textbook smaller-root-first test, not
//! numerically-robust quadric clipping.

use std::f32::consts::PI;

use crate::core::geometry::{
    clamp_t, vec3_cross_vec3f, vec3_dot_vec3f, Bounds3f, Normal3f, Point2f, Point3f, Ray,
    Transform, Vector3f,
};
use crate::core::interaction::Intersection;
use crate::core::pbrt::Float;
use crate::core::sampling::uniform_sample_sphere;

#[derive(Clone)]
pub struct Sphere {
    pub object_to_world: Transform,
    pub world_to_object: Transform,
    pub radius: Float,
}

impl Sphere {
    pub fn new(object_to_world: Transform, radius: Float) -> Self {
        Sphere {
            world_to_object: object_to_world.inverse(),
            object_to_world,
            radius,
        }
    }

    fn world_radius(&self) -> Float {
        self.object_to_world
            .transform_vector(&Vector3f::new(self.radius, 0.0, 0.0))
            .length()
    }

    fn world_center(&self) -> Point3f {
        self.object_to_world.transform_point(&Point3f::new(0.0, 0.0, 0.0))
    }

    pub fn world_bound(&self) -> Bounds3f {
        let c = self.world_center();
        let r = self.world_radius();
        let delta = Vector3f::new(r, r, r);
        Bounds3f::new(c - delta, c + delta)
    }

    pub fn area(&self) -> Float {
        let r = self.world_radius();
        4.0 * PI * r * r
    }

    /// `(θ, φ)` parameterization used for both hit UVs and sampling: the
    /// polar axis is `y`, matching spec.md §4.C's literal formula.
    fn uv_for_local_point(p: &Point3f) -> Point2f {
        let theta = clamp_t(p.y / p.length(), -1.0, 1.0).acos();
        let mut phi = p.z.atan2(p.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        Point2f::new(phi / (2.0 * PI), 1.0 - theta / PI)
    }

    pub fn intersect(
        &self,
        ray: &Ray,
        t_min: Float,
        t_max: Float,
        primitive_index: usize,
    ) -> Option<Intersection> {
        let o = self.world_to_object.transform_point(&ray.o);
        let d = self.world_to_object.transform_vector(&ray.d);
        let o_vec = Vector3f::new(o.x, o.y, o.z);

        let a = vec3_dot_vec3f(&d, &d);
        let b = 2.0 * vec3_dot_vec3f(&o_vec, &d);
        let c = vec3_dot_vec3f(&o_vec, &o_vec) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_disc = discriminant.sqrt();
        let t0 = (-b - sqrt_disc) / (2.0 * a);
        let t1 = (-b + sqrt_disc) / (2.0 * a);

        let t_hit = if t0 > t_min && t0 < t_max {
            t0
        } else if t1 > t_min && t1 < t_max {
            t1
        } else {
            return None;
        };

        let p_local = o + d * t_hit;
        let uv = Self::uv_for_local_point(&p_local);

        let geometric_normal_world = self
            .object_to_world
            .transform_normal(&Normal3f::from(p_local))
            .normalize();
        let phi = uv.x * 2.0 * PI;
        let tangent_local = Vector3f::new(-phi.sin(), 0.0, phi.cos());
        let shading_tangent_world = self.object_to_world.transform_vector(&tangent_local).normalize();

        let world_hit = self.object_to_world.transform_point(&p_local);
        Some(Intersection::new(
            primitive_index,
            t_hit,
            world_hit,
            geometric_normal_world,
            geometric_normal_world,
            shading_tangent_world,
            uv,
            &ray.d,
        ))
    }

    pub fn intersect_p(&self, ray: &Ray, t_min: Float, t_max: Float) -> bool {
        let o = self.world_to_object.transform_point(&ray.o);
        let d = self.world_to_object.transform_vector(&ray.d);
        let o_vec = Vector3f::new(o.x, o.y, o.z);

        let a = vec3_dot_vec3f(&d, &d);
        let b = 2.0 * vec3_dot_vec3f(&o_vec, &d);
        let c = vec3_dot_vec3f(&o_vec, &o_vec) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return false;
        }
        let sqrt_disc = discriminant.sqrt();
        let t0 = (-b - sqrt_disc) / (2.0 * a);
        let t1 = (-b + sqrt_disc) / (2.0 * a);
        (t0 > t_min && t0 < t_max) || (t1 > t_min && t1 < t_max)
    }

    pub fn sample_area(&self, u: Point2f) -> (Point3f, Normal3f) {
        let local_n = uniform_sample_sphere(&u);
        let n_world = self.object_to_world.transform_normal(&local_n).normalize();
        let p_world = self.world_center() + n_world * self.world_radius();
        (p_world, n_world)
    }

    /// Cone sampling toward `reference` (spec.md §4.C); falls back to area
    /// sampling when the reference point is inside the sphere, where no
    /// real cone of directions exists.
    pub fn sample_from(&self, reference: Point3f, u: Point2f) -> (Point3f, Normal3f, Float) {
        let center = self.world_center();
        let radius = self.world_radius();
        let dc = (center - reference).length();

        if dc <= radius {
            let (p, n) = self.sample_area(u);
            let pdf = self.pdf_from(reference, (p - reference).normalize());
            return (p, n, pdf);
        }

        let cos_theta_max = (1.0 - (radius * radius) / (dc * dc)).max(0.0).sqrt();
        let cos_theta = 1.0 - u.x * (1.0 - cos_theta_max);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = 2.0 * PI * u.y;

        let w = (center - reference) / dc;
        let (t1, t2) = {
            let a = if w.x.abs() > 0.999 {
                Vector3f::new(0.0, 1.0, 0.0)
            } else {
                Vector3f::new(1.0, 0.0, 0.0)
            };
            let t1 = vec3_cross_vec3f(&a, &w).normalize();
            let t2 = vec3_cross_vec3f(&w, &t1);
            (t1, t2)
        };
        let dir = t1 * (sin_theta * phi.cos()) + t2 * (sin_theta * phi.sin()) + w * cos_theta;

        let ds = dc * cos_theta - (radius * radius - dc * dc * sin_theta * sin_theta).max(0.0).sqrt();
        let p = reference + dir * ds;
        let n = (p - center).normalize();
        let pdf = 1.0 / (2.0 * PI * (1.0 - cos_theta_max));
        (p, n, pdf)
    }

    pub fn pdf_from(&self, reference: Point3f, _wi: Vector3f) -> Float {
        let center = self.world_center();
        let radius = self.world_radius();
        let dc = (center - reference).length();
        if dc <= radius {
            let area = self.area();
            1.0 / area
        } else {
            let cos_theta_max = (1.0 - (radius * radius) / (dc * dc)).max(0.0).sqrt();
            1.0 / (2.0 * PI * (1.0 - cos_theta_max))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_through_center_hits_near_side_first() {
        let sphere = Sphere::new(Transform::default(), 1.0);
        let ray = Ray::new(Point3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        let hit = sphere.intersect(&ray, 0.0, Float::INFINITY, 0).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-4);
        assert!((hit.point.z - (-1.0)).abs() < 1e-4);
    }

    #[test]
    fn missed_ray_returns_none() {
        let sphere = Sphere::new(Transform::default(), 1.0);
        let ray = Ray::new(Point3f::new(5.0, 5.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(sphere.intersect(&ray, 0.0, Float::INFINITY, 0).is_none());
    }

    #[test]
    fn reference_inside_sphere_falls_back_to_area_sampling() {
        let sphere = Sphere::new(Transform::default(), 2.0);
        let (p, n, pdf) = sphere.sample_from(Point3f::new(0.0, 0.0, 0.0), Point2f::new(0.3, 0.7));
        assert!((p.length() - 2.0).abs() < 1e-4);
        assert!(n.length() > 0.99 && n.length() < 1.01);
        assert!(pdf > 0.0);
    }
}
