//! Triangle mesh shape (spec.md §4.C). Vertices live in a shared
//! `TriangleMesh` buffer and each `Triangle` is a lightweight index into it,
//! the common pbrt-style layout also used by the teacher's mesh loader.

use std::sync::Arc;

use crate::core::geometry::{
    vec3_cross_vec3f, vec3_dot_vec3f, Bounds3f, Normal3f, Point2f, Point3f, Ray, Vector3f,
};
use crate::core::interaction::Intersection;
use crate::core::pbrt::Float;
use crate::core::sampling::uniform_sample_triangle;

pub struct TriangleMesh {
    pub p: Vec<Point3f>,
    pub n: Option<Vec<Normal3f>>,
    pub uv: Option<Vec<Point2f>>,
    pub indices: Vec<[u32; 3]>,
}

#[derive(Clone)]
pub struct Triangle {
    pub mesh: Arc<TriangleMesh>,
    pub index: usize,
}

impl Triangle {
    pub fn new(mesh: Arc<TriangleMesh>, index: usize) -> Self {
        Triangle { mesh, index }
    }

    fn vertex_indices(&self) -> [u32; 3] {
        self.mesh.indices[self.index]
    }

    fn positions(&self) -> (Point3f, Point3f, Point3f) {
        let [i0, i1, i2] = self.vertex_indices();
        (
            self.mesh.p[i0 as usize],
            self.mesh.p[i1 as usize],
            self.mesh.p[i2 as usize],
        )
    }

    fn geometric_normal(&self) -> Normal3f {
        let (p0, p1, p2) = self.positions();
        vec3_cross_vec3f(&(p1 - p0), &(p2 - p0)).normalize()
    }

    pub fn world_bound(&self) -> Bounds3f {
        let (p0, p1, p2) = self.positions();
        let b = Bounds3f::new(p0, p1);
        crate::core::geometry::bnd3_union_pnt3f(&b, &p2)
    }

    pub fn area(&self) -> Float {
        let (p0, p1, p2) = self.positions();
        0.5 * vec3_cross_vec3f(&(p1 - p0), &(p2 - p0)).length()
    }

    /// Möller-Trumbore with a parallel-ray guard on `|det| < ε` (spec.md
    /// §4.C); barycentrics interpolate shading normal/UV when present,
    /// falling back to the flat geometric normal and UV `(u, v)` otherwise.
    pub fn intersect(
        &self,
        ray: &Ray,
        t_min: Float,
        t_max: Float,
        primitive_index: usize,
    ) -> Option<Intersection> {
        const EPSILON: Float = 1e-8;
        let (p0, p1, p2) = self.positions();
        let edge1 = p1 - p0;
        let edge2 = p2 - p0;
        let pvec = vec3_cross_vec3f(&ray.d, &edge2);
        let det = vec3_dot_vec3f(&edge1, &pvec);
        if det.abs() < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let tvec = ray.o - p0;
        let u = vec3_dot_vec3f(&tvec, &pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let qvec = vec3_cross_vec3f(&tvec, &edge1);
        let v = vec3_dot_vec3f(&ray.d, &qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = vec3_dot_vec3f(&edge2, &qvec) * inv_det;
        if t <= t_min || t >= t_max {
            return None;
        }
        let w = 1.0 - u - v;

        let geometric_normal = self.geometric_normal();
        let shading_normal = match &self.mesh.n {
            Some(normals) => {
                let [i0, i1, i2] = self.vertex_indices();
                let n = normals[i0 as usize] * w + normals[i1 as usize] * u + normals[i2 as usize] * v;
                n.normalize()
            }
            None => geometric_normal,
        };
        let uv = match &self.mesh.uv {
            Some(uvs) => {
                let [i0, i1, i2] = self.vertex_indices();
                uvs[i0 as usize] * w + uvs[i1 as usize] * u + uvs[i2 as usize] * v
            }
            None => Point2f::new(u, v),
        };
        let tangent = edge1.normalize();
        let point = ray.at(t);

        Some(Intersection::new(
            primitive_index,
            t,
            point,
            geometric_normal,
            shading_normal,
            tangent,
            uv,
            &ray.d,
        ))
    }

    pub fn intersect_p(&self, ray: &Ray, t_min: Float, t_max: Float) -> bool {
        const EPSILON: Float = 1e-8;
        let (p0, p1, p2) = self.positions();
        let edge1 = p1 - p0;
        let edge2 = p2 - p0;
        let pvec = vec3_cross_vec3f(&ray.d, &edge2);
        let det = vec3_dot_vec3f(&edge1, &pvec);
        if det.abs() < EPSILON {
            return false;
        }
        let inv_det = 1.0 / det;
        let tvec = ray.o - p0;
        let u = vec3_dot_vec3f(&tvec, &pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return false;
        }
        let qvec = vec3_cross_vec3f(&tvec, &edge1);
        let v = vec3_dot_vec3f(&ray.d, &qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return false;
        }
        let t = vec3_dot_vec3f(&edge2, &qvec) * inv_det;
        t > t_min && t < t_max
    }

    pub fn sample_area(&self, u: Point2f) -> (Point3f, Normal3f) {
        let (b0, b1) = uniform_sample_triangle(&u);
        let (p0, p1, p2) = self.positions();
        let p = p0 * b0 + p1 * b1 + p2 * (1.0 - b0 - b1);
        (p, self.geometric_normal())
    }

    pub fn sample_from(&self, reference: Point3f, u: Point2f) -> (Point3f, Normal3f, Float) {
        let (p, n) = self.sample_area(u);
        let pdf = self.pdf_from(reference, (p - reference).normalize());
        (p, n, pdf)
    }

    pub fn pdf_from(&self, reference: Point3f, wi: Vector3f) -> Float {
        let n = self.geometric_normal();
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        let ray = Ray::new(reference, wi);
        match self.intersect(&ray, 1e-4, Float::INFINITY, 0) {
            Some(hit) => {
                let dist2 = (hit.point - reference).length_squared();
                let cos_theta = vec3_dot_vec3f(&-wi, &n).abs();
                if cos_theta < 1e-7 {
                    0.0
                } else {
                    dist2 / (cos_theta * area)
                }
            }
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Triangle {
        let mesh = Arc::new(TriangleMesh {
            p: vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            n: None,
            uv: None,
            indices: vec![[0, 1, 2]],
        });
        Triangle::new(mesh, 0)
    }

    #[test]
    fn ray_through_centroid_hits() {
        let tri = unit_triangle();
        let ray = Ray::new(Point3f::new(0.25, 0.25, -1.0), Vector3f::new(0.0, 0.0, 1.0));
        let hit = tri.intersect(&ray, 0.0, Float::INFINITY, 0).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-4);
    }

    #[test]
    fn parallel_ray_misses() {
        let tri = unit_triangle();
        let ray = Ray::new(Point3f::new(0.25, 0.25, -1.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(tri.intersect(&ray, 0.0, Float::INFINITY, 0).is_none());
    }

    #[test]
    fn area_matches_half_cross_product() {
        let tri = unit_triangle();
        assert!((tri.area() - 0.5).abs() < 1e-5);
    }
}
