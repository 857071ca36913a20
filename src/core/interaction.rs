//! Surface intersection record and the post-scatter `Interaction` result.
//! Grounded on `original_source/include/bulbit/intersectable.h`'s
//! `Intersection` struct and `original_source/src/material.cpp`'s
//! `ScatterRecord` (spec.md §3).

use crate::core::geometry::{nrm_faceforward_vec3, Normal3f, Point2f, Point3f, Vector3f};
use crate::core::pbrt::Float;
use crate::core::spectrum::Spectrum;

/// Where a ray hit the scene: geometry only, no material/light lookups yet.
/// `front_face` and the returned normals/tangent are already flipped to
/// face the incoming ray, per spec.md §3.
#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    pub primitive_index: usize,
    pub t: Float,
    pub point: Point3f,
    pub geometric_normal: Normal3f,
    pub shading_normal: Normal3f,
    pub shading_tangent: Vector3f,
    pub uv: Point2f,
    pub front_face: bool,
}

impl Intersection {
    /// Builds a hit record from the shape's raw (unflipped) geometric data,
    /// orienting normals/tangent so `front_face = sign(-wi · geometric_normal) > 0`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        primitive_index: usize,
        t: Float,
        point: Point3f,
        raw_geometric_normal: Normal3f,
        raw_shading_normal: Normal3f,
        raw_shading_tangent: Vector3f,
        uv: Point2f,
        wi: &Vector3f,
    ) -> Self {
        let front_face = crate::core::geometry::vec3_dot_nrmf(&-*wi, &raw_geometric_normal) > 0.0;
        let geometric_normal = if front_face {
            raw_geometric_normal
        } else {
            -raw_geometric_normal
        };
        let shading_normal = nrm_faceforward_vec3(&raw_shading_normal, &Vector3f::from(geometric_normal));
        Intersection {
            primitive_index,
            t,
            point,
            geometric_normal,
            shading_normal,
            shading_tangent: raw_shading_tangent,
            uv,
            front_face,
        }
    }

    pub fn offset_point(&self, direction: &Vector3f) -> Point3f {
        let along = if crate::core::geometry::vec3_dot_nrmf(direction, &self.geometric_normal) > 0.0 {
            Vector3f::from(self.geometric_normal)
        } else {
            -Vector3f::from(self.geometric_normal)
        };
        self.point + along * crate::core::geometry::Ray::EPSILON
    }
}

/// A directional PDF a scatter event samples from and can re-evaluate,
/// e.g. a BSDF lobe or the cosine-weighted hemisphere used by a Lambertian
/// surface. Grounded on `original_source/include/bulbit/pdf.h`.
pub trait DirectionalPdf {
    fn sample(&self, u: &Point2f) -> Vector3f;
    fn evaluate(&self, wi: &Vector3f) -> Float;
}

/// Cosine-weighted hemisphere PDF about a shading frame, the minimal
/// non-specular case (`original_source/include/bulbit/cosine_pdf.h`).
pub struct CosinePdf {
    pub frame: crate::core::geometry::Frame,
}

impl DirectionalPdf for CosinePdf {
    fn sample(&self, u: &Point2f) -> Vector3f {
        let local = crate::core::sampling::cosine_sample_hemisphere(u);
        self.frame.to_world(&local)
    }

    fn evaluate(&self, wi: &Vector3f) -> Float {
        let cos_theta = crate::core::geometry::vec3_dot_vec3f(wi, &self.frame.w);
        crate::core::sampling::cosine_hemisphere_pdf(cos_theta.max(0.0))
    }
}

/// The result of `Material::scatter`: either a specular bounce carrying
/// an explicit outgoing direction and attenuation, or a non-specular
/// bounce carrying a BSDF the integrator can importance-sample and
/// re-evaluate for MIS against next-event estimation (spec.md §3, §4.F).
pub enum Interaction {
    Specular {
        wi_specular: Vector3f,
        attenuation: Spectrum,
    },
    Scattered {
        bsdf: crate::core::reflection::Bsdf,
    },
}

impl Interaction {
    pub fn is_specular(&self) -> bool {
        matches!(self, Interaction::Specular { .. })
    }
}
