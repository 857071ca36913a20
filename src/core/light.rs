//! Light dispatcher (spec.md §4.I), grounded on
//! `original_source/include/bulbit/light.h`'s `Light` type-pack and
//! `VisibilityTester`. Delta lights (point, directional) always report
//! `pdf = 1` and must never be combined with BSDF-sampled MIS.

use std::sync::Arc;

use crate::core::geometry::{Point2f, Point3f, Ray, Vector3f};
use crate::core::pbrt::{Float, PI};
use crate::core::sampling::{uniform_sample_sphere, uniform_sphere_pdf, Distribution2D};
use crate::core::spectrum::Spectrum;
use crate::shapes::Shape;
use crate::textures::imagemap::ImageTexture;

/// Equirectangular direction-to-texel mapping shared by `pdf_li` and `le`
/// (`θ = acos(wi.y)`, `φ = atan2(wi.z, wi.x)`, matching `sample_li`'s
/// `uv → direction` inverse).
fn infinite_light_uv(wi: &Vector3f) -> Point2f {
    let theta = wi.y.clamp(-1.0, 1.0).acos();
    let mut phi = wi.z.atan2(wi.x);
    if phi < 0.0 {
        phi += 2.0 * PI;
    }
    Point2f::new(phi / (2.0 * PI), theta / PI)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightFlags {
    DeltaPosition,
    DeltaDirection,
    Area,
    Infinite,
}

impl LightFlags {
    pub fn is_delta(self) -> bool {
        matches!(self, LightFlags::DeltaPosition | LightFlags::DeltaDirection)
    }
}

/// A shadow ray to resolve before trusting a `LightSample`'s radiance: the
/// integrator traces it against the scene's acceleration structure and
/// discards the sample on any hit.
#[derive(Clone, Copy)]
pub struct VisibilityTester {
    pub origin: Point3f,
    pub target: Point3f,
}

impl VisibilityTester {
    pub fn shadow_ray(&self) -> (Ray, Float) {
        let d = self.target - self.origin;
        let dist = d.length();
        (Ray::new(self.origin, d / dist), dist - Ray::EPSILON)
    }
}

pub struct LightSample {
    pub wi: Vector3f,
    pub li: Spectrum,
    pub pdf: Float,
    pub visibility: VisibilityTester,
}

#[derive(Clone)]
pub struct PointLight {
    pub position: Point3f,
    pub intensity: Spectrum,
}

#[derive(Clone)]
pub struct DirectionalLight {
    pub direction: Vector3f,
    pub radiance: Spectrum,
    pub world_radius: Float,
}

/// An emissive shape; `primitive_index` lets the path tracer recognize
/// when a BSDF-sampled ray has landed on this same light for MIS.
#[derive(Clone)]
pub struct AreaLight {
    pub shape: Arc<Shape>,
    pub primitive_index: usize,
    pub emission: Spectrum,
    pub two_sided: bool,
}

/// Uniform-sphere directional sampling in the minimal core (spec.md §4.I);
/// `distribution` is populated for an image-based environment map and
/// importance-samples proportional to per-texel luminance instead.
#[derive(Clone)]
pub struct InfiniteLight {
    pub radiance: Spectrum,
    pub distribution: Option<Arc<Distribution2D>>,
    /// The equirectangular radiance map `distribution` was built over, so
    /// `sample_li`/`le` return direction-dependent radiance rather than a
    /// flat constant when this light is importance sampled.
    pub environment_map: Option<Arc<ImageTexture<Spectrum>>>,
    pub world_radius: Float,
}

#[derive(Clone)]
pub enum Light {
    Point(PointLight),
    Directional(DirectionalLight),
    Area(AreaLight),
    Infinite(InfiniteLight),
}

impl Light {
    pub fn flags(&self) -> LightFlags {
        match self {
            Light::Point(_) => LightFlags::DeltaPosition,
            Light::Directional(_) => LightFlags::DeltaDirection,
            Light::Area(_) => LightFlags::Area,
            Light::Infinite(_) => LightFlags::Infinite,
        }
    }

    pub fn is_delta(&self) -> bool {
        self.flags().is_delta()
    }

    /// Samples an incident direction toward `reference` and the radiance
    /// arriving along it (spec.md §4.I `Sample_Li`).
    pub fn sample_li(&self, reference: Point3f, u: Point2f) -> LightSample {
        match self {
            Light::Point(p) => {
                let d = p.position - reference;
                let dist2 = d.length_squared();
                let wi = d / dist2.sqrt();
                LightSample {
                    wi,
                    li: p.intensity / dist2,
                    pdf: 1.0,
                    visibility: VisibilityTester {
                        origin: reference,
                        target: p.position,
                    },
                }
            }
            Light::Directional(d) => {
                let wi = -d.direction;
                let far_point = reference + wi * (2.0 * d.world_radius);
                LightSample {
                    wi,
                    li: d.radiance,
                    pdf: 1.0,
                    visibility: VisibilityTester {
                        origin: reference,
                        target: far_point,
                    },
                }
            }
            Light::Area(a) => {
                let (p, n, pdf) = a.shape.sample_from(reference, u);
                let wi = (p - reference).normalize();
                let facing = crate::core::geometry::vec3_dot_nrmf(&-wi, &n) > 0.0;
                let li = if facing || a.two_sided { a.emission } else { Spectrum::black() };
                LightSample {
                    wi,
                    li,
                    pdf,
                    visibility: VisibilityTester { origin: reference, target: p },
                }
            }
            Light::Infinite(inf) => {
                let (wi, li, pdf) = match &inf.distribution {
                    Some(dist) => {
                        let (uv, map_pdf) = dist.sample_continuous(&u);
                        let theta = uv.y * PI;
                        let phi = uv.x * 2.0 * PI;
                        let (sin_t, cos_t) = theta.sin_cos();
                        let (sin_p, cos_p) = phi.sin_cos();
                        let dir = Vector3f::new(sin_t * cos_p, cos_t, sin_t * sin_p);
                        let jacobian = if sin_t > 0.0 { 2.0 * PI * PI * sin_t } else { 0.0 };
                        let pdf = if jacobian > 0.0 { map_pdf / jacobian } else { 0.0 };
                        let li = match &inf.environment_map {
                            Some(map) => map.evaluate(uv),
                            None => inf.radiance,
                        };
                        (dir, li, pdf)
                    }
                    None => (uniform_sample_sphere(&u), inf.radiance, uniform_sphere_pdf()),
                };
                let far_point = reference + wi * (2.0 * inf.world_radius);
                LightSample {
                    wi,
                    li,
                    pdf,
                    visibility: VisibilityTester { origin: reference, target: far_point },
                }
            }
        }
    }

    /// PDF of `wi` under this light's directional sampling, used by the
    /// BSDF-sampled half of MIS (spec.md §4.I / path integrator NEE).
    pub fn pdf_li(&self, reference: Point3f, wi: Vector3f) -> Float {
        match self {
            Light::Point(_) | Light::Directional(_) => 0.0,
            Light::Area(a) => a.shape.pdf_from(reference, wi),
            Light::Infinite(inf) => match &inf.distribution {
                Some(dist) => {
                    let uv = infinite_light_uv(&wi);
                    let sin_t = (uv.y * PI).sin();
                    if sin_t <= 0.0 {
                        0.0
                    } else {
                        dist.pdf(&uv) / (2.0 * PI * PI * sin_t)
                    }
                }
                None => uniform_sphere_pdf(),
            },
        }
    }

    /// Radiance along a ray that escaped the scene (spec.md §4.I `Le`);
    /// zero for every non-infinite light.
    pub fn le(&self, ray: &Ray) -> Spectrum {
        match self {
            Light::Infinite(inf) => match &inf.environment_map {
                Some(map) => map.evaluate(infinite_light_uv(&ray.d.normalize())),
                None => inf.radiance,
            },
            _ => Spectrum::black(),
        }
    }

    pub fn power(&self) -> Float {
        match self {
            Light::Point(p) => p.intensity.y() * 4.0 * PI,
            Light::Directional(d) => d.radiance.y() * PI * d.world_radius * d.world_radius,
            Light::Area(a) => a.emission.y() * a.shape.area() * PI * if a.two_sided { 2.0 } else { 1.0 },
            Light::Infinite(inf) => {
                let avg_radiance = match &inf.distribution {
                    Some(dist) => dist.average(),
                    None => inf.radiance.y(),
                };
                avg_radiance * 4.0 * PI * PI * inf.world_radius * inf.world_radius
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_light_intensity_falls_off_with_inverse_square() {
        let light = Light::Point(PointLight {
            position: Point3f::new(0.0, 2.0, 0.0),
            intensity: Spectrum::new(4.0),
        });
        let sample = light.sample_li(Point3f::new(0.0, 0.0, 0.0), Point2f::default());
        assert!((sample.li.y() - 1.0).abs() < 1e-5);
        assert_eq!(sample.pdf, 1.0);
    }

    #[test]
    fn delta_lights_report_zero_pdf_for_bsdf_sampling() {
        let light = Light::Directional(DirectionalLight {
            direction: Vector3f::new(0.0, -1.0, 0.0),
            radiance: Spectrum::new(1.0),
            world_radius: 10.0,
        });
        assert_eq!(light.pdf_li(Point3f::default(), Vector3f::new(0.0, 1.0, 0.0)), 0.0);
        assert!(light.is_delta());
    }

    fn two_texel_environment() -> (InfiniteLight, Spectrum, Spectrum) {
        use crate::core::geometry::Point2i;
        use crate::core::sampling::Distribution2D;
        use crate::textures::imagemap::ImageWrap;

        // A 2x1 equirectangular map: the left texel (phi < pi, i.e. +x
        // hemisphere) is bright, the right texel is dark.
        let bright = Spectrum::new(10.0);
        let dark = Spectrum::new(0.1);
        let map = Arc::new(ImageTexture::from_texels(
            Point2i::new(2, 1),
            vec![bright, dark],
            ImageWrap::Clamp,
        ));
        let distribution = Arc::new(Distribution2D::new(&[bright.y(), dark.y()], 2, 1));
        let light = InfiniteLight {
            radiance: Spectrum::black(),
            distribution: Some(distribution),
            environment_map: Some(map),
            world_radius: 10.0,
        };
        (light, bright, dark)
    }

    #[test]
    fn le_looks_up_the_environment_map_by_direction() {
        let (light, bright, dark) = two_texel_environment();
        let light = Light::Infinite(light);

        // +x direction maps to phi near 0, the bright texel.
        let bright_ray = Ray::new(Point3f::default(), Vector3f::new(1.0, 0.0, 0.0));
        assert!((light.le(&bright_ray).y() - bright.y()).abs() < 1e-3);

        // -x direction maps to phi near pi, the dark texel.
        let dark_ray = Ray::new(Point3f::default(), Vector3f::new(-1.0, 0.0, 0.0));
        assert!((light.le(&dark_ray).y() - dark.y()).abs() < 1e-3);
    }

    #[test]
    fn importance_sampled_infinite_light_has_nonzero_power() {
        let (light, _, _) = two_texel_environment();
        let light = Light::Infinite(light);
        assert!(light.power() > 0.0);
    }
}
