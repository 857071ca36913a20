use crate::core::geometry::Point3f;
use crate::core::light::{Light, PointLight};
use crate::core::spectrum::Spectrum;

pub fn create(position: Point3f, intensity: Spectrum) -> Light {
    Light::Point(PointLight { position, intensity })
}
