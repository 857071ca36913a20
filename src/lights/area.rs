use std::sync::Arc;

use crate::core::light::{AreaLight, Light};
use crate::core::spectrum::Spectrum;
use crate::shapes::Shape;

pub fn create(shape: Arc<Shape>, primitive_index: usize, emission: Spectrum, two_sided: bool) -> Light {
    Light::Area(AreaLight {
        shape,
        primitive_index,
        emission,
        two_sided,
    })
}
