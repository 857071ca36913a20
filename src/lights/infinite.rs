//! Environment light: uniform-sphere sampling by default, or importance
//! sampling over an equirectangular radiance map when a `Distribution2D`
//! built over its luminance is supplied (spec.md §4.I "the obvious
//! extension").

use std::sync::Arc;

use crate::core::light::{InfiniteLight, Light};
use crate::core::sampling::Distribution2D;
use crate::core::spectrum::Spectrum;
use crate::textures::imagemap::ImageTexture;

pub fn create_uniform(radiance: Spectrum, world_radius: f32) -> Light {
    Light::Infinite(InfiniteLight {
        radiance,
        distribution: None,
        environment_map: None,
        world_radius,
    })
}

pub fn create_importance_sampled(
    environment_map: Arc<ImageTexture<Spectrum>>,
    distribution: Arc<Distribution2D>,
    world_radius: f32,
) -> Light {
    Light::Infinite(InfiniteLight {
        radiance: Spectrum::black(),
        distribution: Some(distribution),
        environment_map: Some(environment_map),
        world_radius,
    })
}
