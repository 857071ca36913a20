//! Delta directional light, grounded on the teacher's now-superseded
//! `distant.rs`: a single incoming direction with no positional falloff,
//! scaled by the scene's bounding radius so the shadow ray clears it.

use crate::core::geometry::Vector3f;
use crate::core::light::{DirectionalLight, Light};
use crate::core::spectrum::Spectrum;

pub fn create(direction: Vector3f, radiance: Spectrum, world_radius: f32) -> Light {
    Light::Directional(DirectionalLight {
        direction: direction.normalize(),
        radiance,
        world_radius,
    })
}
