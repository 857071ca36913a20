//! `Camera` is specified only at the interface (spec.md §6): ray
//! generation is a concrete concern of the tile-orchestration layer this
//! crate does not own.

use crate::core::geometry::{Point2f, Ray};

pub trait Camera {
    /// Generates a world-space ray through the film plane at `film_sample`
    /// (in raster coordinates) and `lens_sample` (for depth-of-field).
    fn generate_ray(&self, film_sample: Point2f, lens_sample: Point2f) -> Ray;
}
