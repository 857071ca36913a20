//! `Film` is specified only at the interface (spec.md §6): pixel-filter
//! reconstruction, tile merging, and image output are out of scope.

use crate::core::geometry::Point2f;
use crate::core::pbrt::Float;
use crate::core::spectrum::Spectrum;

pub trait Film {
    /// Accumulates one radiance sample at a film-plane location.
    fn add_sample(&mut self, film_point: Point2f, radiance: Spectrum, weight: Float);
}
