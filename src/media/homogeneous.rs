use crate::core::medium::{HomogeneousMedium, Medium};
use crate::core::pbrt::Float;
use crate::core::spectrum::Spectrum;

pub fn create(sigma_a: Spectrum, sigma_s: Spectrum, le: Spectrum, g: Float) -> Medium {
    Medium::Homogeneous(HomogeneousMedium::new(sigma_a, sigma_s, le, g))
}
