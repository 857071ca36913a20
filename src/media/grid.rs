use crate::core::geometry::Bounds3f;
use crate::core::medium::{Medium, VoxelGridMedium};
use crate::core::pbrt::Float;
use crate::core::spectrum::Spectrum;

#[allow(clippy::too_many_arguments)]
pub fn create(
    bounds: Bounds3f,
    nx: usize,
    ny: usize,
    nz: usize,
    density: Vec<Float>,
    coarse_cell: usize,
    sigma_a: Spectrum,
    sigma_s: Spectrum,
    sigma_scale: Float,
    g: Float,
) -> Medium {
    Medium::Grid(VoxelGridMedium::new(
        bounds, nx, ny, nz, density, coarse_cell, sigma_a, sigma_s, sigma_scale, g,
    ))
}
