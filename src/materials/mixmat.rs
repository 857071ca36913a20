//! Stochastic blend of two materials (spec.md §4.H): `MixMaterial` is
//! resolved per-shading-point by `core::material::hash_point_dir`, not by
//! Russian-roulette at sample time, so the same point always re-derives
//! the same child across bounces.

use std::sync::Arc;

use crate::core::material::{Material, MixMaterial};
use crate::core::pbrt::Float;

pub fn create(amount: Float, a: Arc<Material>, b: Arc<Material>) -> Material {
    Material::Mix(MixMaterial { amount, a, b })
}
