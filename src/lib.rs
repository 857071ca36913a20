#[macro_use]
extern crate impl_ops;

pub mod accelerators;
pub mod core;
pub mod error;
pub mod integrators;
pub mod lights;
pub mod materials;
pub mod media;
pub mod shapes;
pub mod textures;
