pub mod bssrdf;
pub mod camera;
pub mod film;
pub mod geometry;
pub mod interaction;
pub mod light;
pub mod material;
pub mod medium;
pub mod microfacet;
pub mod pbrt;
pub mod primitive;
pub mod reflection;
pub mod rng;
pub mod sampling;
pub mod scene;
pub mod spectrum;
pub mod texture;
