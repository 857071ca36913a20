//! Per-family convenience constructors over `core::material::Material`
//! (spec.md §4.H). Scene-file ingestion is out of scope, so these take
//! already-built texture handles rather than a `TextureParams` dictionary
//! the way the teacher's `*Material::create` functions did.

pub mod conductor;
pub mod dielectric;
pub mod diffuse;
pub mod diffuse_light;
pub mod layered;
pub mod metallic_roughness;
pub mod mirror;
pub mod mixmat;
pub mod subsurface;
