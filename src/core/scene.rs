//! The assembled scene: primitives indexed by a `DynamicBvh`, the light
//! list, and the world bound lights need for solid-angle-independent
//! power estimates. Grounded on `original_source/include/bulbit/scene.h`.
//!
//! Scene construction from a file format is out of scope (spec.md §6);
//! `LoadModel` documents that boundary as an explicit stub rather than
//! silently omitting it.

use std::sync::Arc;

use crate::accelerators::bvh::DynamicBvh;
use crate::core::geometry::{Bounds3f, Ray};
use crate::core::interaction::Intersection;
use crate::core::light::Light;
use crate::core::pbrt::Float;
use crate::core::primitive::Primitive;
use crate::error::{BuildResult, SceneBuildError};

pub struct Scene {
    primitives: Vec<Primitive>,
    bvh: DynamicBvh,
    pub lights: Vec<Arc<Light>>,
    /// Indices into `lights` of every light with `LightFlags::Infinite`,
    /// so an escaped ray can accumulate `Le` from all of them.
    pub infinite_light_indices: Vec<usize>,
    world_bound: Bounds3f,
}

impl Scene {
    pub fn build(primitives: Vec<Primitive>, lights: Vec<Arc<Light>>) -> BuildResult<Self> {
        if primitives.is_empty() {
            return Err(SceneBuildError::EmptyScene);
        }

        let mut bvh = DynamicBvh::new();
        let mut world_bound = Bounds3f::default();
        for (index, primitive) in primitives.iter().enumerate() {
            let bound = primitive.world_bound();
            world_bound = crate::core::geometry::bnd3_union_bnd3f(&world_bound, &bound);
            bvh.insert_primitive(index, bound);
        }

        let infinite_light_indices = lights
            .iter()
            .enumerate()
            .filter(|(_, light)| light.flags() == crate::core::light::LightFlags::Infinite)
            .map(|(index, _)| index)
            .collect();

        Ok(Scene {
            primitives,
            bvh,
            lights,
            infinite_light_indices,
            world_bound,
        })
    }

    pub fn world_bound(&self) -> Bounds3f {
        self.world_bound
    }

    pub fn primitive(&self, index: usize) -> &Primitive {
        &self.primitives[index]
    }

    /// Nearest-hit query against every primitive in the scene.
    pub fn intersect(&self, ray: &Ray, t_min: Float, t_max: Float) -> Option<Intersection> {
        let mut closest: Option<Intersection> = None;
        self.bvh.ray_cast(ray, t_min, t_max, |primitive_index, t_lo, t_hi| {
            if let Some(hit) = self.primitives[primitive_index].intersect(ray, t_lo, t_hi, primitive_index) {
                closest = Some(hit);
                hit.t
            } else {
                t_hi
            }
        });
        closest
    }

    /// Occlusion-only query for shadow rays; stops at the first hit.
    pub fn intersect_p(&self, ray: &Ray, t_min: Float, t_max: Float) -> bool {
        self.bvh.any_hit(ray, t_min, t_max, |primitive_index, t_lo, t_hi| {
            self.primitives[primitive_index].intersect_p(ray, t_lo, t_hi)
        })
    }
}

/// Loads scene geometry and materials from a file into a primitive/light
/// list the caller then passes to `Scene::build`. File-format parsing is
/// out of scope for this crate; callers on asset-pipeline boundaries are
/// expected to supply their own loader with this signature.
pub fn load_model(_path: &std::path::Path) -> BuildResult<(Vec<Primitive>, Vec<Arc<Light>>)> {
    Err(SceneBuildError::ModelLoad(
        "model loading is outside this crate's scope; supply primitives and lights directly".to_string(),
    ))
}
