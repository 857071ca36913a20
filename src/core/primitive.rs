//! A primitive binds a shape to its material, optional area light, and
//! optional participating medium (spec.md §4.D "Primitive & area light
//! binding"). Grounded on `original_source/include/bulbit/primitive.h`.

use std::sync::Arc;

use crate::core::geometry::{Bounds3f, Ray};
use crate::core::interaction::Intersection;
use crate::core::material::Material;
use crate::core::medium::MediumInterface;
use crate::core::pbrt::Float;
use crate::shapes::Shape;

pub struct Primitive {
    pub shape: Arc<Shape>,
    pub material: Arc<Material>,
    /// Index into `Scene::lights` when this primitive is also an area
    /// light's emitting geometry, so the integrator can look up its
    /// exact light for MIS after a BSDF-sampled hit.
    pub area_light_index: Option<usize>,
    pub medium_interface: MediumInterface,
}

impl Primitive {
    pub fn new(shape: Arc<Shape>, material: Arc<Material>) -> Self {
        Primitive {
            shape,
            material,
            area_light_index: None,
            medium_interface: MediumInterface::vacuum(),
        }
    }

    pub fn with_area_light(mut self, light_index: usize) -> Self {
        self.area_light_index = Some(light_index);
        self
    }

    pub fn with_medium_interface(mut self, medium_interface: MediumInterface) -> Self {
        self.medium_interface = medium_interface;
        self
    }

    pub fn world_bound(&self) -> Bounds3f {
        self.shape.world_bound()
    }

    pub fn intersect(&self, ray: &Ray, t_min: Float, t_max: Float, primitive_index: usize) -> Option<Intersection> {
        self.shape.intersect(ray, t_min, t_max, primitive_index)
    }

    pub fn intersect_p(&self, ray: &Ray, t_min: Float, t_max: Float) -> bool {
        self.shape.intersect_p(ray, t_min, t_max)
    }
}
