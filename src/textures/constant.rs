//! `ConstantColor`/`ConstantFloat` (spec.md §4.F): a texture that
//! ignores its UV argument entirely.

use serde::{Deserialize, Serialize};

use crate::core::geometry::Point2f;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConstantTexture<T> {
    pub value: T,
}

impl<T: Copy> ConstantTexture<T> {
    pub fn new(value: T) -> Self {
        ConstantTexture { value }
    }

    pub fn evaluate(&self, _uv: Point2f) -> T {
        self.value
    }
}
