//! Build-time error taxonomy.
//!
//! Per-sample rendering code never returns `Result`: a miss, a zero PDF, or
//! degenerate geometry is reported through the structured `bool`/`Option`
//! contract described in the light-transport core's error handling design
//! (terminate the path, contribute nothing). `SceneBuildError` exists only
//! for the handful of fallible operations that happen once, at scene build
//! time, before any ray is cast.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneBuildError {
    #[error("mesh has mismatched vertex attribute arrays: {0} positions vs {1} normals")]
    MismatchedMeshAttributes(usize, usize),
    #[error("triangle index {0} out of bounds for mesh with {1} vertices")]
    IndexOutOfBounds(u32, usize),
    #[error("image texture cache miss: could not decode {0}")]
    TextureDecode(String),
    #[error("scene has zero primitives; nothing to render")]
    EmptyScene,
    #[error("model loader failure: {0}")]
    ModelLoad(String),
}

pub type BuildResult<T> = Result<T, SceneBuildError>;
