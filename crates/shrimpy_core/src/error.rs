//! Errors raised while building or loading a scene.
//!
//! Only host-side scene construction can fail. Rendering itself never
//! reports errors; numerical degeneracies are handled where they occur.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while assembling a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene description error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OBJ load error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("Too many {what}: capacity is {capacity}")]
    CapacityExceeded { what: &'static str, capacity: usize },

    #[error("Unknown material id {id} ({count} materials defined)")]
    UnknownMaterial { id: u32, count: u32 },

    #[error("Unknown material name: {0}")]
    UnknownMaterialName(String),

    #[error("No geometry found in {0}")]
    EmptyMesh(PathBuf),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
