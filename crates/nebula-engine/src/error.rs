//! Engine boundary error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Surface creation failed: {0}")]
    SurfaceCreation(String),

    #[error("Surface is gone: {0}")]
    SurfaceGone(String),
}
