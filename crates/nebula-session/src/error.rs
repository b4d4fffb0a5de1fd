//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Tab not found: {0}")]
    TabNotFound(String),

    #[error("Tab error: {0}")]
    Tab(#[from] nebula_tabs::TabError),

    #[error("Engine error: {0}")]
    Engine(#[from] nebula_engine::EngineError),
}
