//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Session error: {0}")]
    Session(#[from] nebula_session::SessionError),

    #[error("Tab error: {0}")]
    Tab(#[from] nebula_tabs::TabError),

    #[error("Download error: {0}")]
    Download(#[from] nebula_download::DownloadError),

    #[error("Storage error: {0}")]
    Storage(#[from] nebula_storage::StorageError),

    #[error("Engine error: {0}")]
    Engine(#[from] nebula_engine::EngineError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
