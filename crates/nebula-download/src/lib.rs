//! Nebula Download Tracker
//!
//! Host-process registry of in-flight and finished transfers. The engine
//! executes the transfers; the tracker records their state, resolves save
//! paths, and broadcasts every change to all interested UI surfaces.

mod download;
mod error;
mod tracker;

pub use download::{Download, DownloadAction, DownloadState};
pub use error::DownloadError;
pub use tracker::{DownloadEvent, DownloadTracker};

pub type Result<T> = std::result::Result<T, DownloadError>;
