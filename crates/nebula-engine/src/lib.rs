//! Nebula Engine Boundary
//!
//! Contracts for the external rendering/network engine. The engine itself is
//! a pre-existing collaborator: it fetches pages, runs scripts, and paints
//! pixels. Nebula only drives it through these traits and consumes the
//! events it pushes back.

mod error;
mod surface;
mod transfer;

pub use error::EngineError;
pub use surface::{
    NewWindowDisposition, RenderingSurface, SurfaceEvent, SurfaceFactory, ERROR_ABORTED,
};
pub use transfer::{TransferHandle, TransferInfo, TransferOutcome};

pub type Result<T> = std::result::Result<T, EngineError>;
