//! Engine-side transfer contract
//!
//! Downloads are executed entirely by the engine; the shell only tracks
//! their state. A `TransferHandle` stays valid until the engine reports a
//! terminal outcome, after which only plain recorded data remains.

use serde::{Deserialize, Serialize};

/// Static metadata the engine reports when a transfer begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferInfo {
    /// Engine-assigned id, if its transfer mechanism provides one.
    pub id: Option<String>,
    pub url: String,
    pub suggested_file_name: String,
    pub mime: Option<String>,
    pub total_bytes: Option<u64>,
}

/// Terminal outcome reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferOutcome {
    Completed,
    Cancelled,
    Interrupted,
}

/// Live handle onto an in-flight engine transfer.
///
/// All operations are best-effort: the tracker records state changes only
/// once the engine confirms them through its own event stream, never
/// optimistically.
pub trait TransferHandle: Send + Sync {
    fn pause(&self);
    fn resume(&self);
    fn cancel(&self);
    /// Open the (partially) written file with the platform handler.
    fn open_file(&self);
    fn show_in_folder(&self);
}
