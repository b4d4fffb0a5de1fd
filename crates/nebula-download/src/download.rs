//! Download data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use nebula_engine::TransferOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadState {
    /// Engine signalled the transfer; no progress tick seen yet
    Started,
    /// Bytes are flowing
    InProgress,
    /// Paused for later resume
    Paused,
    /// Engine-side error; resumable when the engine says so
    Interrupted,
    /// Finished successfully
    Completed,
    /// Cancelled by the user
    Cancelled,
}

impl DownloadState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DownloadState::Interrupted | DownloadState::Completed | DownloadState::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadState::Started => "started",
            DownloadState::InProgress => "inprogress",
            DownloadState::Paused => "paused",
            DownloadState::Interrupted => "interrupted",
            DownloadState::Completed => "completed",
            DownloadState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for DownloadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<TransferOutcome> for DownloadState {
    fn from(outcome: TransferOutcome) -> Self {
        match outcome {
            TransferOutcome::Completed => DownloadState::Completed,
            TransferOutcome::Cancelled => DownloadState::Cancelled,
            TransferOutcome::Interrupted => DownloadState::Interrupted,
        }
    }
}

/// User-initiated operation on a tracked transfer, delegated to the
/// engine's handle when legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DownloadAction {
    Pause,
    Resume,
    Cancel,
    OpenFile,
    ShowInFolder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Download {
    pub id: String,
    pub url: String,
    pub file_name: String,
    pub save_path: PathBuf,
    pub mime: Option<String>,
    pub total_bytes: Option<u64>,
    pub received_bytes: u64,
    pub state: DownloadState,
    /// Latest engine-reported resumability.
    pub can_resume: bool,
    pub started_at: DateTime<Utc>,
    /// Set exactly once, on the terminal state.
    pub ended_at: Option<DateTime<Utc>>,
}

impl Download {
    /// Progress as a percentage (0-100); 0 when the size is unknown.
    pub fn progress(&self) -> f64 {
        match self.total_bytes {
            Some(total) if total > 0 => {
                (self.received_bytes as f64 / total as f64 * 100.0).min(100.0)
            }
            _ => 0.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Eligible for `clear_completed`. Interrupted entries are kept until
    /// the user acknowledges them since they may still be resumable.
    pub fn is_clearable(&self) -> bool {
        matches!(
            self.state,
            DownloadState::Completed | DownloadState::Cancelled
        )
    }
}
