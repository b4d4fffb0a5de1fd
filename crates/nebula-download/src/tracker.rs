//! Download tracker
//!
//! Registry keyed by transfer id. Engine callbacks may arrive at high
//! frequency; every update applies the latest values idempotently, so
//! missed intermediate ticks cause no drift. Updates are broadcast rather
//! than targeted: a lost or slow UI surface never blocks a transfer.

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use nebula_engine::{TransferHandle, TransferInfo, TransferOutcome};

use crate::download::{Download, DownloadAction, DownloadState};
use crate::error::DownloadError;
use crate::Result;

/// Suffix attempts before falling back to a timestamp-prefixed name.
const MAX_SUFFIX_ATTEMPTS: u32 = 100;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Broadcast to every subscribed UI surface after each registry mutation.
#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Started(Download),
    Updated(Download),
    Done(Download),
}

struct Entry {
    download: Download,
    /// Live engine handle; dropped once the engine reports done so the
    /// plain data stays inspectable after the transfer object is gone.
    handle: Option<Box<dyn TransferHandle>>,
}

pub struct DownloadTracker {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    download_dir: PathBuf,
    events: broadcast::Sender<DownloadEvent>,
}

impl DownloadTracker {
    pub fn new(download_dir: PathBuf) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            download_dir,
            events,
        }
    }

    /// Subscribe a UI surface to download events.
    pub fn subscribe(&self) -> broadcast::Receiver<DownloadEvent> {
        self.events.subscribe()
    }

    /// Register a transfer the engine just started.
    ///
    /// Confirms or assigns the id and resolves a collision-free save path
    /// under the download directory.
    pub fn on_begin(&self, info: TransferInfo, handle: Box<dyn TransferHandle>) -> Download {
        let id = info
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let file_name = sanitize_file_name(&info.suggested_file_name);
        let save_path = unique_save_path(&self.download_dir, &file_name);
        let file_name = save_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&file_name)
            .to_string();

        let download = Download {
            id: id.clone(),
            url: info.url,
            file_name,
            save_path,
            mime: info.mime,
            total_bytes: info.total_bytes,
            received_bytes: 0,
            state: DownloadState::Started,
            can_resume: false,
            started_at: Utc::now(),
            ended_at: None,
        };

        tracing::info!(
            download_id = %download.id,
            url = %download.url,
            save_path = %download.save_path.display(),
            "Download started"
        );

        self.entries.write().insert(
            id,
            Entry {
                download: download.clone(),
                handle: Some(handle),
            },
        );

        let _ = self.events.send(DownloadEvent::Started(download.clone()));
        download
    }

    /// Apply a progress tick. Later ticks fully supersede earlier ones.
    pub fn on_progress(
        &self,
        id: &str,
        received_bytes: u64,
        total_bytes: Option<u64>,
        can_resume: bool,
        paused: bool,
    ) -> Result<Download> {
        let download = {
            let mut entries = self.entries.write();
            let entry = entries
                .get_mut(id)
                .ok_or_else(|| DownloadError::NotFound(id.to_string()))?;

            // A tick that raced the terminal event changes nothing.
            if entry.download.is_terminal() {
                return Ok(entry.download.clone());
            }

            entry.download.received_bytes = received_bytes;
            if let Some(total) = total_bytes {
                entry.download.total_bytes = Some(total);
            }
            entry.download.can_resume = can_resume;
            entry.download.state = if paused {
                DownloadState::Paused
            } else {
                DownloadState::InProgress
            };

            entry.download.clone()
        };

        let _ = self.events.send(DownloadEvent::Updated(download.clone()));
        Ok(download)
    }

    /// Finalize a transfer on the engine's terminal event. The live handle
    /// is dropped; only plain data remains in the registry.
    pub fn on_done(&self, id: &str, outcome: TransferOutcome) -> Result<Download> {
        let download = {
            let mut entries = self.entries.write();
            let entry = entries
                .get_mut(id)
                .ok_or_else(|| DownloadError::NotFound(id.to_string()))?;

            if entry.download.is_terminal() {
                tracing::warn!(download_id = %id, "Duplicate terminal event ignored");
                return Ok(entry.download.clone());
            }

            entry.download.state = DownloadState::from(outcome);
            entry.download.ended_at = Some(Utc::now());
            entry.handle = None;

            entry.download.clone()
        };

        tracing::info!(
            download_id = %id,
            state = %download.state,
            "Download done"
        );

        let _ = self.events.send(DownloadEvent::Done(download.clone()));
        Ok(download)
    }

    /// Delegate a user operation to the engine handle. Returns whether the
    /// action was accepted (handle present and the operation legal in the
    /// current state). Acceptance is not completion: state changes land
    /// only when the engine confirms them through its events.
    pub fn action(&self, id: &str, action: DownloadAction) -> bool {
        let entries = self.entries.read();
        let Some(entry) = entries.get(id) else {
            return false;
        };
        let Some(handle) = entry.handle.as_ref() else {
            return false;
        };

        let state = entry.download.state;
        match action {
            DownloadAction::Pause => {
                if !matches!(state, DownloadState::Started | DownloadState::InProgress) {
                    return false;
                }
                handle.pause();
            }
            DownloadAction::Resume => {
                if !entry.download.can_resume
                    || !matches!(state, DownloadState::Paused | DownloadState::Interrupted)
                {
                    return false;
                }
                handle.resume();
            }
            DownloadAction::Cancel => {
                if state.is_terminal() {
                    return false;
                }
                handle.cancel();
            }
            DownloadAction::OpenFile => handle.open_file(),
            DownloadAction::ShowInFolder => handle.show_in_folder(),
        }

        tracing::debug!(download_id = %id, ?action, "Delegated download action");
        true
    }

    /// Remove completed and cancelled entries. Interrupted entries stay
    /// until explicitly dismissed; in-flight entries are never dropped.
    pub fn clear_completed(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !e.download.is_clearable());
        let removed = before - entries.len();

        if removed > 0 {
            tracing::info!(removed, "Cleared finished downloads");
        }
        removed
    }

    /// Acknowledge and drop a single terminal entry (the only way an
    /// interrupted download leaves the registry).
    pub fn dismiss(&self, id: &str) -> bool {
        let mut entries = self.entries.write();
        match entries.get(id) {
            Some(e) if e.download.is_terminal() => {
                entries.remove(id);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: &str) -> Result<Download> {
        self.entries
            .read()
            .get(id)
            .map(|e| e.download.clone())
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))
    }

    pub fn list(&self) -> Vec<Download> {
        let mut downloads: Vec<Download> = self
            .entries
            .read()
            .values()
            .map(|e| e.download.clone())
            .collect();
        downloads.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        downloads
    }

    pub fn active(&self) -> Vec<Download> {
        self.entries
            .read()
            .values()
            .filter(|e| !e.download.is_terminal())
            .map(|e| e.download.clone())
            .collect()
    }
}

impl Clone for DownloadTracker {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            download_dir: self.download_dir.clone(),
            events: self.events.clone(),
        }
    }
}

fn sanitize_file_name(file_name: &str) -> String {
    let name = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("download")
        .trim();

    if name.is_empty() {
        "download".to_string()
    } else {
        name.to_string()
    }
}

/// Resolve a save path that does not collide with an existing file by
/// appending a ` (n)` counter to the stem, bounded, with a
/// timestamp-prefixed fallback.
fn unique_save_path(dir: &Path, file_name: &str) -> PathBuf {
    let base = dir.join(file_name);
    if !base.exists() {
        return base;
    }

    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let extension = Path::new(file_name).extension().and_then(|e| e.to_str());

    for n in 1..=MAX_SUFFIX_ATTEMPTS {
        let candidate_name = match extension {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        let candidate = dir.join(candidate_name);
        if !candidate.exists() {
            return candidate;
        }
    }

    let fallback = format!("{}-{}", Utc::now().format("%Y%m%d%H%M%S"), file_name);
    dir.join(fallback)
}
