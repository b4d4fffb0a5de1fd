//! Site history store
//!
//! Newest-first list of visited addresses, de-duplicated on insert and
//! capped at the most recent 100 entries. Whole-document JSON like the
//! bookmark store; persistence is best-effort and never blocks recording.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Result;

pub const SITE_HISTORY_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteHistoryEntry {
    pub url: String,
    pub visited_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SiteHistoryDocument {
    entries: Vec<SiteHistoryEntry>,
}

pub struct SiteHistoryStore {
    path: PathBuf,
    entries: Arc<RwLock<Vec<SiteHistoryEntry>>>,
}

impl SiteHistoryStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_document(&path) {
            Ok(doc) => doc.entries,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load site history, starting empty");
                Vec::new()
            }
        };

        Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Record a visit. An existing entry for the same URL moves to the
    /// front instead of duplicating; the oldest entry is evicted past the
    /// cap.
    pub fn record(&self, url: impl Into<String>) {
        let url = url.into();

        {
            let mut entries = self.entries.write();
            entries.retain(|e| e.url != url);
            entries.insert(
                0,
                SiteHistoryEntry {
                    url,
                    visited_at: Utc::now(),
                },
            );
            entries.truncate(SITE_HISTORY_CAP);
        }

        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "Failed to save site history");
        }
    }

    /// Newest first.
    pub fn entries(&self) -> Vec<SiteHistoryEntry> {
        self.entries.read().clone()
    }

    pub fn clear(&self) -> bool {
        self.entries.write().clear();

        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "Failed to clear site history on disk");
            return false;
        }
        true
    }

    fn persist(&self) -> Result<()> {
        let doc = SiteHistoryDocument {
            entries: self.entries.read().clone(),
        };
        write_document(&self.path, &doc)
    }
}

impl Clone for SiteHistoryStore {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            entries: Arc::clone(&self.entries),
        }
    }
}

fn read_document(path: &Path) -> Result<SiteHistoryDocument> {
    if !path.exists() {
        return Ok(SiteHistoryDocument::default());
    }
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn write_document(path: &Path, doc: &SiteHistoryDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_moves_to_front() {
        let dir = tempfile::tempdir().unwrap();
        let store = SiteHistoryStore::open(dir.path().join("history.json"));

        store.record("https://a.example");
        store.record("https://b.example");
        store.record("https://a.example");

        let entries = store.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "https://a.example");
        assert_eq!(entries[1].url, "https://b.example");
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let store = SiteHistoryStore::open(dir.path().join("history.json"));

        for i in 0..SITE_HISTORY_CAP {
            store.record(format!("https://site{i}.example"));
        }
        assert_eq!(store.entries().len(), SITE_HISTORY_CAP);

        store.record("https://one-more.example");
        let entries = store.entries();
        assert_eq!(entries.len(), SITE_HISTORY_CAP);
        assert_eq!(entries[0].url, "https://one-more.example");
        // The oldest entry is gone
        assert!(!entries.iter().any(|e| e.url == "https://site0.example"));
    }

    #[test]
    fn test_reopen_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let store = SiteHistoryStore::open(&path);
        store.record("https://a.example");
        store.record("https://b.example");

        let reopened = SiteHistoryStore::open(&path);
        let entries = reopened.entries();
        assert_eq!(entries[0].url, "https://b.example");
        assert_eq!(entries[1].url, "https://a.example");
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SiteHistoryStore::open(dir.path().join("history.json"));

        store.record("https://a.example");
        assert!(store.clear());
        assert!(store.entries().is_empty());
    }
}
