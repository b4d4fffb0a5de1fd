//! Bookmark store
//!
//! One JSON document per list. The shell keeps two independent lists, the
//! toolbar bookmarks and the home-grid quick links, each backed by its own
//! store instance.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub title: String,
    pub url: String,
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BookmarkDocument {
    bookmarks: Vec<Bookmark>,
}

pub struct BookmarkStore {
    path: PathBuf,
    bookmarks: Arc<RwLock<Vec<Bookmark>>>,
}

impl BookmarkStore {
    /// Open a store, reading the backing document if it exists. A missing
    /// or unreadable document yields an empty list.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let bookmarks = match read_document(&path) {
            Ok(doc) => doc.bookmarks,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load bookmarks, starting empty");
                Vec::new()
            }
        };

        Self {
            path,
            bookmarks: Arc::new(RwLock::new(bookmarks)),
        }
    }

    pub fn list(&self) -> Vec<Bookmark> {
        self.bookmarks.read().clone()
    }

    pub fn is_bookmarked(&self, url: &str) -> bool {
        self.bookmarks.read().iter().any(|b| b.url == url)
    }

    /// Add a bookmark. Returns false if the URL is already present or the
    /// document could not be written.
    pub fn add(&self, title: impl Into<String>, url: impl Into<String>) -> bool {
        let url = url.into();

        {
            let mut bookmarks = self.bookmarks.write();
            if bookmarks.iter().any(|b| b.url == url) {
                return false;
            }

            bookmarks.push(Bookmark {
                title: title.into(),
                url: url.clone(),
                date_added: Utc::now(),
            });
        }

        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "Failed to save bookmarks");
            self.bookmarks.write().retain(|b| b.url != url);
            return false;
        }

        tracing::debug!(url = %url, "Added bookmark");
        true
    }

    /// Remove a bookmark by URL. Returns false if absent or the document
    /// could not be written.
    pub fn remove(&self, url: &str) -> bool {
        let removed = {
            let mut bookmarks = self.bookmarks.write();
            let before = bookmarks.len();
            bookmarks.retain(|b| b.url != url);
            bookmarks.len() < before
        };

        if !removed {
            return false;
        }

        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "Failed to save bookmarks");
            return false;
        }

        tracing::debug!(url = %url, "Removed bookmark");
        true
    }

    pub fn clear(&self) -> bool {
        self.bookmarks.write().clear();

        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "Failed to clear bookmarks on disk");
            return false;
        }
        true
    }

    fn persist(&self) -> Result<()> {
        let doc = BookmarkDocument {
            bookmarks: self.bookmarks.read().clone(),
        };
        write_document(&self.path, &doc)
    }
}

impl Clone for BookmarkStore {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            bookmarks: Arc::clone(&self.bookmarks),
        }
    }
}

fn read_document(path: &Path) -> Result<BookmarkDocument> {
    if !path.exists() {
        return Ok(BookmarkDocument::default());
    }
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn write_document(path: &Path, doc: &BookmarkDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, data)?;
    Ok(())
}
