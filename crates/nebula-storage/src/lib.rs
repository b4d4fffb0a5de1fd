//! Nebula Storage Layer
//!
//! Whole-document JSON persistence. Each store reads its document once at
//! open, serves reads from memory, and rewrites the full document on every
//! mutation. Disk failures are contained: they are logged and surfaced as
//! "operation had no effect," never as a crash.

mod bookmarks;
mod error;
mod site_history;

pub use bookmarks::{Bookmark, BookmarkStore};
pub use error::StorageError;
pub use site_history::{SiteHistoryEntry, SiteHistoryStore, SITE_HISTORY_CAP};

pub type Result<T> = std::result::Result<T, StorageError>;
