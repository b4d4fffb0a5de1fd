//! Nebula Core
//!
//! Central coordination layer for the Nebula browser shell. Owns the
//! configuration and wires the session, downloads, persistence, and the
//! extension hook surface into one `Browser` instance.

mod browser;
mod config;
mod error;

pub use browser::Browser;
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use nebula_download::{
    Download, DownloadAction, DownloadError, DownloadEvent, DownloadState, DownloadTracker,
};
pub use nebula_engine::{
    EngineError, NewWindowDisposition, RenderingSurface, SurfaceEvent, SurfaceFactory,
    TransferHandle, TransferInfo, TransferOutcome, ERROR_ABORTED,
};
pub use nebula_extensions::{
    ExtensionHub, InterceptDecision, LifecycleListener, MenuContributor, MenuItem, MenuParams,
    RequestInterceptor,
};
pub use nebula_navigation::{NavigationResolver, Resolution, HOME_URL};
pub use nebula_session::{SessionError, SessionEvent, SessionManager, TabPosition};
pub use nebula_storage::{Bookmark, BookmarkStore, SiteHistoryEntry, SiteHistoryStore, StorageError};
pub use nebula_tabs::{Tab, TabError, TabMode, TabSnapshot};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
