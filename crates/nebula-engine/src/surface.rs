//! Rendering-surface contract
//!
//! A surface is an embedded, engine-backed viewport bound to exactly one
//! tab. The shell issues imperative controls; the engine pushes lifecycle
//! events that are serialized onto the session loop before being applied.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Engine error code for a navigation aborted by the shell itself
/// (e.g. a load replaced by another load). Not a real failure.
pub const ERROR_ABORTED: i32 = -3;

/// How the engine asked for a new top-level target to be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NewWindowDisposition {
    /// `target="_blank"` / `window.open` expecting focus
    ForegroundTab,
    /// Middle-click style open
    BackgroundTab,
    /// Explicit request for a new top-level window
    NewWindow,
}

/// Events a rendering surface pushes back into the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// A top-level navigation committed (includes redirects the user
    /// never typed).
    Navigated { url: String },
    /// An in-page navigation committed (pushState, fragment change).
    NavigatedInPage { url: String },
    TitleUpdated { title: String },
    /// Candidate favicon URLs, best candidate first.
    FaviconUpdated { urls: Vec<String> },
    LoadFailed {
        validated_url: String,
        error_code: i32,
    },
    NewWindowRequested {
        url: String,
        disposition: NewWindowDisposition,
    },
}

/// An embedded viewport capable of loading and displaying a network or
/// local resource.
///
/// Back/forward state queried here is the engine's own view of the loaded
/// document; the shell keeps its authoritative per-tab history separately.
pub trait RenderingSurface: Send + Sync {
    fn load(&mut self, target: &str);
    fn reload(&mut self);
    fn go_back(&mut self);
    fn go_forward(&mut self);
    fn can_go_back(&self) -> bool;
    fn can_go_forward(&self) -> bool;
    /// Make this surface the visible one in its window.
    fn show(&mut self);
    fn hide(&mut self);
}

/// Creates surfaces on behalf of the session manager. One surface per
/// surfaced tab; the tab owns the returned handle exclusively.
pub trait SurfaceFactory: Send + Sync {
    fn create_surface(&self, tab_id: &str, target: &str) -> Result<Box<dyn RenderingSurface>>;
}
