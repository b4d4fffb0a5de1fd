//! Tab data structure
//!
//! A tab displays either the built-in home page (no surface bound) or a
//! rendering surface owned exclusively by the tab. Title and favicon arrive
//! asynchronously from the surface and default to placeholders until then.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nebula_engine::RenderingSurface;

use crate::error::TabError;
use crate::history::HistoryStack;
use crate::mode::TabMode;
use crate::Result;

pub const DEFAULT_TITLE: &str = "New Tab";

pub struct Tab {
    /// Unique identifier, immutable for the tab's lifetime.
    pub id: String,
    /// Address shown to the user. May differ from the loaded target when an
    /// internal scheme maps to a local resource.
    pub display_url: String,
    /// Page title pushed by the surface.
    pub title: String,
    /// Favicon URL if the surface has reported one.
    pub favicon: Option<String>,
    pub mode: TabMode,
    pub history: HistoryStack,
    /// When the tab was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Present iff `mode == Surfaced`. Owned exclusively by this tab.
    surface: Option<Box<dyn RenderingSurface>>,
}

impl std::fmt::Debug for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("display_url", &self.display_url)
            .field("title", &self.title)
            .field("mode", &self.mode)
            .field("history", &self.history)
            .field("surface", &self.surface.is_some())
            .finish()
    }
}

impl Tab {
    /// Create a tab on the built-in home page. No surface is bound.
    pub fn new_home(home_url: impl Into<String>) -> Self {
        let home_url = home_url.into();
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            display_url: home_url.clone(),
            title: DEFAULT_TITLE.to_string(),
            favicon: None,
            mode: TabMode::Home,
            history: HistoryStack::new(home_url),
            created_at: now,
            updated_at: now,
            surface: None,
        }
    }

    /// Convert a home tab to a surfaced tab in place.
    ///
    /// Identity and tab-bar position survive: only the mode flips, the
    /// history restarts at `address`, and the new surface binds.
    pub fn convert_to_surfaced(
        &mut self,
        address: impl Into<String>,
        surface: Box<dyn RenderingSurface>,
    ) -> Result<()> {
        let address = address.into();
        if address.is_empty() {
            return Err(TabError::InvalidAddress("address cannot be empty".into()));
        }

        tracing::debug!(tab_id = %self.id, address = %address, "Converting home tab to surfaced");

        self.mode = TabMode::Surfaced;
        self.display_url = address.clone();
        self.title = DEFAULT_TITLE.to_string();
        self.favicon = None;
        self.history.reset(address);
        self.surface = Some(surface);
        self.updated_at = Utc::now();

        Ok(())
    }

    /// Update page title
    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    /// Update favicon
    pub fn set_favicon(&mut self, url: Option<String>) {
        self.favicon = url;
        self.updated_at = Utc::now();
    }

    pub fn set_display_url(&mut self, url: String) {
        self.display_url = url;
        self.updated_at = Utc::now();
    }

    pub fn is_home(&self) -> bool {
        self.mode == TabMode::Home
    }

    pub fn surface(&self) -> Option<&dyn RenderingSurface> {
        self.surface.as_deref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut (dyn RenderingSurface + 'static)> {
        self.surface.as_deref_mut()
    }

    /// Drop the bound surface, releasing the engine-side viewport. Called
    /// when the tab closes; the drop cancels any pending loads promptly.
    pub fn release_surface(&mut self) {
        if self.surface.take().is_some() {
            tracing::debug!(tab_id = %self.id, "Released rendering surface");
        }
    }

    /// Get display title (with fallback to the shown address)
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.display_url
        } else {
            &self.title
        }
    }

    /// Plain-data view for UI consumers.
    pub fn snapshot(&self) -> TabSnapshot {
        TabSnapshot {
            id: self.id.clone(),
            display_url: self.display_url.clone(),
            title: self.title.clone(),
            favicon: self.favicon.clone(),
            mode: self.mode,
            history: self.history.entries().to_vec(),
            history_index: self.history.index(),
            can_go_back: self.history.can_go_back(),
            can_go_forward: self.history.can_go_forward(),
        }
    }
}

/// Serializable view of a tab for the UI layer. Carries everything needed
/// to render a tab strip entry and the back/forward affordances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabSnapshot {
    pub id: String,
    pub display_url: String,
    pub title: String,
    pub favicon: Option<String>,
    pub mode: TabMode,
    pub history: Vec<String>,
    pub history_index: usize,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}
