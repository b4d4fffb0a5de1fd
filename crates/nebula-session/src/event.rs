//! Session events
//!
//! Broadcast to UI surfaces after every structural mutation so the tab bar,
//! address bar, and back/forward affordances can refresh.

use serde::Serialize;

use nebula_tabs::TabSnapshot;

#[derive(Debug, Clone, Serialize)]
pub enum SessionEvent {
    TabCreated { snapshot: TabSnapshot },
    TabActivated { tab_id: String },
    /// Metadata, mode, or history of a tab changed.
    TabUpdated { snapshot: TabSnapshot },
    /// Tab-bar order changed.
    TabMoved { tab_id: String },
    TabClosed {
        tab_id: String,
        active_tab_id: Option<String>,
    },
    /// The tab left this session; an equivalent tab should open in a new
    /// top-level window.
    TabDetached {
        tab_id: String,
        display_url: String,
        title: String,
        favicon: Option<String>,
    },
}
