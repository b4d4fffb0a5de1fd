//! Extension capability traits and the data they operate on

use serde::{Deserialize, Serialize};

/// One entry of an in-progress context menu template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MenuItem {
    Separator,
    Entry {
        label: String,
        /// Action identifier the host dispatches on click.
        action: String,
    },
}

/// Context carried to menu contributors: where the menu was opened and what
/// the cursor was over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuParams {
    /// Originating tab.
    pub tab_id: String,
    pub page_url: String,
    pub link_url: Option<String>,
    pub image_url: Option<String>,
    pub selection_text: Option<String>,
}

/// Verdict from a request interceptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterceptDecision {
    Allow,
    Cancel,
    Redirect(String),
}

/// Lifecycle taps. Default bodies are no-ops so a listener only implements
/// the moments it cares about.
pub trait LifecycleListener: Send + Sync {
    fn on_app_ready(&self) {}
    fn on_session_configured(&self) {}
    fn on_surface_created(&self, _tab_id: &str) {}
}

/// Appends or edits entries of an in-progress context menu template.
pub trait MenuContributor: Send + Sync {
    fn contribute(&self, template: &mut Vec<MenuItem>, params: &MenuParams);
}

/// Inspects outgoing requests matching its URL pattern.
pub trait RequestInterceptor: Send + Sync {
    /// Glob-style pattern, `*` matching any run of characters
    /// (e.g. `*://*.example.com/*`).
    fn pattern(&self) -> &str;

    fn intercept(&self, url: &str) -> InterceptDecision;
}
