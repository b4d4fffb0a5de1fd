//! Main shell state container
//!
//! All shell state lives on the Rust side; rendering surfaces are pure
//! viewports driven through the session manager.

use std::sync::Arc;

use nebula_download::DownloadTracker;
use nebula_engine::{SurfaceEvent, SurfaceFactory};
use nebula_extensions::{ExtensionHub, InterceptDecision, MenuItem, MenuParams};
use nebula_navigation::NavigationResolver;
use nebula_session::SessionManager;
use nebula_storage::{BookmarkStore, SiteHistoryStore};
use nebula_tabs::TabMode;

use crate::config::Config;
use crate::Result;

/// Central shell instance wiring session, downloads, persistence, and the
/// extension hook surface together.
pub struct Browser {
    config: Config,
    session: SessionManager,
    downloads: DownloadTracker,
    bookmarks: BookmarkStore,
    home_bookmarks: BookmarkStore,
    site_history: SiteHistoryStore,
    extensions: ExtensionHub,
}

impl Browser {
    pub fn new(config: Config, factory: Arc<dyn SurfaceFactory>) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        std::fs::create_dir_all(&config.download_dir)?;

        let mut resolver = NavigationResolver::new(config.pages_base.clone());
        resolver.set_search_engine(config.search_template.clone());

        Ok(Self {
            session: SessionManager::new(factory, resolver),
            downloads: DownloadTracker::new(config.download_dir.clone()),
            bookmarks: BookmarkStore::open(&config.bookmarks_path),
            home_bookmarks: BookmarkStore::open(&config.home_bookmarks_path),
            site_history: SiteHistoryStore::open(&config.site_history_path),
            extensions: ExtensionHub::new(),
            config,
        })
    }

    /// Bring the shell to a usable state: notify extensions and make sure
    /// at least one tab exists.
    pub fn initialize(&self) -> Result<()> {
        self.extensions.notify_app_ready();

        if self.session.tab_count() == 0 {
            self.session.create_tab(None)?;
        }

        self.extensions.notify_session_configured();
        tracing::info!("Browser initialized");
        Ok(())
    }

    // === Component access ===

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn downloads(&self) -> &DownloadTracker {
        &self.downloads
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    pub fn home_bookmarks(&self) -> &BookmarkStore {
        &self.home_bookmarks
    }

    pub fn site_history(&self) -> &SiteHistoryStore {
        &self.site_history
    }

    pub fn extensions(&self) -> &ExtensionHub {
        &self.extensions
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // === Tab operations ===

    /// Open a tab through the session, notifying extensions when a
    /// rendering surface came up with it.
    pub fn create_tab(&self, address: Option<&str>) -> Result<String> {
        let tab_id = self.session.create_tab(address)?;
        if self.session.get(&tab_id)?.mode == TabMode::Surfaced {
            self.extensions.notify_surface_created(&tab_id);
        }
        Ok(tab_id)
    }

    /// Navigate a tab, notifying extensions if the navigation converted a
    /// home tab and bound a fresh surface.
    pub fn navigate(&self, tab_id: &str, input: &str) -> Result<()> {
        let was_home = self.session.get(tab_id)?.mode == TabMode::Home;
        self.session.navigate(tab_id, input)?;
        if was_home && self.session.get(tab_id)?.mode == TabMode::Surfaced {
            self.extensions.notify_surface_created(tab_id);
        }
        Ok(())
    }

    // === Engine event glue ===

    /// Forward an engine event to the session, recording committed
    /// navigations into site history. Internal pages are not recorded.
    pub fn on_surface_event(&self, tab_id: &str, event: SurfaceEvent) -> Result<()> {
        if let SurfaceEvent::Navigated { url } = &event {
            if !self.is_internal_address(url) {
                self.site_history.record(url.clone());
            }
        }

        self.session.on_surface_event(tab_id, event)?;
        Ok(())
    }

    fn is_internal_address(&self, url: &str) -> bool {
        url.starts_with("browser://") || url.starts_with(&self.config.pages_base)
    }

    // === Bookmark operations ===

    /// Toggle a bookmark for `url`. Returns true when the URL is
    /// bookmarked after the call.
    pub fn toggle_bookmark(&self, title: &str, url: &str) -> bool {
        if self.bookmarks.is_bookmarked(url) {
            self.bookmarks.remove(url);
            false
        } else {
            self.bookmarks.add(title, url)
        }
    }

    /// Bookmark the active tab, or remove the bookmark if one exists.
    pub fn toggle_bookmark_for_active_tab(&self) -> Option<bool> {
        let tab = self.session.active_tab()?;
        let title = if tab.title.is_empty() {
            tab.display_url.clone()
        } else {
            tab.title.clone()
        };
        Some(self.toggle_bookmark(&title, &tab.display_url))
    }

    // === Extension hook glue ===

    /// Build the context menu for a tab, letting registered contributors
    /// extend the host template.
    pub fn build_context_menu(
        &self,
        template: Vec<MenuItem>,
        params: &MenuParams,
    ) -> Vec<MenuItem> {
        self.extensions.build_menu(template, params)
    }

    /// Ask registered interceptors about an outgoing request.
    pub fn evaluate_request(&self, url: &str) -> InterceptDecision {
        self.extensions.evaluate_request(url)
    }

    // === Settings ===

    pub fn set_search_engine(&self, template: String) {
        self.session.set_search_engine(template);
    }
}

impl Clone for Browser {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            session: self.session.clone(),
            downloads: self.downloads.clone(),
            bookmarks: self.bookmarks.clone(),
            home_bookmarks: self.home_bookmarks.clone(),
            site_history: self.site_history.clone(),
            extensions: self.extensions.clone(),
        }
    }
}
