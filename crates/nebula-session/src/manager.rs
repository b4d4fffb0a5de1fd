//! Multi-tab session manager
//!
//! Owns the tab strip of one top-level window: an ordered list of tabs plus
//! the active-tab pointer. All mutations flow through here so the invariant
//! "the active id, when set, references a present tab" holds at every
//! observable point.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use nebula_engine::{NewWindowDisposition, SurfaceEvent, SurfaceFactory, ERROR_ABORTED};
use nebula_navigation::{NavigationResolver, Resolution, HOME_URL};
use nebula_tabs::{Tab, TabSnapshot};

use crate::error::SessionError;
use crate::event::SessionEvent;
use crate::Result;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Target slot for a tab reorder, relative to another tab in the strip.
#[derive(Debug, Clone, PartialEq)]
pub enum TabPosition {
    Before(String),
    After(String),
}

struct SessionState {
    tabs: Vec<Tab>,
    active_tab_id: Option<String>,
}

impl SessionState {
    fn index_of(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    fn find_mut(&mut self, tab_id: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == tab_id)
    }

    fn hide_active_surface(&mut self) {
        if let Some(active_id) = self.active_tab_id.clone() {
            if let Some(tab) = self.find_mut(&active_id) {
                if let Some(surface) = tab.surface_mut() {
                    surface.hide();
                }
            }
        }
    }

    /// Remove a tab and pick the replacement active tab: the previous
    /// neighbor, else the next, else the first remaining, else none.
    fn remove_tab(&mut self, idx: usize) -> (Tab, bool) {
        let was_active = self.active_tab_id.as_deref() == Some(self.tabs[idx].id.as_str());

        let replacement = if was_active {
            if idx > 0 {
                Some(self.tabs[idx - 1].id.clone())
            } else if idx + 1 < self.tabs.len() {
                Some(self.tabs[idx + 1].id.clone())
            } else {
                None
            }
        } else {
            None
        };

        let mut tab = self.tabs.remove(idx);
        tab.release_surface();

        if was_active {
            self.active_tab_id = replacement.clone();
            if let Some(replacement_id) = replacement {
                if let Some(next) = self.find_mut(&replacement_id) {
                    if let Some(surface) = next.surface_mut() {
                        surface.show();
                    }
                }
            }
        }

        (tab, was_active)
    }
}

/// Session manager for one window's tabs.
///
/// Cheap to clone; clones share the same state.
pub struct SessionManager {
    state: Arc<RwLock<SessionState>>,
    factory: Arc<dyn SurfaceFactory>,
    resolver: Arc<RwLock<NavigationResolver>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            factory: Arc::clone(&self.factory),
            resolver: Arc::clone(&self.resolver),
            events: self.events.clone(),
        }
    }
}

impl SessionManager {
    pub fn new(factory: Arc<dyn SurfaceFactory>, resolver: NavigationResolver) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            state: Arc::new(RwLock::new(SessionState {
                tabs: Vec::new(),
                active_tab_id: None,
            })),
            factory,
            resolver: Arc::new(RwLock::new(resolver)),
            events,
        }
    }

    /// Subscribe to session events. A lagging or dropped receiver never
    /// blocks session operations.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Create a tab and make it active. `None` or an address resolving to
    /// the start page opens a home tab with no surface bound.
    pub fn create_tab(&self, address: Option<&str>) -> Result<String> {
        self.create_tab_with_policy(address, true)
    }

    fn create_tab_with_policy(&self, address: Option<&str>, activate: bool) -> Result<String> {
        let resolution = address.map(|input| self.resolver.read().resolve(input));

        let is_home = match &resolution {
            None => true,
            Some(r) => r.is_internal && r.display_form == HOME_URL,
        };

        let mut tab = Tab::new_home(HOME_URL);
        let tab_id = tab.id.clone();

        if !is_home {
            // Checked above: a non-home resolution only exists when address
            // was Some.
            if let Some(resolution) = resolution {
                let surface = self.factory.create_surface(&tab_id, &resolution.target)?;
                tab.convert_to_surfaced(resolution.display_form, surface)?;
            }
        }

        let snapshot = {
            let mut state = self.state.write();
            if activate {
                state.hide_active_surface();
            } else if let Some(surface) = tab.surface_mut() {
                surface.hide();
            }

            let snapshot = tab.snapshot();
            state.tabs.push(tab);
            if activate {
                state.active_tab_id = Some(tab_id.clone());
                if let Some(new_tab) = state.find_mut(&tab_id) {
                    if let Some(surface) = new_tab.surface_mut() {
                        surface.show();
                    }
                }
            }
            snapshot
        };

        tracing::info!(tab_id = %tab_id, home = is_home, "Created tab");
        self.send(SessionEvent::TabCreated { snapshot });
        if activate {
            self.send(SessionEvent::TabActivated {
                tab_id: tab_id.clone(),
            });
        }

        Ok(tab_id)
    }

    /// Switch the active tab. Activating an absent or already-active tab is
    /// a logged no-op.
    pub fn activate(&self, tab_id: &str) {
        let changed = {
            let mut state = self.state.write();
            if state.active_tab_id.as_deref() == Some(tab_id) {
                false
            } else if state.index_of(tab_id).is_none() {
                tracing::warn!(tab_id = %tab_id, "Cannot activate unknown tab");
                false
            } else {
                state.hide_active_surface();
                state.active_tab_id = Some(tab_id.to_string());
                if let Some(tab) = state.find_mut(tab_id) {
                    if let Some(surface) = tab.surface_mut() {
                        surface.show();
                    }
                }
                true
            }
        };

        if changed {
            self.send(SessionEvent::TabActivated {
                tab_id: tab_id.to_string(),
            });
        }
    }

    /// Navigate a tab to address-bar input. A home tab converts to a
    /// surfaced tab in place, keeping its id and strip position.
    pub fn navigate(&self, tab_id: &str, input: &str) -> Result<()> {
        let resolution = self.resolver.read().resolve(input);
        let is_home_target = resolution.is_internal && resolution.display_form == HOME_URL;

        let snapshot = {
            let mut state = self.state.write();
            let idx = state
                .index_of(tab_id)
                .ok_or_else(|| SessionError::TabNotFound(tab_id.to_string()))?;
            let is_active = state.active_tab_id.as_deref() == Some(tab_id);

            let tab = &mut state.tabs[idx];
            if tab.is_home() && !is_home_target {
                let surface = self.factory.create_surface(&tab.id, &resolution.target)?;
                tab.convert_to_surfaced(resolution.display_form, surface)?;
                if is_active {
                    if let Some(surface) = tab.surface_mut() {
                        surface.show();
                    }
                }
            } else {
                tab.history.push(resolution.display_form.clone());
                tab.set_display_url(resolution.display_form);
                if let Some(surface) = tab.surface_mut() {
                    surface.load(&resolution.target);
                }
            }

            tab.snapshot()
        };

        tracing::debug!(tab_id = %tab_id, url = %snapshot.display_url, "Navigating tab");
        self.send(SessionEvent::TabUpdated { snapshot });
        Ok(())
    }

    /// Step the tab's history back and reload the surface from the entry.
    /// No-op when already at the oldest entry.
    pub fn go_back(&self, tab_id: &str) -> Result<()> {
        self.step_history(tab_id, |tab| tab.history.back().map(str::to_string))
    }

    /// Step the tab's history forward. No-op at the newest entry.
    pub fn go_forward(&self, tab_id: &str) -> Result<()> {
        self.step_history(tab_id, |tab| tab.history.forward().map(str::to_string))
    }

    fn step_history<F>(&self, tab_id: &str, step: F) -> Result<()>
    where
        F: FnOnce(&mut Tab) -> Option<String>,
    {
        let resolver = self.resolver.read();
        let snapshot = {
            let mut state = self.state.write();
            let tab = state
                .find_mut(tab_id)
                .ok_or_else(|| SessionError::TabNotFound(tab_id.to_string()))?;

            if let Some(address) = step(tab) {
                let resolution = resolver.resolve(&address);
                tab.set_display_url(resolution.display_form);
                if let Some(surface) = tab.surface_mut() {
                    surface.load(&resolution.target);
                }
                Some(tab.snapshot())
            } else {
                None
            }
        };

        if let Some(snapshot) = snapshot {
            self.send(SessionEvent::TabUpdated { snapshot });
        }
        Ok(())
    }

    pub fn reload(&self, tab_id: &str) -> Result<()> {
        let mut state = self.state.write();
        let tab = state
            .find_mut(tab_id)
            .ok_or_else(|| SessionError::TabNotFound(tab_id.to_string()))?;
        if let Some(surface) = tab.surface_mut() {
            surface.reload();
        }
        Ok(())
    }

    /// Close a tab. When the active tab closes, activation falls to its
    /// previous neighbor, then the next one, then none.
    pub fn close(&self, tab_id: &str) -> Result<()> {
        let (active_tab_id, was_active) = {
            let mut state = self.state.write();
            let idx = state
                .index_of(tab_id)
                .ok_or_else(|| SessionError::TabNotFound(tab_id.to_string()))?;
            let (_, was_active) = state.remove_tab(idx);
            (state.active_tab_id.clone(), was_active)
        };

        tracing::info!(tab_id = %tab_id, "Closed tab");
        self.send(SessionEvent::TabClosed {
            tab_id: tab_id.to_string(),
            active_tab_id: active_tab_id.clone(),
        });
        if was_active {
            if let Some(next_id) = active_tab_id {
                self.send(SessionEvent::TabActivated { tab_id: next_id });
            }
        }
        Ok(())
    }

    /// Remove a tab from this session so the host can rehome it in a new
    /// window. The surface is released; the returned snapshot carries the
    /// address and metadata needed to recreate the page.
    pub fn detach_to_new_window(&self, tab_id: &str) -> Result<TabSnapshot> {
        let (snapshot, active_tab_id, was_active) = {
            let mut state = self.state.write();
            let idx = state
                .index_of(tab_id)
                .ok_or_else(|| SessionError::TabNotFound(tab_id.to_string()))?;
            let snapshot = state.tabs[idx].snapshot();
            let (_, was_active) = state.remove_tab(idx);
            (snapshot, state.active_tab_id.clone(), was_active)
        };

        tracing::info!(tab_id = %tab_id, "Detached tab to new window");
        self.send(SessionEvent::TabDetached {
            tab_id: tab_id.to_string(),
            display_url: snapshot.display_url.clone(),
            title: snapshot.title.clone(),
            favicon: snapshot.favicon.clone(),
        });
        if was_active {
            if let Some(next_id) = active_tab_id {
                self.send(SessionEvent::TabActivated { tab_id: next_id });
            }
        }
        Ok(snapshot)
    }

    /// Move a tab to a new strip position. Moving a tab relative to itself
    /// is a no-op.
    pub fn reorder(&self, tab_id: &str, position: TabPosition) -> Result<()> {
        {
            let mut state = self.state.write();
            let idx = state
                .index_of(tab_id)
                .ok_or_else(|| SessionError::TabNotFound(tab_id.to_string()))?;

            let anchor_id = match &position {
                TabPosition::Before(id) | TabPosition::After(id) => id.as_str(),
            };
            if anchor_id == tab_id {
                return Ok(());
            }
            let mut anchor_idx = state
                .index_of(anchor_id)
                .ok_or_else(|| SessionError::TabNotFound(anchor_id.to_string()))?;

            let tab = state.tabs.remove(idx);
            if anchor_idx > idx {
                anchor_idx -= 1;
            }
            let insert_at = match position {
                TabPosition::Before(_) => anchor_idx,
                TabPosition::After(_) => anchor_idx + 1,
            };
            state.tabs.insert(insert_at, tab);
        }

        self.send(SessionEvent::TabMoved {
            tab_id: tab_id.to_string(),
        });
        Ok(())
    }

    /// Apply an engine-side event to the owning tab.
    pub fn on_surface_event(&self, tab_id: &str, event: SurfaceEvent) -> Result<()> {
        match event {
            SurfaceEvent::Navigated { url } | SurfaceEvent::NavigatedInPage { url } => {
                self.apply_committed_navigation(tab_id, url)
            }
            SurfaceEvent::TitleUpdated { title } => {
                self.update_tab(tab_id, |tab| tab.set_title(title))
            }
            SurfaceEvent::FaviconUpdated { urls } => {
                let first = urls.into_iter().next();
                self.update_tab(tab_id, |tab| tab.set_favicon(first))
            }
            SurfaceEvent::LoadFailed {
                validated_url,
                error_code,
            } => self.apply_load_failure(tab_id, &validated_url, error_code),
            SurfaceEvent::NewWindowRequested { url, disposition } => {
                let activate = disposition != NewWindowDisposition::BackgroundTab;
                self.create_tab_with_policy(Some(&url), activate)?;
                Ok(())
            }
        }
    }

    /// Record an address the engine actually committed. The idempotent push
    /// absorbs re-commits of the current entry, so back/forward loads do not
    /// truncate the forward branch.
    fn apply_committed_navigation(&self, tab_id: &str, url: String) -> Result<()> {
        let display = self
            .resolver
            .read()
            .display_form_for(&url)
            .unwrap_or(url);

        self.update_tab(tab_id, |tab| {
            tab.history.push(display.clone());
            tab.set_display_url(display);
        })
    }

    /// Route a failed load to the bundled error page, keeping the attempted
    /// address visible. Aborted loads and failures of the bundled pages
    /// themselves are ignored. History is never touched here.
    fn apply_load_failure(&self, tab_id: &str, validated_url: &str, error_code: i32) -> Result<()> {
        if error_code == ERROR_ABORTED {
            return Ok(());
        }

        let resolver = self.resolver.read();
        if resolver.is_internal_target(validated_url) {
            return Ok(());
        }

        let mut state = self.state.write();
        let tab = state
            .find_mut(tab_id)
            .ok_or_else(|| SessionError::TabNotFound(tab_id.to_string()))?;

        tracing::warn!(
            tab_id = %tab_id,
            url = %validated_url,
            error_code,
            "Load failed, routing to error page"
        );
        let error_target = resolver.error_target(&tab.display_url);
        if let Some(surface) = tab.surface_mut() {
            surface.load(&error_target);
        }
        Ok(())
    }

    fn update_tab<F>(&self, tab_id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Tab),
    {
        let snapshot = {
            let mut state = self.state.write();
            let tab = state
                .find_mut(tab_id)
                .ok_or_else(|| SessionError::TabNotFound(tab_id.to_string()))?;
            apply(tab);
            tab.snapshot()
        };

        self.send(SessionEvent::TabUpdated { snapshot });
        Ok(())
    }

    pub fn set_search_engine(&self, template: String) {
        self.resolver.write().set_search_engine(template);
    }

    pub fn resolve(&self, input: &str) -> Resolution {
        self.resolver.read().resolve(input)
    }

    pub fn tabs(&self) -> Vec<TabSnapshot> {
        self.state.read().tabs.iter().map(Tab::snapshot).collect()
    }

    pub fn active_tab_id(&self) -> Option<String> {
        self.state.read().active_tab_id.clone()
    }

    pub fn active_tab(&self) -> Option<TabSnapshot> {
        let state = self.state.read();
        let active_id = state.active_tab_id.as_deref()?;
        state
            .tabs
            .iter()
            .find(|t| t.id == active_id)
            .map(Tab::snapshot)
    }

    pub fn get(&self, tab_id: &str) -> Result<TabSnapshot> {
        self.state
            .read()
            .tabs
            .iter()
            .find(|t| t.id == tab_id)
            .map(Tab::snapshot)
            .ok_or_else(|| SessionError::TabNotFound(tab_id.to_string()))
    }

    pub fn tab_count(&self) -> usize {
        self.state.read().tabs.len()
    }

    fn send(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use nebula_engine::RenderingSurface;
    use nebula_tabs::TabMode;

    type CallLog = Arc<Mutex<Vec<(String, String)>>>;

    struct FakeSurface {
        tab_id: String,
        log: CallLog,
    }

    impl FakeSurface {
        fn record(&self, op: impl Into<String>) {
            self.log
                .lock()
                .unwrap()
                .push((self.tab_id.clone(), op.into()));
        }
    }

    impl RenderingSurface for FakeSurface {
        fn load(&mut self, target: &str) {
            self.record(format!("load:{target}"));
        }
        fn reload(&mut self) {
            self.record("reload");
        }
        fn go_back(&mut self) {
            self.record("go_back");
        }
        fn go_forward(&mut self) {
            self.record("go_forward");
        }
        fn can_go_back(&self) -> bool {
            false
        }
        fn can_go_forward(&self) -> bool {
            false
        }
        fn show(&mut self) {
            self.record("show");
        }
        fn hide(&mut self) {
            self.record("hide");
        }
    }

    struct FakeFactory {
        log: CallLog,
    }

    impl SurfaceFactory for FakeFactory {
        fn create_surface(
            &self,
            tab_id: &str,
            target: &str,
        ) -> nebula_engine::Result<Box<dyn RenderingSurface>> {
            self.log
                .lock()
                .unwrap()
                .push((tab_id.to_string(), format!("create:{target}")));
            Ok(Box::new(FakeSurface {
                tab_id: tab_id.to_string(),
                log: Arc::clone(&self.log),
            }))
        }
    }

    fn manager() -> (SessionManager, CallLog) {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let factory = Arc::new(FakeFactory {
            log: Arc::clone(&log),
        });
        let resolver = NavigationResolver::new("file:///opt/nebula/pages");
        (SessionManager::new(factory, resolver), log)
    }

    fn ops_for(log: &CallLog, tab_id: &str) -> Vec<String> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == tab_id)
            .map(|(_, op)| op.clone())
            .collect()
    }

    #[test]
    fn test_create_home_tab() {
        let (manager, log) = manager();

        let id = manager.create_tab(None).unwrap();

        let tab = manager.get(&id).unwrap();
        assert_eq!(tab.mode, TabMode::Home);
        assert_eq!(tab.display_url, HOME_URL);
        assert_eq!(tab.history, vec![HOME_URL.to_string()]);
        assert_eq!(manager.active_tab_id(), Some(id));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_create_surfaced_tab() {
        let (manager, log) = manager();

        let id = manager.create_tab(Some("example.com")).unwrap();

        let tab = manager.get(&id).unwrap();
        assert_eq!(tab.mode, TabMode::Surfaced);
        assert_eq!(tab.display_url, "example.com");
        assert_eq!(tab.history, vec!["example.com".to_string()]);
        assert_eq!(
            ops_for(&log, &id),
            ["create:https://example.com", "show"]
        );
    }

    #[test]
    fn test_home_sentinel_creates_home_tab() {
        let (manager, _log) = manager();

        let id = manager.create_tab(Some(HOME_URL)).unwrap();

        assert_eq!(manager.get(&id).unwrap().mode, TabMode::Home);
    }

    #[test]
    fn test_activate_switches_surfaces() {
        let (manager, log) = manager();
        let a = manager.create_tab(Some("https://a.test/")).unwrap();
        let b = manager.create_tab(Some("https://b.test/")).unwrap();
        log.lock().unwrap().clear();

        manager.activate(&a);

        assert_eq!(manager.active_tab_id(), Some(a.clone()));
        assert_eq!(ops_for(&log, &b), ["hide"]);
        assert_eq!(ops_for(&log, &a), ["show"]);
    }

    #[test]
    fn test_activate_unknown_is_noop() {
        let (manager, _log) = manager();
        let a = manager.create_tab(None).unwrap();

        manager.activate("no-such-tab");

        assert_eq!(manager.active_tab_id(), Some(a));
    }

    #[test]
    fn test_navigate_converts_home_tab_in_place() {
        let (manager, log) = manager();
        let _a = manager.create_tab(Some("https://a.test/")).unwrap();
        let _b = manager.create_tab(Some("https://b.test/")).unwrap();
        let home = manager.create_tab(None).unwrap();
        let _d = manager.create_tab(Some("https://d.test/")).unwrap();
        manager.activate(&home);
        log.lock().unwrap().clear();

        manager.navigate(&home, "example.com").unwrap();

        let tabs = manager.tabs();
        assert_eq!(tabs.len(), 4);
        // Same id, same strip position.
        assert_eq!(tabs[2].id, home);
        assert_eq!(tabs[2].mode, TabMode::Surfaced);
        assert_eq!(tabs[2].history, vec!["example.com".to_string()]);
        assert_eq!(
            ops_for(&log, &home),
            ["create:https://example.com", "show"]
        );
    }

    #[test]
    fn test_navigate_search_fallback() {
        let (manager, log) = manager();
        let id = manager.create_tab(Some("https://a.test/")).unwrap();

        manager.navigate(&id, "rust borrow checker").unwrap();

        let tab = manager.get(&id).unwrap();
        assert_eq!(tab.display_url, "rust borrow checker");
        assert!(ops_for(&log, &id).contains(
            &"load:https://www.google.com/search?q=rust%20borrow%20checker".to_string()
        ));
    }

    #[test]
    fn test_navigate_unknown_tab() {
        let (manager, _log) = manager();
        assert!(matches!(
            manager.navigate("missing", "example.com"),
            Err(SessionError::TabNotFound(_))
        ));
    }

    #[test]
    fn test_close_activates_previous_neighbor() {
        let (manager, _log) = manager();
        let a = manager.create_tab(Some("https://a.test/")).unwrap();
        let b = manager.create_tab(Some("https://b.test/")).unwrap();
        let _c = manager.create_tab(Some("https://c.test/")).unwrap();
        manager.activate(&b);

        manager.close(&b).unwrap();

        assert_eq!(manager.active_tab_id(), Some(a));
        assert_eq!(manager.tab_count(), 2);
    }

    #[test]
    fn test_close_first_activates_next() {
        let (manager, _log) = manager();
        let a = manager.create_tab(Some("https://a.test/")).unwrap();
        let b = manager.create_tab(Some("https://b.test/")).unwrap();
        manager.activate(&a);

        manager.close(&a).unwrap();

        assert_eq!(manager.active_tab_id(), Some(b));
    }

    #[test]
    fn test_close_inactive_keeps_active() {
        let (manager, _log) = manager();
        let a = manager.create_tab(Some("https://a.test/")).unwrap();
        let b = manager.create_tab(Some("https://b.test/")).unwrap();
        manager.activate(&b);

        manager.close(&a).unwrap();

        assert_eq!(manager.active_tab_id(), Some(b));
    }

    #[test]
    fn test_close_last_tab_clears_active() {
        let (manager, _log) = manager();
        let a = manager.create_tab(None).unwrap();

        manager.close(&a).unwrap();

        assert_eq!(manager.active_tab_id(), None);
        assert_eq!(manager.tab_count(), 0);
    }

    #[test]
    fn test_reorder_after() {
        let (manager, _log) = manager();
        let a = manager.create_tab(Some("https://a.test/")).unwrap();
        let b = manager.create_tab(Some("https://b.test/")).unwrap();
        let c = manager.create_tab(Some("https://c.test/")).unwrap();

        manager.reorder(&a, TabPosition::After(c.clone())).unwrap();

        let order: Vec<String> = manager.tabs().into_iter().map(|t| t.id).collect();
        assert_eq!(order, [b, c, a]);
    }

    #[test]
    fn test_reorder_before() {
        let (manager, _log) = manager();
        let a = manager.create_tab(Some("https://a.test/")).unwrap();
        let b = manager.create_tab(Some("https://b.test/")).unwrap();
        let c = manager.create_tab(Some("https://c.test/")).unwrap();

        manager.reorder(&c, TabPosition::Before(a.clone())).unwrap();

        let order: Vec<String> = manager.tabs().into_iter().map(|t| t.id).collect();
        assert_eq!(order, [c, a, b]);
    }

    #[test]
    fn test_committed_navigation_extends_history() {
        let (manager, _log) = manager();
        let id = manager.create_tab(Some("https://a.test/")).unwrap();

        manager
            .on_surface_event(
                &id,
                SurfaceEvent::Navigated {
                    url: "https://a.test/page".to_string(),
                },
            )
            .unwrap();

        let tab = manager.get(&id).unwrap();
        assert_eq!(
            tab.history,
            vec!["https://a.test/".to_string(), "https://a.test/page".to_string()]
        );
        assert_eq!(tab.display_url, "https://a.test/page");
    }

    #[test]
    fn test_recommit_of_current_entry_is_idempotent() {
        let (manager, _log) = manager();
        let id = manager.create_tab(Some("https://a.test/")).unwrap();

        for _ in 0..3 {
            manager
                .on_surface_event(
                    &id,
                    SurfaceEvent::Navigated {
                        url: "https://a.test/".to_string(),
                    },
                )
                .unwrap();
        }

        assert_eq!(
            manager.get(&id).unwrap().history,
            vec!["https://a.test/".to_string()]
        );
    }

    #[test]
    fn test_go_back_preserves_forward_branch() {
        let (manager, log) = manager();
        let id = manager.create_tab(Some("https://a.test/")).unwrap();
        manager
            .on_surface_event(
                &id,
                SurfaceEvent::Navigated {
                    url: "https://a.test/two".to_string(),
                },
            )
            .unwrap();

        manager.go_back(&id).unwrap();
        // The engine re-commits the entry we just stepped back to.
        manager
            .on_surface_event(
                &id,
                SurfaceEvent::Navigated {
                    url: "https://a.test/".to_string(),
                },
            )
            .unwrap();

        let tab = manager.get(&id).unwrap();
        assert_eq!(tab.history_index, 0);
        assert!(tab.can_go_forward);
        assert!(ops_for(&log, &id).contains(&"load:https://a.test/".to_string()));
    }

    #[test]
    fn test_internal_commit_maps_to_display_form() {
        let (manager, _log) = manager();
        let id = manager.create_tab(Some("browser://settings")).unwrap();

        manager
            .on_surface_event(
                &id,
                SurfaceEvent::Navigated {
                    url: "file:///opt/nebula/pages/settings.html".to_string(),
                },
            )
            .unwrap();

        assert_eq!(manager.get(&id).unwrap().display_url, "browser://settings");
    }

    #[test]
    fn test_load_failure_routes_to_error_page() {
        let (manager, log) = manager();
        let id = manager.create_tab(Some("https://down.test/")).unwrap();
        let history_before = manager.get(&id).unwrap().history;

        manager
            .on_surface_event(
                &id,
                SurfaceEvent::LoadFailed {
                    validated_url: "https://down.test/".to_string(),
                    error_code: -105,
                },
            )
            .unwrap();

        let ops = ops_for(&log, &id);
        assert!(ops
            .iter()
            .any(|op| op.starts_with("load:file:///opt/nebula/pages/404.html?url=")));
        assert_eq!(manager.get(&id).unwrap().history, history_before);
    }

    #[test]
    fn test_aborted_load_failure_ignored() {
        let (manager, log) = manager();
        let id = manager.create_tab(Some("https://a.test/")).unwrap();
        log.lock().unwrap().clear();

        manager
            .on_surface_event(
                &id,
                SurfaceEvent::LoadFailed {
                    validated_url: "https://a.test/".to_string(),
                    error_code: ERROR_ABORTED,
                },
            )
            .unwrap();

        assert!(ops_for(&log, &id).is_empty());
    }

    #[test]
    fn test_new_window_request_opens_tab() {
        let (manager, _log) = manager();
        let id = manager.create_tab(Some("https://a.test/")).unwrap();

        manager
            .on_surface_event(
                &id,
                SurfaceEvent::NewWindowRequested {
                    url: "https://popup.test/".to_string(),
                    disposition: NewWindowDisposition::ForegroundTab,
                },
            )
            .unwrap();

        assert_eq!(manager.tab_count(), 2);
        let active = manager.active_tab().unwrap();
        assert_ne!(active.id, id);
        assert_eq!(active.display_url, "https://popup.test/");
    }

    #[test]
    fn test_background_tab_request_keeps_active() {
        let (manager, _log) = manager();
        let id = manager.create_tab(Some("https://a.test/")).unwrap();

        manager
            .on_surface_event(
                &id,
                SurfaceEvent::NewWindowRequested {
                    url: "https://popup.test/".to_string(),
                    disposition: NewWindowDisposition::BackgroundTab,
                },
            )
            .unwrap();

        assert_eq!(manager.tab_count(), 2);
        assert_eq!(manager.active_tab_id(), Some(id));
    }

    #[test]
    fn test_detach_returns_snapshot_and_removes() {
        let (manager, _log) = manager();
        let a = manager.create_tab(Some("https://a.test/")).unwrap();
        let b = manager.create_tab(Some("https://b.test/")).unwrap();

        let snapshot = manager.detach_to_new_window(&b).unwrap();

        assert_eq!(snapshot.id, b);
        assert_eq!(snapshot.display_url, "https://b.test/");
        assert_eq!(manager.tab_count(), 1);
        assert_eq!(manager.active_tab_id(), Some(a));
    }

    #[test]
    fn test_events_emitted_in_order() {
        let (manager, _log) = manager();
        let mut rx = manager.subscribe();

        let id = manager.create_tab(Some("https://a.test/")).unwrap();
        manager.close(&id).unwrap();

        assert!(matches!(
            rx.try_recv().unwrap(),
            SessionEvent::TabCreated { .. }
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            SessionEvent::TabActivated { .. }
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            SessionEvent::TabClosed {
                active_tab_id: None,
                ..
            }
        ));
    }

    #[test]
    fn test_set_search_engine() {
        let (manager, log) = manager();
        let id = manager.create_tab(Some("https://a.test/")).unwrap();
        manager.set_search_engine("https://duckduckgo.com/?q=%s".to_string());

        manager.navigate(&id, "nebula").unwrap();

        assert!(ops_for(&log, &id)
            .contains(&"load:https://duckduckgo.com/?q=nebula".to_string()));
    }
}
