//! Extension hub
//!
//! Registry for hook implementations. Registration is explicit and keyed by
//! an extension-chosen id, so unregistration removes exactly what was added
//! and nothing mutates shared state ambiently.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::hooks::{
    InterceptDecision, LifecycleListener, MenuContributor, MenuItem, MenuParams,
    RequestInterceptor,
};

#[derive(Default)]
struct HubState {
    listeners: Vec<(String, Arc<dyn LifecycleListener>)>,
    menu_contributors: Vec<(String, Arc<dyn MenuContributor>)>,
    interceptors: Vec<(String, Arc<dyn RequestInterceptor>)>,
}

#[derive(Default)]
pub struct ExtensionHub {
    state: Arc<RwLock<HubState>>,
}

impl ExtensionHub {
    pub fn new() -> Self {
        Self::default()
    }

    // === Registration ===

    pub fn register_listener(&self, id: impl Into<String>, listener: Arc<dyn LifecycleListener>) {
        let id = id.into();
        tracing::debug!(extension = %id, "Registered lifecycle listener");
        self.state.write().listeners.push((id, listener));
    }

    pub fn unregister_listener(&self, id: &str) {
        self.state.write().listeners.retain(|(i, _)| i != id);
    }

    pub fn register_menu_contributor(
        &self,
        id: impl Into<String>,
        contributor: Arc<dyn MenuContributor>,
    ) {
        let id = id.into();
        tracing::debug!(extension = %id, "Registered menu contributor");
        self.state.write().menu_contributors.push((id, contributor));
    }

    pub fn unregister_menu_contributor(&self, id: &str) {
        self.state.write().menu_contributors.retain(|(i, _)| i != id);
    }

    pub fn register_interceptor(
        &self,
        id: impl Into<String>,
        interceptor: Arc<dyn RequestInterceptor>,
    ) {
        let id = id.into();
        tracing::debug!(extension = %id, "Registered request interceptor");
        self.state.write().interceptors.push((id, interceptor));
    }

    pub fn unregister_interceptor(&self, id: &str) {
        self.state.write().interceptors.retain(|(i, _)| i != id);
    }

    // === Dispatch ===

    pub fn notify_app_ready(&self) {
        for (_, listener) in self.state.read().listeners.iter() {
            listener.on_app_ready();
        }
    }

    pub fn notify_session_configured(&self) {
        for (_, listener) in self.state.read().listeners.iter() {
            listener.on_session_configured();
        }
    }

    pub fn notify_surface_created(&self, tab_id: &str) {
        for (_, listener) in self.state.read().listeners.iter() {
            listener.on_surface_created(tab_id);
        }
    }

    /// Run every contributor over the host's base template, in registration
    /// order, and return the finished menu.
    pub fn build_menu(&self, mut template: Vec<MenuItem>, params: &MenuParams) -> Vec<MenuItem> {
        for (_, contributor) in self.state.read().menu_contributors.iter() {
            contributor.contribute(&mut template, params);
        }
        template
    }

    /// Ask interceptors whose pattern matches. The first non-Allow verdict
    /// wins, in registration order.
    pub fn evaluate_request(&self, url: &str) -> InterceptDecision {
        for (id, interceptor) in self.state.read().interceptors.iter() {
            if !glob_match(interceptor.pattern(), url) {
                continue;
            }
            match interceptor.intercept(url) {
                InterceptDecision::Allow => continue,
                verdict => {
                    tracing::debug!(extension = %id, url = %url, ?verdict, "Request intercepted");
                    return verdict;
                }
            }
        }
        InterceptDecision::Allow
    }
}

impl Clone for ExtensionHub {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

/// `*` matches any run of characters, everything else matches literally.
fn glob_match(pattern: &str, input: &str) -> bool {
    fn inner(p: &[u8], s: &[u8]) -> bool {
        match p.split_first() {
            None => s.is_empty(),
            Some((b'*', rest)) => {
                (0..=s.len()).any(|skip| inner(rest, &s[skip..]))
            }
            Some((c, rest)) => s.split_first().is_some_and(|(sc, srest)| sc == c && inner(rest, srest)),
        }
    }
    inner(pattern.as_bytes(), input.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct CountingListener {
        ready: Mutex<u32>,
        surfaces: Mutex<Vec<String>>,
    }

    impl LifecycleListener for CountingListener {
        fn on_app_ready(&self) {
            *self.ready.lock() += 1;
        }
        fn on_surface_created(&self, tab_id: &str) {
            self.surfaces.lock().push(tab_id.to_string());
        }
    }

    struct GreetingMenu;

    impl MenuContributor for GreetingMenu {
        fn contribute(&self, template: &mut Vec<MenuItem>, params: &MenuParams) {
            template.push(MenuItem::Separator);
            template.push(MenuItem::Entry {
                label: format!("Greet {}", params.page_url),
                action: "greet".to_string(),
            });
        }
    }

    struct TrackerBlocker;

    impl RequestInterceptor for TrackerBlocker {
        fn pattern(&self) -> &str {
            "*://tracker.example/*"
        }
        fn intercept(&self, _url: &str) -> InterceptDecision {
            InterceptDecision::Cancel
        }
    }

    fn params() -> MenuParams {
        MenuParams {
            tab_id: "tab-1".to_string(),
            page_url: "https://example.com".to_string(),
            link_url: None,
            image_url: None,
            selection_text: None,
        }
    }

    #[test]
    fn test_lifecycle_dispatch() {
        let hub = ExtensionHub::new();
        let listener = Arc::new(CountingListener {
            ready: Mutex::new(0),
            surfaces: Mutex::new(Vec::new()),
        });
        hub.register_listener("counter", listener.clone());

        hub.notify_app_ready();
        hub.notify_surface_created("tab-1");

        assert_eq!(*listener.ready.lock(), 1);
        assert_eq!(listener.surfaces.lock().as_slice(), ["tab-1"]);

        hub.unregister_listener("counter");
        hub.notify_app_ready();
        assert_eq!(*listener.ready.lock(), 1);
    }

    #[test]
    fn test_menu_contribution_appends_to_template() {
        let hub = ExtensionHub::new();
        hub.register_menu_contributor("greeter", Arc::new(GreetingMenu));

        let base = vec![MenuItem::Entry {
            label: "Reload".to_string(),
            action: "reload".to_string(),
        }];
        let menu = hub.build_menu(base, &params());

        assert_eq!(menu.len(), 3);
        assert_eq!(menu[1], MenuItem::Separator);
    }

    #[test]
    fn test_request_interception_by_pattern() {
        let hub = ExtensionHub::new();
        hub.register_interceptor("blocker", Arc::new(TrackerBlocker));

        assert_eq!(
            hub.evaluate_request("https://tracker.example/pixel.gif"),
            InterceptDecision::Cancel
        );
        assert_eq!(
            hub.evaluate_request("https://example.com/"),
            InterceptDecision::Allow
        );

        hub.unregister_interceptor("blocker");
        assert_eq!(
            hub.evaluate_request("https://tracker.example/pixel.gif"),
            InterceptDecision::Allow
        );
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*://*/*", "https://example.com/path"));
        assert!(glob_match("*://*.example.com/*", "https://a.example.com/x"));
        assert!(!glob_match("*://tracker.example/*", "https://example.com/"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exactly"));
    }
}
