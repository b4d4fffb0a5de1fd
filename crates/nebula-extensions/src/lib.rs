//! Nebula Extension Hook Surface
//!
//! The narrow boundary extensions plug into: lifecycle taps, a context-menu
//! contribution point, and request interception keyed by URL pattern. The
//! shell exposes these hooks but never depends on any extension being
//! registered; a hub with no registrations is fully functional.

mod hooks;
mod hub;

pub use hooks::{
    InterceptDecision, LifecycleListener, MenuContributor, MenuItem, MenuParams,
    RequestInterceptor,
};
pub use hub::ExtensionHub;
