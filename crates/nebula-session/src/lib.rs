//! Nebula Session Management
//!
//! The session manager owns the ordered collection of tabs in one top-level
//! window and the active-tab pointer. Every create/activate/navigate/close/
//! reorder flows through it, keeping exactly one invariant-consistent view:
//! the active id, when set, always references a present tab.
//!
//! Operations run on a single UI-thread-equivalent loop; engine events are
//! serialized onto the same loop before being applied, so no operation ever
//! observes a partially applied mutation of another.

mod error;
mod event;
mod manager;

pub use error::SessionError;
pub use event::SessionEvent;
pub use manager::{SessionManager, TabPosition};

pub type Result<T> = std::result::Result<T, SessionError>;
