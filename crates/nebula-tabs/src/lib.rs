//! Nebula Tab Model
//!
//! One browsing unit per tab: identity, display metadata, a navigation
//! history stack, and the rendering surface the tab owns once it leaves the
//! built-in home page.

mod error;
mod history;
mod mode;
mod tab;

pub use error::TabError;
pub use history::HistoryStack;
pub use mode::TabMode;
pub use tab::{Tab, TabSnapshot};

pub type Result<T> = std::result::Result<T, TabError>;
