//! Tab mode
//!
//! A tab starts on the built-in home page without any engine surface bound.
//! The first navigation to a real address converts it in place; the
//! conversion is one-way for a given tab lifetime.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabMode {
    /// Showing the built-in start page; no rendering surface bound.
    Home,
    /// Bound to a rendering surface loading real addresses.
    Surfaced,
}

impl TabMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TabMode::Home => "home",
            TabMode::Surfaced => "surfaced",
        }
    }
}

impl std::fmt::Display for TabMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TabMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "home" => Ok(TabMode::Home),
            "surfaced" => Ok(TabMode::Surfaced),
            _ => Err(format!("Unknown tab mode: {}", s)),
        }
    }
}
