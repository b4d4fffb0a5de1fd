//! Nebula Navigation
//!
//! Address-bar input resolution:
//! 1. `browser://page` → bundled local resource (allow-listed)
//! 2. Explicit protocol → use as-is
//! 3. Local markup file path → `file://` target
//! 4. Hostname-looking input → `https://` prefix
//! 5. Everything else → search-provider query
//!
//! Resolution is pure and infallible: every input produces a loadable
//! target.

mod resolver;

pub use resolver::{NavigationResolver, Resolution, HOME_URL};
