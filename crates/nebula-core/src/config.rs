//! Shell configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use nebula_navigation::HOME_URL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Location of the bundled internal pages, as a URL base without a
    /// trailing slash.
    pub pages_base: String,
    /// Address a fresh tab starts on.
    pub home_url: String,
    /// Search engine URL template (%s replaced with the encoded query)
    pub search_template: String,
    /// Default download directory
    pub download_dir: PathBuf,
    /// Root for persisted shell state
    pub data_dir: PathBuf,
    /// Path to the bookmarks file
    pub bookmarks_path: PathBuf,
    /// Path to the start-page pinned bookmarks file
    pub home_bookmarks_path: PathBuf,
    /// Path to the visited-sites file
    pub site_history_path: PathBuf,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        let download_dir = dirs::download_dir().unwrap_or_else(|| data_dir.join("Downloads"));
        let pages_dir = data_dir.join("pages").to_string_lossy().replace('\\', "/");

        Self {
            pages_base: format!("file://{}", pages_dir.trim_end_matches('/')),
            home_url: HOME_URL.to_string(),
            search_template: "https://www.google.com/search?q=%s".to_string(),
            download_dir,
            bookmarks_path: data_dir.join("bookmarks.json"),
            home_bookmarks_path: data_dir.join("home-bookmarks.json"),
            site_history_path: data_dir.join("site-history.json"),
            data_dir,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Nebula"))
            .unwrap_or_else(|| PathBuf::from(".nebula"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Simple dirs implementation for common directories
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }

    pub fn download_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|h| PathBuf::from(h).join("Downloads"))
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Downloads"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DOWNLOAD_DIR")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join("Downloads"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_data_dir() {
        let config = Config::new(PathBuf::from("/var/lib/nebula"));

        assert_eq!(config.pages_base, "file:///var/lib/nebula/pages");
        assert_eq!(config.home_url, HOME_URL);
        assert_eq!(
            config.bookmarks_path,
            PathBuf::from("/var/lib/nebula/bookmarks.json")
        );
        assert_eq!(
            config.site_history_path,
            PathBuf::from("/var/lib/nebula/site-history.json")
        );
    }
}
