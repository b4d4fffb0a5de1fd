//! Input resolution for the address bar

use std::net::IpAddr;
use serde::{Deserialize, Serialize};
use url::Url;

/// Internal address of the built-in start page.
pub const HOME_URL: &str = "browser://home";

const INTERNAL_SCHEME: &str = "browser://";
const ALLOWED_PAGES: &[&str] = &["home", "settings"];
const NOT_FOUND_PAGE: &str = "404";

/// Result of resolving address-bar input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Concrete address to hand to the rendering surface.
    pub target: String,
    /// Address to show in the address bar and tab history.
    pub display_form: String,
    /// True when the target is a bundled local resource.
    pub is_internal: bool,
}

pub struct NavigationResolver {
    /// Search engine URL template (%s replaced with the encoded query)
    search_template: String,
    /// Location of the bundled internal pages, without trailing slash.
    pages_base: String,
}

impl NavigationResolver {
    pub fn new(pages_base: impl Into<String>) -> Self {
        Self {
            search_template: "https://www.google.com/search?q=%s".to_string(),
            pages_base: pages_base.into(),
        }
    }

    pub fn set_search_engine(&mut self, template: String) {
        self.search_template = template;
    }

    pub fn search_template(&self) -> &str {
        &self.search_template
    }

    /// Resolve user input into a loadable target.
    pub fn resolve(&self, input: &str) -> Resolution {
        let input = unquote(input.trim());

        if input.is_empty() {
            return self.resolve_internal(HOME_URL);
        }

        if input.starts_with(INTERNAL_SCHEME) {
            return self.resolve_internal(input);
        }

        if has_explicit_protocol(input) {
            return Resolution {
                target: input.to_string(),
                display_form: input.to_string(),
                is_internal: false,
            };
        }

        if looks_like_local_markup_path(input) {
            return Resolution {
                target: to_file_url(input),
                display_form: input.to_string(),
                is_internal: false,
            };
        }

        if let Some(target) = self.try_prefix_https(input) {
            return Resolution {
                target,
                display_form: input.to_string(),
                is_internal: false,
            };
        }

        Resolution {
            target: self.build_search_url(input),
            display_form: input.to_string(),
            is_internal: false,
        }
    }

    /// Map an internal-scheme address to its backing resource. Unknown
    /// pages land on the bundled "not found" page rather than failing.
    fn resolve_internal(&self, input: &str) -> Resolution {
        let page = input.trim_start_matches(INTERNAL_SCHEME);

        if ALLOWED_PAGES.contains(&page) {
            Resolution {
                target: self.page_target(page),
                display_form: format!("{INTERNAL_SCHEME}{page}"),
                is_internal: true,
            }
        } else {
            tracing::debug!(page = %page, "Unknown internal page, routing to not-found");
            Resolution {
                target: self.page_target(NOT_FOUND_PAGE),
                display_form: input.to_string(),
                is_internal: true,
            }
        }
    }

    /// Translate a committed address back to its internal-scheme display
    /// form, if it is one of the bundled pages.
    pub fn display_form_for(&self, committed: &str) -> Option<String> {
        for page in ALLOWED_PAGES {
            if committed == self.page_target(page)
                || committed.ends_with(&format!("/{page}.html"))
            {
                return Some(format!("{INTERNAL_SCHEME}{page}"));
            }
        }
        None
    }

    /// True when the address points at one of the bundled resources.
    pub fn is_internal_target(&self, address: &str) -> bool {
        address.starts_with(INTERNAL_SCHEME) || address.starts_with(&self.pages_base)
    }

    /// Bundled error page carrying the originally requested address.
    pub fn error_target(&self, attempted: &str) -> String {
        format!(
            "{}?url={}",
            self.page_target(NOT_FOUND_PAGE),
            urlencoding::encode(attempted)
        )
    }

    fn page_target(&self, page: &str) -> String {
        format!("{}/{}.html", self.pages_base, page)
    }

    /// Heuristic prefixing for bare hostnames. Returns None when the input
    /// does not look like a host, sending it to search instead.
    fn try_prefix_https(&self, input: &str) -> Option<String> {
        if !looks_like_host(input) {
            return None;
        }

        let (host, rest) = split_host_and_rest(input);
        let with_https = if is_ipv6_host(host) && !host.starts_with('[') {
            format!("https://[{}]{}", host, rest)
        } else {
            format!("https://{}{}", host, rest)
        };

        Url::parse(&with_https).ok().map(|_| with_https)
    }

    /// Build search URL from query
    fn build_search_url(&self, query: &str) -> String {
        let encoded = urlencoding::encode(query);
        self.search_template.replace("%s", &encoded)
    }
}

fn has_explicit_protocol(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://") || input.starts_with("file://")
}

/// Strip one matching pair of surrounding quotes.
fn unquote(input: &str) -> &str {
    let bytes = input.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &input[1..input.len() - 1];
        }
    }
    input
}

/// Platform path syntax ending in a markup-file extension.
fn looks_like_local_markup_path(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    let is_markup =
        lower.ends_with(".html") || lower.ends_with(".htm") || lower.ends_with(".xhtml");
    if !is_markup {
        return false;
    }

    input.starts_with('/') || input.starts_with("~/") || has_drive_prefix(input)
}

fn has_drive_prefix(input: &str) -> bool {
    let mut chars = input.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some(':'), Some('\\' | '/')) if c.is_ascii_alphabetic()
    )
}

fn to_file_url(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    if normalized.starts_with('/') {
        format!("file://{}", normalized)
    } else {
        format!("file:///{}", normalized)
    }
}

/// Heuristic check if input looks like a hostname
fn looks_like_host(input: &str) -> bool {
    // Contains spaces? Definitely a query.
    if input.contains(' ') {
        return false;
    }

    // localhost or IP address
    if input.starts_with("localhost") || is_ip_address(input) {
        return true;
    }

    // Domain-like pattern with a plausible TLD
    if input.contains('.') {
        let (host, _) = split_host_and_rest(input);
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() >= 2 {
            let tld = parts.last().unwrap_or(&"");
            let tld = tld.split(':').next().unwrap_or(tld);

            if tld.len() >= 2 && tld.len() <= 6 && tld.chars().all(|c| c.is_alphabetic()) {
                return true;
            }
        }
    }

    false
}

fn is_ip_address(input: &str) -> bool {
    let (host, _) = split_host_and_rest(input);
    parse_ip_host(host).is_some()
}

fn is_ipv6_host(host: &str) -> bool {
    matches!(parse_ip_host(host), Some(IpAddr::V6(_)))
}

fn parse_ip_host(host: &str) -> Option<IpAddr> {
    let host = host.trim();
    if host.is_empty() {
        return None;
    }

    let host = if host.starts_with('[') {
        host.strip_prefix('[')
            .and_then(|s| s.split(']').next())
            .unwrap_or(host)
    } else if host.matches(':').count() == 1 {
        host.split(':').next().unwrap_or(host)
    } else {
        host
    };

    host.parse().ok()
}

fn split_host_and_rest(input: &str) -> (&str, &str) {
    let mut cut = input.len();
    for ch in ['/', '?', '#'] {
        if let Some(idx) = input.find(ch) {
            if idx < cut {
                cut = idx;
            }
        }
    }

    input.split_at(cut)
}

// Minimal percent-encoding; the url crate only exposes form encoding,
// which turns spaces into '+'.
mod urlencoding {
    pub fn encode(input: &str) -> String {
        let mut result = String::with_capacity(input.len() * 3);
        for byte in input.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    result.push(byte as char);
                }
                _ => {
                    result.push_str(&format!("%{:02X}", byte));
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> NavigationResolver {
        NavigationResolver::new("file:///opt/nebula/pages")
    }

    #[test]
    fn test_internal_known_page() {
        let r = resolver().resolve("browser://home");
        assert_eq!(r.target, "file:///opt/nebula/pages/home.html");
        assert_eq!(r.display_form, "browser://home");
        assert!(r.is_internal);

        let r = resolver().resolve("browser://settings");
        assert_eq!(r.target, "file:///opt/nebula/pages/settings.html");
        assert!(r.is_internal);
    }

    #[test]
    fn test_internal_unknown_page_routes_to_not_found() {
        let r = resolver().resolve("browser://secrets");
        assert_eq!(r.target, "file:///opt/nebula/pages/404.html");
        assert_eq!(r.display_form, "browser://secrets");
        assert!(r.is_internal);
    }

    #[test]
    fn test_explicit_protocol_passes_through() {
        for input in [
            "https://example.com/a?b=c",
            "http://example.com",
            "file:///tmp/page.html",
        ] {
            let r = resolver().resolve(input);
            assert_eq!(r.target, input);
            assert_eq!(r.display_form, input);
            assert!(!r.is_internal);
        }
    }

    #[test]
    fn test_local_markup_path() {
        let r = resolver().resolve("/home/user/notes.html");
        assert_eq!(r.target, "file:///home/user/notes.html");

        let r = resolver().resolve(r"C:\docs\page.htm");
        assert_eq!(r.target, "file:///C:/docs/page.htm");
    }

    #[test]
    fn test_bare_domain_gets_https() {
        let r = resolver().resolve("example.com");
        assert_eq!(r.target, "https://example.com");
        assert_eq!(r.display_form, "example.com");
        assert!(!r.is_internal);
    }

    #[test]
    fn test_localhost_and_ip() {
        assert_eq!(
            resolver().resolve("localhost:8080").target,
            "https://localhost:8080"
        );
        assert_eq!(
            resolver().resolve("192.168.1.1/admin").target,
            "https://192.168.1.1/admin"
        );
        assert_eq!(resolver().resolve("::1").target, "https://[::1]");
    }

    #[test]
    fn test_search_fallback() {
        let r = resolver().resolve("example");
        assert_eq!(r.target, "https://www.google.com/search?q=example");
        assert_eq!(r.display_form, "example");

        let r = resolver().resolve("rust borrow checker");
        assert_eq!(
            r.target,
            "https://www.google.com/search?q=rust%20borrow%20checker"
        );
    }

    #[test]
    fn test_quoted_input_is_unquoted_first() {
        let r = resolver().resolve("\"example.com\"");
        assert_eq!(r.target, "https://example.com");

        let r = resolver().resolve("'plain words'");
        assert_eq!(r.target, "https://www.google.com/search?q=plain%20words");
    }

    #[test]
    fn test_empty_input_resolves_to_home() {
        let r = resolver().resolve("   ");
        assert_eq!(r.display_form, HOME_URL);
        assert!(r.is_internal);
    }

    #[test]
    fn test_custom_search_engine() {
        let mut res = resolver();
        res.set_search_engine("https://duckduckgo.com/?q=%s".to_string());
        assert_eq!(
            res.resolve("hello").target,
            "https://duckduckgo.com/?q=hello"
        );
    }

    #[test]
    fn test_display_form_for_committed_internal_page() {
        let res = resolver();
        assert_eq!(
            res.display_form_for("file:///opt/nebula/pages/home.html"),
            Some("browser://home".to_string())
        );
        assert_eq!(
            res.display_form_for("file:///opt/nebula/pages/settings.html"),
            Some("browser://settings".to_string())
        );
        assert_eq!(res.display_form_for("https://example.com"), None);
    }

    #[test]
    fn test_error_target_carries_attempted_address() {
        let res = resolver();
        assert_eq!(
            res.error_target("https://down.example"),
            "file:///opt/nebula/pages/404.html?url=https%3A%2F%2Fdown.example"
        );
    }
}
