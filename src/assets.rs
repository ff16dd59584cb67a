//! Asset URL resolution against a public base

/// Base URL (or path prefix) that relative fragment and catalog paths are
/// resolved against. Always stored with a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBase {
    base: String,
}

impl AssetBase {
    /// Creates a base from a URL or path prefix, normalizing to a trailing
    /// slash. An empty string becomes `/`.
    pub fn new(base: &str) -> Self {
        let trimmed = base.trim();
        let base = if trimmed.is_empty() {
            "/".to_string()
        } else if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        AssetBase { base }
    }

    /// Derives a base from a resource URL by dropping everything after the
    /// last path segment, so siblings of that resource resolve next to it.
    pub fn from_resource_url(url: &str) -> Self {
        let trimmed = url.trim();
        // Skip the scheme separator so "https://host" keeps its host intact.
        let path_start = trimmed.find("://").map(|i| i + 3).unwrap_or(0);
        match trimmed[path_start..].rfind('/') {
            Some(i) => AssetBase::new(&trimmed[..path_start + i + 1]),
            None => AssetBase::new(trimmed),
        }
    }

    /// The normalized base, ending in `/`.
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Resolves a fragment or catalog reference to a fetchable URL.
    ///
    /// Absolute URLs (`http://`, `https://`, scheme-relative `//`) and
    /// special schemes (`blob:`, `data:`) pass through untouched. Anything
    /// else is treated as a path relative to the base, with leading slashes
    /// stripped so the join never doubles them.
    pub fn resolve(&self, path_or_url: &str) -> String {
        let trimmed = path_or_url.trim();
        if trimmed.is_empty() {
            return self.base.clone();
        }
        if starts_with_ignore_case(trimmed, "http://")
            || starts_with_ignore_case(trimmed, "https://")
            || trimmed.starts_with("//")
            || starts_with_ignore_case(trimmed, "blob:")
            || starts_with_ignore_case(trimmed, "data:")
        {
            return trimmed.to_string();
        }
        let rel = trimmed.trim_start_matches('/');
        format!("{}{}", self.base, rel)
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
