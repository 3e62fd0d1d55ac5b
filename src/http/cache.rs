//! HTTP cache control module
//!
//! `ETag` generation, conditional request matching and Cache-Control values.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Quoted `ETag` derived from a content hash, e.g. `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Whether the client's `If-None-Match` header matches `etag`
///
/// Accepts a single tag, a comma-separated list, weak tags (`W/"..."`)
/// and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
        })
    })
}

/// Cache-Control policy for served files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Public cache with max-age in seconds
    Public(u32),
    /// Revalidate on every use
    NoCache,
}

impl CachePolicy {
    /// `0` means clients must revalidate every time
    pub const fn from_max_age(max_age: u32) -> Self {
        if max_age == 0 {
            Self::NoCache
        } else {
            Self::Public(max_age)
        }
    }

    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoCache => "no-cache".to_string(),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Public(3600)
    }
}
