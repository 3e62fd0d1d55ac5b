//! Content-Type resolution
//!
//! Maps a requested subpath to a Content-Type. Unknown types return `None` so
//! the static-file server can decide whether to serve them at all.

use crate::fs::extension_of;
use std::collections::HashMap;

/// Fallback for unknown types when serving them is enabled
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Resolves the Content-Type of a file
pub trait ContentTypeProvider: Send + Sync {
    fn content_type(&self, subpath: &str) -> Option<String>;
}

/// Extension-based provider with the usual web mappings plus `.jsx`
#[derive(Debug, Clone)]
pub struct FileExtensionContentTypeProvider {
    mappings: HashMap<String, String>,
}

const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Text
    (".html", "text/html; charset=utf-8"),
    (".htm", "text/html; charset=utf-8"),
    (".css", "text/css"),
    (".txt", "text/plain; charset=utf-8"),
    (".md", "text/plain; charset=utf-8"),
    (".xml", "application/xml"),
    // Scripts; JSX is served after transformation
    (".js", "text/javascript"),
    (".mjs", "text/javascript"),
    (".jsx", "text/javascript"),
    (".map", "application/json"),
    (".json", "application/json"),
    (".wasm", "application/wasm"),
    // Images
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".svg", "image/svg+xml"),
    (".ico", "image/x-icon"),
    (".webp", "image/webp"),
    // Media
    (".mp4", "video/mp4"),
    (".webm", "video/webm"),
    (".mp3", "audio/mpeg"),
    (".wav", "audio/wav"),
    // Fonts
    (".woff", "font/woff"),
    (".woff2", "font/woff2"),
    (".ttf", "font/ttf"),
    (".otf", "font/otf"),
    (".eot", "application/vnd.ms-fontobject"),
    // Documents
    (".pdf", "application/pdf"),
    (".zip", "application/zip"),
];

impl FileExtensionContentTypeProvider {
    /// Provider with no mappings at all
    pub fn empty() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    /// Add or replace a mapping; `extension` may omit the leading dot
    #[must_use]
    pub fn with_mapping(mut self, extension: &str, content_type: &str) -> Self {
        self.mappings
            .insert(normalize(extension), content_type.to_string());
        self
    }

    #[must_use]
    pub fn without_mapping(mut self, extension: &str) -> Self {
        self.mappings.remove(&normalize(extension));
        self
    }
}

fn normalize(extension: &str) -> String {
    let ext = extension.to_ascii_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

impl Default for FileExtensionContentTypeProvider {
    fn default() -> Self {
        Self {
            mappings: DEFAULT_MAPPINGS
                .iter()
                .map(|(ext, ct)| ((*ext).to_string(), (*ct).to_string()))
                .collect(),
        }
    }
}

impl ContentTypeProvider for FileExtensionContentTypeProvider {
    fn content_type(&self, subpath: &str) -> Option<String> {
        let ext = extension_of(subpath)?.to_ascii_lowercase();
        self.mappings.get(&ext).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        let provider = FileExtensionContentTypeProvider::default();
        assert_eq!(
            provider.content_type("/index.html").as_deref(),
            Some("text/html; charset=utf-8")
        );
        assert_eq!(provider.content_type("/a/site.css").as_deref(), Some("text/css"));
        assert_eq!(provider.content_type("/app.js").as_deref(), Some("text/javascript"));
        assert_eq!(provider.content_type("/app.JSX").as_deref(), Some("text/javascript"));
        assert_eq!(provider.content_type("/clip.mp4").as_deref(), Some("video/mp4"));
    }

    #[test]
    fn test_unknown_extension() {
        let provider = FileExtensionContentTypeProvider::default();
        assert_eq!(provider.content_type("/data.xyz"), None);
        assert_eq!(provider.content_type("/LICENSE"), None);
    }

    #[test]
    fn test_custom_mappings() {
        let provider = FileExtensionContentTypeProvider::empty()
            .with_mapping("tsx", "text/javascript")
            .with_mapping(".css", "text/css")
            .without_mapping(".css");
        assert_eq!(provider.content_type("/a.tsx").as_deref(), Some("text/javascript"));
        assert_eq!(provider.content_type("/a.css"), None);
    }
}
