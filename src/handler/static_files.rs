//! Static file serving module
//!
//! Serves files from a [`FileSystem`] with `ETag`, Range and HEAD support,
//! and hands every request it does not serve to the `next` continuation.

use super::{Next, RequestContext};
use crate::error::Error;
use crate::fs::{FileContent, FileInfo, FileSystem, PhysicalFileSystem};
use crate::http::cache::{self, CachePolicy};
use crate::http::mime::{ContentTypeProvider, FileExtensionContentTypeProvider, OCTET_STREAM};
use crate::http::range::RangeParseResult;
use crate::http::response::{self, FileHeaders};
use crate::http::{self, HttpResponse};
use crate::logger;
use hyper::header::{IF_NONE_MATCH, RANGE};
use hyper::Method;
use std::sync::Arc;

/// Hook run on every 200/206 file response before it is returned
pub type PrepareResponse = Arc<dyn Fn(&FileInfo, &mut HttpResponse) + Send + Sync>;

/// Static-file serving options
#[derive(Clone)]
pub struct StaticFileOptions {
    pub content_type_provider: Arc<dyn ContentTypeProvider>,
    /// Content-Type for unknown types when `serve_unknown_file_types` is set
    pub default_content_type: Option<String>,
    pub on_prepare_response: Option<PrepareResponse>,
    /// URL prefix the files are mounted under, empty for the root
    pub request_path: String,
    pub serve_unknown_file_types: bool,
    pub cache_policy: CachePolicy,
    pub file_system: Arc<dyn FileSystem>,
}

impl Default for StaticFileOptions {
    fn default() -> Self {
        Self {
            content_type_provider: Arc::new(FileExtensionContentTypeProvider::default()),
            default_content_type: None,
            on_prepare_response: None,
            request_path: String::new(),
            serve_unknown_file_types: false,
            cache_policy: CachePolicy::default(),
            file_system: Arc::new(PhysicalFileSystem::new(".")),
        }
    }
}

/// Serves files for one configuration; cheap to construct per request
pub struct StaticFileServer {
    next: Next,
    options: StaticFileOptions,
}

impl StaticFileServer {
    pub fn new(next: Next, options: StaticFileOptions) -> Self {
        Self { next, options }
    }

    pub const fn options(&self) -> &StaticFileOptions {
        &self.options
    }

    /// Serve the request or pass it on
    ///
    /// A missing file, or a path outside the root, passes the request on;
    /// any other file-system error is returned to the caller.
    pub async fn invoke(&self, ctx: RequestContext) -> Result<HttpResponse, Error> {
        if ctx.method != Method::GET && ctx.method != Method::HEAD {
            return (self.next)(ctx).await;
        }

        let subpath = match_request_path(&self.options.request_path, &ctx.path)
            .filter(|s| !s.is_empty() && !s.ends_with('/'))
            .map(ToString::to_string);
        let Some(subpath) = subpath else {
            return (self.next)(ctx).await;
        };

        let Some(content_type) = self.resolve_content_type(&subpath) else {
            logger::log_debug(&format!("[Static] Unknown file type, skipping {subpath}"));
            return (self.next)(ctx).await;
        };

        let file = match self.options.file_system.read_file(&subpath).await {
            Ok(file) => file,
            Err(e) if e.is_unavailable() => return (self.next)(ctx).await,
            Err(e) => return Err(e.into()),
        };

        self.send_file(&ctx, file, content_type)
    }

    fn resolve_content_type(&self, subpath: &str) -> Option<String> {
        self.options
            .content_type_provider
            .content_type(subpath)
            .or_else(|| {
                self.options.serve_unknown_file_types.then(|| {
                    self.options
                        .default_content_type
                        .clone()
                        .unwrap_or_else(|| OCTET_STREAM.to_string())
                })
            })
    }

    fn send_file(
        &self,
        ctx: &RequestContext,
        file: FileContent,
        content_type: String,
    ) -> Result<HttpResponse, Error> {
        let etag = cache::generate_etag(&file.data);
        let cache_control = self.options.cache_policy.to_header_value();

        if cache::check_etag_match(ctx.header(IF_NONE_MATCH), &etag) {
            return Ok(http::build_304_response(&etag, &cache_control));
        }

        let headers = FileHeaders {
            content_type,
            etag,
            cache_control,
            last_modified: file.info.last_modified,
        };
        let total = file.data.len();

        let mut response = match http::parse_range_header(ctx.header(RANGE), total) {
            RangeParseResult::Valid(range) => {
                response::build_partial_response(&file.data, range, &headers, ctx.is_head())?
            }
            RangeParseResult::NotSatisfiable => return Ok(http::build_416_response(total)),
            RangeParseResult::None => {
                response::build_file_response(file.data, &headers, ctx.is_head())?
            }
        };

        if let Some(prepare) = &self.options.on_prepare_response {
            prepare(&file.info, &mut response);
        }

        logger::log_response(&ctx.path, response.status().as_u16(), total);
        Ok(response)
    }
}

/// Subpath of `path` below `prefix`, matching whole segments case-insensitively
///
/// The returned subpath keeps its leading `/`; it is empty when `path`
/// equals the prefix.
fn match_request_path<'a>(prefix: &str, path: &'a str) -> Option<&'a str> {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return Some(path);
    }
    let head = path.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let rest = &path[prefix.len()..];
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}
