//! Request handler module
//!
//! The request pipeline: a request context, the `next` continuation, the
//! static-file server and the JSX middleware that wraps it.

pub mod middleware;
pub mod static_files;

pub use middleware::{JsxFileMiddleware, JsxFileMiddlewareBuilder, JsxFileOptions};
pub use static_files::{PrepareResponse, StaticFileOptions, StaticFileServer};

use crate::error::Error;
use crate::http::HttpResponse;
use crate::BoxFuture;
use hyper::header::AsHeaderName;
use hyper::{HeaderMap, Method, Request};
use percent_encoding::percent_decode_str;
use std::future::Future;
use std::sync::Arc;

/// Request information needed to serve a file, detached from the body
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
}

impl RequestContext {
    /// Context for `method` on `uri` (path with optional query) and no headers
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (uri, None),
        };
        Self {
            method,
            path: path.to_string(),
            query,
            headers: HeaderMap::new(),
        }
    }

    /// Context for an incoming request, with the path percent-decoded
    ///
    /// Paths that do not decode to UTF-8, or that contain NUL, are rejected.
    pub fn from_request<B>(req: &Request<B>) -> Result<Self, Error> {
        Ok(Self {
            method: req.method().clone(),
            path: decode_path(req.uri().path())?,
            query: req.uri().query().map(ToString::to_string),
            headers: req.headers().clone(),
        })
    }

    /// Header value, if present and valid ASCII
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }
}

fn decode_path(raw: &str) -> Result<String, Error> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| Error::InvalidPath(raw.to_string()))?;
    if decoded.contains('\0') {
        return Err(Error::InvalidPath(raw.to_string()));
    }
    Ok(decoded.into_owned())
}

/// The rest of the pipeline, called when a component does not answer itself
pub type Next = Arc<dyn Fn(RequestContext) -> BoxFuture<'static, Result<HttpResponse, Error>> + Send + Sync>;

/// Wrap an async function as a [`Next`] continuation
pub fn next_fn<F, Fut>(f: F) -> Next
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    Arc::new(
        move |ctx: RequestContext| -> BoxFuture<'static, Result<HttpResponse, Error>> {
            Box::pin(f(ctx))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::RANGE;

    #[test]
    fn test_new_splits_query() {
        let ctx = RequestContext::new(Method::GET, "/app.jsx?v=2");
        assert_eq!(ctx.path, "/app.jsx");
        assert_eq!(ctx.query.as_deref(), Some("v=2"));
        assert!(!ctx.is_head());
    }

    #[test]
    fn test_from_request() {
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("http://localhost/js/app.jsx?x=1")
            .header(RANGE, "bytes=0-1")
            .body(())
            .unwrap();
        let ctx = RequestContext::from_request(&req).unwrap();
        assert_eq!(ctx.path, "/js/app.jsx");
        assert_eq!(ctx.query.as_deref(), Some("x=1"));
        assert_eq!(ctx.header(RANGE), Some("bytes=0-1"));
        assert!(ctx.is_head());
    }

    #[test]
    fn test_from_request_decodes_path() {
        let req = Request::builder()
            .uri("/my%20app.jsx?name=a%20b")
            .body(())
            .unwrap();
        let ctx = RequestContext::from_request(&req).unwrap();
        assert_eq!(ctx.path, "/my app.jsx");
        assert_eq!(ctx.query.as_deref(), Some("name=a%20b"));

        let req = Request::builder().uri("/caf%C3%A9.jsx").body(()).unwrap();
        assert_eq!(RequestContext::from_request(&req).unwrap().path, "/café.jsx");
    }

    #[test]
    fn test_from_request_rejects_bad_paths() {
        for uri in ["/app%00.jsx", "/%FF.jsx"] {
            let req = Request::builder().uri(uri).body(()).unwrap();
            let err = RequestContext::from_request(&req).unwrap_err();
            assert!(matches!(err, Error::InvalidPath(ref p) if p == uri));
        }
    }
}
