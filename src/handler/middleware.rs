//! JSX file middleware
//!
//! Serves `.jsx` files transpiled to JavaScript by wrapping a
//! [`StaticFileServer`] around a [`JsxFileSystem`]. Each request gets its own
//! environment (and so its own transformer), released when the request ends.

use super::static_files::{StaticFileOptions, StaticFileServer};
use super::{Next, RequestContext};
use crate::environment::{EnvironmentFactory, EnvironmentGuard};
use crate::error::Error;
use crate::http::HttpResponse;
use crate::jsx::{normalize_extensions, JsxFileSystem, JsxTransformer};
use std::sync::Arc;

/// Middleware configuration
#[derive(Clone)]
pub struct JsxFileOptions {
    /// Extensions served through the transformer, e.g. `.jsx`
    pub extensions: Vec<String>,
    /// Options for the wrapped static-file server; `file_system` is the
    /// base file system the adapter reads from
    pub static_file_options: StaticFileOptions,
}

impl Default for JsxFileOptions {
    fn default() -> Self {
        Self {
            extensions: vec![".jsx".to_string()],
            static_file_options: StaticFileOptions::default(),
        }
    }
}

/// Builder for [`JsxFileMiddleware`]
#[derive(Default)]
pub struct JsxFileMiddlewareBuilder {
    next: Option<Next>,
    options: Option<JsxFileOptions>,
    environment: Option<EnvironmentFactory>,
}

impl JsxFileMiddlewareBuilder {
    /// The rest of the pipeline. Required.
    #[must_use]
    pub fn next(mut self, next: Next) -> Self {
        self.next = Some(next);
        self
    }

    /// Defaults to [`JsxFileOptions::default`] when not set
    #[must_use]
    pub fn options(mut self, options: JsxFileOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Per-request environment factory. Required.
    #[must_use]
    pub fn environment(mut self, factory: EnvironmentFactory) -> Self {
        self.environment = Some(factory);
        self
    }

    pub fn build(self) -> Result<JsxFileMiddleware, Error> {
        let next = self.next.ok_or(Error::MissingNext)?;
        let environment = self.environment.ok_or(Error::MissingEnvironment)?;
        let options = self.options.unwrap_or_default();
        let extensions = normalize_extensions(&options.extensions).into();

        Ok(JsxFileMiddleware {
            next,
            options,
            extensions,
            environment,
        })
    }
}

pub struct JsxFileMiddleware {
    next: Next,
    options: JsxFileOptions,
    extensions: Arc<[String]>,
    environment: EnvironmentFactory,
}

impl JsxFileMiddleware {
    pub fn builder() -> JsxFileMiddlewareBuilder {
        JsxFileMiddlewareBuilder::default()
    }

    pub const fn options(&self) -> &JsxFileOptions {
        &self.options
    }

    /// Serve the request, transpiling matching files
    ///
    /// Exactly one environment is resolved and released per call. Errors
    /// from resolution or from serving are returned unchanged, after release.
    pub async fn invoke(&self, ctx: RequestContext) -> Result<HttpResponse, Error> {
        let environment = EnvironmentGuard::resolve(&self.environment)?;
        let server = self.create_file_server(environment.transformer());
        server.invoke(ctx).await
    }

    fn create_file_server(&self, transformer: Arc<dyn JsxTransformer>) -> StaticFileServer {
        let base = &self.options.static_file_options;
        let file_system = JsxFileSystem::new(
            transformer,
            Arc::clone(&base.file_system),
            Arc::clone(&self.extensions),
        );

        StaticFileServer::new(
            Arc::clone(&self.next),
            StaticFileOptions {
                file_system: Arc::new(file_system),
                ..base.clone()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::tests::{counting_factory, Counters};
    use crate::environment::{environment_factory, JsxEnvironment};
    use crate::error::{FsError, ResolveError, TransformError};
    use crate::fs::{FileSystem, MemoryFileSystem};
    use crate::handler::next_fn;
    use crate::http::{self, cache::CachePolicy};
    use crate::jsx::tests::RecordingTransformer;
    use http_body_util::BodyExt;
    use hyper::body::Bytes;
    use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE};
    use hyper::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SOURCE: &str = "var x = <Foo/>;";

    struct Harness {
        middleware: JsxFileMiddleware,
        transformer: Arc<RecordingTransformer>,
        counters: Arc<Counters>,
        next_hits: Arc<AtomicUsize>,
    }

    fn base_fs() -> MemoryFileSystem {
        MemoryFileSystem::new()
            .with_file("/app.jsx", SOURCE)
            .with_file("/style.css", "body { margin: 0 }")
            .with_file("/bad.jsx", "<div")
    }

    fn next_404(hits: &Arc<AtomicUsize>) -> Next {
        let hits = Arc::clone(hits);
        next_fn(move |_ctx| {
            hits.fetch_add(1, Ordering::SeqCst);
            async { Ok(http::build_404_response()) }
        })
    }

    fn harness_with(transformer: RecordingTransformer) -> Harness {
        let transformer = Arc::new(transformer);
        let counters = Arc::new(Counters::default());
        let next_hits = Arc::new(AtomicUsize::new(0));
        let options = JsxFileOptions {
            static_file_options: StaticFileOptions {
                file_system: Arc::new(base_fs()),
                ..StaticFileOptions::default()
            },
            ..JsxFileOptions::default()
        };
        let middleware = JsxFileMiddleware::builder()
            .next(next_404(&next_hits))
            .options(options)
            .environment(counting_factory(
                Arc::clone(&transformer),
                Arc::clone(&counters),
            ))
            .build()
            .unwrap();
        Harness {
            middleware,
            transformer,
            counters,
            next_hits,
        }
    }

    fn harness() -> Harness {
        harness_with(RecordingTransformer::default())
    }

    async fn body(resp: HttpResponse) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_jsx_is_served_transformed() {
        let h = harness();
        let resp = h
            .middleware
            .invoke(RequestContext::new(Method::GET, "/app.jsx"))
            .await
            .unwrap();

        let expected = RecordingTransformer::output_for("/app.jsx", SOURCE);
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/javascript");
        assert_eq!(
            resp.headers()[CONTENT_LENGTH],
            expected.len().to_string().as_str()
        );
        assert_eq!(&body(resp).await[..], expected.as_bytes());
        assert_eq!(h.transformer.calls(), vec!["/app.jsx".to_string()]);
        assert_eq!((h.counters.resolved(), h.counters.released()), (1, 1));
    }

    #[tokio::test]
    async fn test_other_files_are_byte_identical() {
        let h = harness();
        let resp = h
            .middleware
            .invoke(RequestContext::new(Method::GET, "/style.css"))
            .await
            .unwrap();

        let plain = StaticFileServer::new(
            next_404(&Arc::new(AtomicUsize::new(0))),
            StaticFileOptions {
                file_system: Arc::new(base_fs()),
                ..StaticFileOptions::default()
            },
        )
        .invoke(RequestContext::new(Method::GET, "/style.css"))
        .await
        .unwrap();

        assert_eq!(resp.status(), plain.status());
        assert_eq!(resp.headers()[CONTENT_LENGTH], plain.headers()[CONTENT_LENGTH]);
        assert_eq!(body(resp).await, body(plain).await);
        assert!(h.transformer.calls().is_empty());
        assert_eq!((h.counters.resolved(), h.counters.released()), (1, 1));
    }

    #[tokio::test]
    async fn test_missing_jsx_still_releases() {
        let h = harness();
        let resp = h
            .middleware
            .invoke(RequestContext::new(Method::GET, "/missing.jsx"))
            .await
            .unwrap();

        assert_eq!(resp.status(), 404);
        assert_eq!(h.next_hits.load(Ordering::SeqCst), 1);
        assert!(h.transformer.calls().is_empty());
        assert_eq!((h.counters.resolved(), h.counters.released()), (1, 1));
    }

    #[tokio::test]
    async fn test_jsx_outside_root_goes_to_next() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("public");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(dir.path().join("secret.jsx"), SOURCE).unwrap();

        let transformer = Arc::new(RecordingTransformer::default());
        let counters = Arc::new(Counters::default());
        let next_hits = Arc::new(AtomicUsize::new(0));
        let middleware = JsxFileMiddleware::builder()
            .next(next_404(&next_hits))
            .options(JsxFileOptions {
                static_file_options: StaticFileOptions {
                    file_system: Arc::new(crate::fs::PhysicalFileSystem::new(&root)),
                    ..StaticFileOptions::default()
                },
                ..JsxFileOptions::default()
            })
            .environment(counting_factory(
                Arc::clone(&transformer),
                Arc::clone(&counters),
            ))
            .build()
            .unwrap();

        let resp = middleware
            .invoke(RequestContext::new(Method::GET, "/../secret.jsx"))
            .await
            .unwrap();

        assert_eq!(resp.status(), 404);
        assert_eq!(next_hits.load(Ordering::SeqCst), 1);
        assert!(transformer.calls().is_empty());
        assert_eq!((counters.resolved(), counters.released()), (1, 1));
    }

    #[tokio::test]
    async fn test_transform_error_propagates_and_releases() {
        let h = harness_with(RecordingTransformer::failing());
        let err = h
            .middleware
            .invoke(RequestContext::new(Method::GET, "/bad.jsx"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::FileSystem(FsError::Transform(TransformError::Failed { .. }))
        ));
        assert_eq!((h.counters.resolved(), h.counters.released()), (1, 1));
    }

    #[tokio::test]
    async fn test_one_resolution_per_request() {
        let h = harness();
        for path in ["/app.jsx", "/style.css", "/missing.jsx", "/app.jsx"] {
            h.middleware
                .invoke(RequestContext::new(Method::GET, path))
                .await
                .unwrap();
        }
        assert_eq!((h.counters.resolved(), h.counters.released()), (4, 4));
        assert_eq!(h.transformer.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_error_from_next_propagates_and_releases() {
        let counters = Arc::new(Counters::default());
        let middleware = JsxFileMiddleware::builder()
            .next(next_fn(|_ctx| async {
                Err(Error::Resolve(ResolveError("downstream".to_string())))
            }))
            .options(JsxFileOptions {
                static_file_options: StaticFileOptions {
                    file_system: Arc::new(base_fs()),
                    ..StaticFileOptions::default()
                },
                ..JsxFileOptions::default()
            })
            .environment(counting_factory(Arc::default(), Arc::clone(&counters)))
            .build()
            .unwrap();

        let err = middleware
            .invoke(RequestContext::new(Method::POST, "/app.jsx"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to resolve JSX environment: downstream");
        assert_eq!((counters.resolved(), counters.released()), (1, 1));
    }

    #[tokio::test]
    async fn test_cancelled_request_releases() {
        struct Pending;
        impl FileSystem for Pending {
            fn read_file<'a>(
                &'a self,
                _subpath: &'a str,
            ) -> crate::BoxFuture<'a, Result<crate::fs::FileContent, FsError>> {
                Box::pin(std::future::pending())
            }

            fn read_dir<'a>(
                &'a self,
                _subpath: &'a str,
            ) -> crate::BoxFuture<'a, Result<Vec<crate::fs::FileInfo>, FsError>> {
                Box::pin(std::future::pending())
            }
        }

        let counters = Arc::new(Counters::default());
        let middleware = JsxFileMiddleware::builder()
            .next(next_404(&Arc::new(AtomicUsize::new(0))))
            .options(JsxFileOptions {
                static_file_options: StaticFileOptions {
                    file_system: Arc::new(Pending),
                    ..StaticFileOptions::default()
                },
                ..JsxFileOptions::default()
            })
            .environment(counting_factory(Arc::default(), Arc::clone(&counters)))
            .build()
            .unwrap();

        let request = middleware.invoke(RequestContext::new(Method::GET, "/app.jsx"));
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(20), request).await;
        assert!(timed_out.is_err());
        assert_eq!((counters.resolved(), counters.released()), (1, 1));
    }

    #[tokio::test]
    async fn test_resolve_error_propagates() {
        let next_hits = Arc::new(AtomicUsize::new(0));
        let middleware = JsxFileMiddleware::builder()
            .next(next_404(&next_hits))
            .environment(environment_factory(|| {
                Err::<Box<dyn JsxEnvironment>, _>(ResolveError("container disposed".to_string()))
            }))
            .build()
            .unwrap();

        let err = middleware
            .invoke(RequestContext::new(Method::GET, "/app.jsx"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Resolve(_)));
        assert_eq!(next_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_build_without_next_fails() {
        let err = JsxFileMiddleware::builder()
            .environment(counting_factory(Arc::default(), Arc::default()))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, Error::MissingNext));
    }

    #[test]
    fn test_build_without_environment_fails() {
        let err = JsxFileMiddleware::builder()
            .next(next_404(&Arc::new(AtomicUsize::new(0))))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, Error::MissingEnvironment));
    }

    #[test]
    fn test_omitted_options_use_defaults() {
        let middleware = JsxFileMiddleware::builder()
            .next(next_404(&Arc::new(AtomicUsize::new(0))))
            .environment(counting_factory(Arc::default(), Arc::default()))
            .build()
            .unwrap();

        let defaults = JsxFileOptions::default();
        let options = middleware.options();
        assert_eq!(options.extensions, defaults.extensions);
        let (actual, expected) = (&options.static_file_options, &defaults.static_file_options);
        assert_eq!(actual.request_path, expected.request_path);
        assert_eq!(actual.default_content_type, expected.default_content_type);
        assert_eq!(actual.serve_unknown_file_types, expected.serve_unknown_file_types);
        assert_eq!(actual.cache_policy, CachePolicy::default());
        assert!(actual.on_prepare_response.is_none());
    }

    #[tokio::test]
    async fn test_extensions_are_normalized() {
        let transformer = Arc::new(RecordingTransformer::default());
        let middleware = JsxFileMiddleware::builder()
            .next(next_404(&Arc::new(AtomicUsize::new(0))))
            .options(JsxFileOptions {
                extensions: vec!["JSX".to_string()],
                static_file_options: StaticFileOptions {
                    file_system: Arc::new(base_fs()),
                    ..StaticFileOptions::default()
                },
            })
            .environment(counting_factory(Arc::clone(&transformer), Arc::default()))
            .build()
            .unwrap();

        middleware
            .invoke(RequestContext::new(Method::GET, "/app.jsx"))
            .await
            .unwrap();
        assert_eq!(transformer.calls().len(), 1);
    }
}
