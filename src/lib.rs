//! jsxserve
//!
//! Static file serving with on-the-fly JSX transpilation. Requests for files
//! with a configured extension (`.jsx` by default) are read from the base
//! file system, run through a [`jsx::JsxTransformer`] and served as
//! JavaScript; everything else is served untouched.
//!
//! ```no_run
//! use std::sync::Arc;
//! use jsxserve::environment::{environment_factory, JsxEnvironment, TransformerEnvironment};
//! use jsxserve::handler::{JsxFileMiddleware, JsxFileOptions, RequestContext};
//! use jsxserve::jsx::CommandTransformer;
//! use jsxserve::server::fallback_next;
//!
//! # async fn demo() -> Result<(), jsxserve::Error> {
//! let middleware = JsxFileMiddleware::builder()
//!     .next(fallback_next())
//!     .options(JsxFileOptions::default())
//!     .environment(environment_factory(|| {
//!         let transformer = CommandTransformer::new("esbuild", vec!["--loader=jsx".into()]);
//!         Ok(Box::new(TransformerEnvironment::new(Arc::new(transformer))) as Box<dyn JsxEnvironment>)
//!     }))
//!     .build()?;
//!
//! let response = middleware
//!     .invoke(RequestContext::new(hyper::Method::GET, "/app.jsx"))
//!     .await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod environment;
pub mod error;
pub mod fs;
pub mod handler;
pub mod http;
pub mod jsx;
pub mod logger;
pub mod server;

pub use error::Error;

use std::future::Future;
use std::pin::Pin;

/// Boxed, sendable future used by the object-safe traits of this crate
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
