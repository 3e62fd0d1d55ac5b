//! Per-request JSX environment
//!
//! Each request resolves a fresh environment from a factory and releases it
//! when the request ends, whichever way it ends.

use crate::error::ResolveError;
use crate::jsx::JsxTransformer;
use crate::logger;
use std::sync::Arc;

/// Services scoped to a single request
pub trait JsxEnvironment: Send + Sync {
    fn transformer(&self) -> Arc<dyn JsxTransformer>;

    /// Release per-request resources. Called exactly once per request.
    fn release(&self) {}
}

/// Produces a fresh environment for each request
pub type EnvironmentFactory =
    Arc<dyn Fn() -> Result<Box<dyn JsxEnvironment>, ResolveError> + Send + Sync>;

/// Wrap a closure as an [`EnvironmentFactory`]
pub fn environment_factory<F>(factory: F) -> EnvironmentFactory
where
    F: Fn() -> Result<Box<dyn JsxEnvironment>, ResolveError> + Send + Sync + 'static,
{
    Arc::new(factory)
}

/// Environment that only carries a transformer and has nothing to release
pub struct TransformerEnvironment {
    transformer: Arc<dyn JsxTransformer>,
}

impl TransformerEnvironment {
    pub fn new(transformer: Arc<dyn JsxTransformer>) -> Self {
        Self { transformer }
    }
}

impl JsxEnvironment for TransformerEnvironment {
    fn transformer(&self) -> Arc<dyn JsxTransformer> {
        Arc::clone(&self.transformer)
    }
}

/// Holds a resolved environment and releases it on drop
///
/// Drop runs on normal return, on `?` propagation and when the request
/// future is cancelled, so release cannot be skipped.
pub struct EnvironmentGuard {
    environment: Box<dyn JsxEnvironment>,
}

impl EnvironmentGuard {
    /// Resolve one environment from `factory`
    pub fn resolve(factory: &EnvironmentFactory) -> Result<Self, ResolveError> {
        let environment = factory().map_err(|e| {
            logger::log_error(&e.to_string());
            e
        })?;
        Ok(Self { environment })
    }

    pub fn transformer(&self) -> Arc<dyn JsxTransformer> {
        self.environment.transformer()
    }
}

impl Drop for EnvironmentGuard {
    fn drop(&mut self) {
        self.environment.release();
    }
}
