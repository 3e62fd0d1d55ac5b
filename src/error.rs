//! Error types
//!
//! Every failure surfaces to the host pipeline unchanged; the only local
//! handling is the static-file fall-through on `NotFound` and `Forbidden`.

use std::io;
use thiserror::Error;

/// Crate-level error returned by the middleware and the static-file server
#[derive(Debug, Error)]
pub enum Error {
    /// The middleware was built without a `next` continuation
    #[error("middleware requires a `next` continuation")]
    MissingNext,

    /// The middleware was built without an environment factory
    #[error("middleware requires an environment factory")]
    MissingEnvironment,

    /// Request path is not valid percent-encoded UTF-8, or contains NUL
    #[error("invalid request path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    FileSystem(#[from] FsError),

    #[error("failed to build response: {0}")]
    Http(#[from] hyper::http::Error),
}

/// The per-request environment could not be produced
#[derive(Debug, Error)]
#[error("failed to resolve JSX environment: {0}")]
pub struct ResolveError(pub String);

/// File-system capability errors
#[derive(Debug, Error)]
pub enum FsError {
    #[error("file not found: {0}")]
    NotFound(String),

    /// Path resolves outside the file-system root
    #[error("access outside of root denied: {0}")]
    Forbidden(String),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl FsError {
    /// Map an I/O error for `path`, keeping `NotFound` distinguishable
    pub fn from_io(path: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path.to_string())
        } else {
            Self::Io {
                path: path.to_string(),
                source,
            }
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Nothing servable at the path: missing, or outside the root
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Forbidden(_))
    }
}

/// Transpiler failures
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to transform '{path}': {message}")]
    Failed { path: String, message: String },

    #[error("'{path}' is not valid UTF-8")]
    InvalidUtf8 { path: String },

    #[error("transformer I/O error for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}
