//! File-system adapter that transpiles matching files on read

use super::JsxTransformer;
use crate::error::{FsError, TransformError};
use crate::fs::{extension_of, FileContent, FileInfo, FileSystem};
use crate::logger;
use crate::BoxFuture;
use hyper::body::Bytes;
use std::sync::Arc;

/// Decorates a base file system: reads of files whose extension is in
/// `extensions` return the transformer's output, everything else is
/// delegated untouched
pub struct JsxFileSystem {
    transformer: Arc<dyn JsxTransformer>,
    inner: Arc<dyn FileSystem>,
    extensions: Arc<[String]>,
}

impl JsxFileSystem {
    /// `extensions` are expected normalized (lowercase, leading dot)
    pub fn new(
        transformer: Arc<dyn JsxTransformer>,
        inner: Arc<dyn FileSystem>,
        extensions: Arc<[String]>,
    ) -> Self {
        Self {
            transformer,
            inner,
            extensions,
        }
    }

    /// Whether reads of `subpath` go through the transformer
    pub fn matches(&self, subpath: &str) -> bool {
        extension_of(subpath).is_some_and(|ext| {
            self.extensions
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(ext))
        })
    }

    async fn read_transformed(&self, subpath: &str) -> Result<FileContent, FsError> {
        let raw = self.inner.read_file(subpath).await?;
        let source = std::str::from_utf8(&raw.data).map_err(|_| TransformError::InvalidUtf8 {
            path: subpath.to_string(),
        })?;

        let output = self.transformer.transform(subpath, source).await?;
        logger::log_debug(&format!(
            "[JSX] Transformed {subpath} ({} -> {} bytes)",
            raw.info.length,
            output.len()
        ));

        Ok(FileContent {
            info: FileInfo {
                length: output.len(),
                ..raw.info
            },
            data: Bytes::from(output),
        })
    }
}

impl FileSystem for JsxFileSystem {
    fn read_file<'a>(&'a self, subpath: &'a str) -> BoxFuture<'a, Result<FileContent, FsError>> {
        if self.matches(subpath) {
            Box::pin(self.read_transformed(subpath))
        } else {
            self.inner.read_file(subpath)
        }
    }

    fn read_dir<'a>(&'a self, subpath: &'a str) -> BoxFuture<'a, Result<Vec<FileInfo>, FsError>> {
        self.inner.read_dir(subpath)
    }
}
