//! Disk-backed file system rooted at a directory

use super::{file_name, FileContent, FileInfo, FileSystem};
use crate::error::FsError;
use crate::logger;
use crate::BoxFuture;
use hyper::body::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serves files below `root`; paths escaping the root are rejected
#[derive(Debug, Clone)]
pub struct PhysicalFileSystem {
    root: PathBuf,
}

impl PhysicalFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a subpath to a canonical path inside the root
    async fn resolve(&self, subpath: &str) -> Result<PathBuf, FsError> {
        let relative = subpath.trim_start_matches('/');

        let root = fs::canonicalize(&self.root).await.map_err(|e| {
            logger::log_warning(&format!(
                "Static root not found or inaccessible '{}': {e}",
                self.root.display()
            ));
            FsError::from_io(subpath, e)
        })?;

        // Missing files are common (404), not worth a log line
        let candidate = fs::canonicalize(root.join(relative))
            .await
            .map_err(|e| FsError::from_io(subpath, e))?;

        if !candidate.starts_with(&root) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {subpath} -> {}",
                candidate.display()
            ));
            return Err(FsError::Forbidden(subpath.to_string()));
        }

        Ok(candidate)
    }
}

impl FileSystem for PhysicalFileSystem {
    fn read_file<'a>(&'a self, subpath: &'a str) -> BoxFuture<'a, Result<FileContent, FsError>> {
        Box::pin(async move {
            let path = self.resolve(subpath).await?;
            let metadata = fs::metadata(&path)
                .await
                .map_err(|e| FsError::from_io(subpath, e))?;
            if metadata.is_dir() {
                return Err(FsError::NotFound(subpath.to_string()));
            }

            let data = fs::read(&path).await.map_err(|e| {
                logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
                FsError::from_io(subpath, e)
            })?;

            Ok(FileContent {
                info: FileInfo::file(file_name(subpath), data.len(), metadata.modified().ok()),
                data: Bytes::from(data),
            })
        })
    }

    fn read_dir<'a>(&'a self, subpath: &'a str) -> BoxFuture<'a, Result<Vec<FileInfo>, FsError>> {
        Box::pin(async move {
            let path = self.resolve(subpath).await?;
            let mut dir = fs::read_dir(&path)
                .await
                .map_err(|e| FsError::from_io(subpath, e))?;

            let mut entries = Vec::new();
            while let Some(entry) = dir
                .next_entry()
                .await
                .map_err(|e| FsError::from_io(subpath, e))?
            {
                let metadata = entry
                    .metadata()
                    .await
                    .map_err(|e| FsError::from_io(subpath, e))?;
                entries.push(FileInfo {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    length: usize::try_from(metadata.len()).unwrap_or(usize::MAX),
                    last_modified: metadata.modified().ok(),
                    is_directory: metadata.is_dir(),
                });
            }
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(entries)
        })
    }
}
