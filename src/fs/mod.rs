//! File-system capability module
//!
//! A small read-only abstraction over where static files come from.
//! Subpaths are always `/`-separated and relative to the file-system root,
//! with or without a leading slash.

mod memory;
mod physical;

pub use memory::MemoryFileSystem;
pub use physical::PhysicalFileSystem;

use crate::error::FsError;
use crate::BoxFuture;
use hyper::body::Bytes;
use std::time::SystemTime;

/// Metadata of a file or directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// File name (last path segment)
    pub name: String,
    /// Content length in bytes
    pub length: usize,
    pub last_modified: Option<SystemTime>,
    pub is_directory: bool,
}

impl FileInfo {
    pub fn file(name: impl Into<String>, length: usize, last_modified: Option<SystemTime>) -> Self {
        Self {
            name: name.into(),
            length,
            last_modified,
            is_directory: false,
        }
    }
}

/// File content together with its metadata
#[derive(Debug, Clone)]
pub struct FileContent {
    pub info: FileInfo,
    pub data: Bytes,
}

/// Read capability over a tree of files
pub trait FileSystem: Send + Sync {
    /// Read a file's content and metadata
    fn read_file<'a>(&'a self, subpath: &'a str) -> BoxFuture<'a, Result<FileContent, FsError>>;

    /// List the entries of a directory
    fn read_dir<'a>(&'a self, subpath: &'a str) -> BoxFuture<'a, Result<Vec<FileInfo>, FsError>>;
}

/// Extension of the last path segment including the leading dot, e.g. `.jsx`
pub fn extension_of(subpath: &str) -> Option<&str> {
    let name = file_name(subpath);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx..]),
    }
}

/// Last `/`-separated segment of a subpath
pub fn file_name(subpath: &str) -> &str {
    subpath.rsplit('/').next().unwrap_or(subpath)
}
