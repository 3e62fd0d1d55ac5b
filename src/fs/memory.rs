//! In-memory file system

use super::{file_name, FileContent, FileInfo, FileSystem};
use crate::error::FsError;
use crate::BoxFuture;
use hyper::body::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::time::SystemTime;

/// Fixed set of files held in memory, keyed by normalized subpath
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<String, (Bytes, Option<SystemTime>)>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style
    #[must_use]
    pub fn with_file(mut self, subpath: &str, data: impl Into<Bytes>) -> Self {
        self.insert(subpath, data);
        self
    }

    pub fn insert(&mut self, subpath: &str, data: impl Into<Bytes>) {
        self.files
            .insert(normalize(subpath), (data.into(), Some(SystemTime::now())));
    }
}

fn normalize(subpath: &str) -> String {
    subpath.trim_matches('/').to_string()
}

impl FileSystem for MemoryFileSystem {
    fn read_file<'a>(&'a self, subpath: &'a str) -> BoxFuture<'a, Result<FileContent, FsError>> {
        Box::pin(async move {
            let (data, modified) = self
                .files
                .get(&normalize(subpath))
                .ok_or_else(|| FsError::NotFound(subpath.to_string()))?;
            Ok(FileContent {
                info: FileInfo::file(file_name(subpath), data.len(), *modified),
                data: data.clone(),
            })
        })
    }

    fn read_dir<'a>(&'a self, subpath: &'a str) -> BoxFuture<'a, Result<Vec<FileInfo>, FsError>> {
        Box::pin(async move {
            let dir = normalize(subpath);
            let prefix = if dir.is_empty() {
                String::new()
            } else {
                format!("{dir}/")
            };

            let mut files = Vec::new();
            let mut dirs = BTreeSet::new();
            for (key, (data, modified)) in &self.files {
                let Some(rest) = key.strip_prefix(&prefix) else {
                    continue;
                };
                match rest.split_once('/') {
                    Some((child_dir, _)) => {
                        dirs.insert(child_dir.to_string());
                    }
                    None => files.push(FileInfo::file(rest, data.len(), *modified)),
                }
            }

            if files.is_empty() && dirs.is_empty() {
                return Err(FsError::NotFound(subpath.to_string()));
            }

            let mut entries: Vec<FileInfo> = dirs
                .into_iter()
                .map(|name| FileInfo {
                    name,
                    length: 0,
                    last_modified: None,
                    is_directory: true,
                })
                .chain(files)
                .collect();
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(entries)
        })
    }
}
