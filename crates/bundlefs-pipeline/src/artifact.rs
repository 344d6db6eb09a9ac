//! Artifacts as they travel through the streaming pipeline.

use bundlefs_vfs::path::relative_to;
use bundlefs_vfs::{FileStat, PathStyle, VirtualFile};

/// One file flowing through the pipeline.
///
/// Upstream delivers these; the adapter emits the same shape downstream.
/// `relative_path` is relative to the batch root. A file that ends up
/// outside the root is emitted with its full canonical path instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub relative_path: String,
    /// `None` for directories.
    pub contents: Option<Vec<u8>>,
    pub stat: FileStat,
}

impl Artifact {
    /// A regular file with a fresh stat.
    pub fn new(relative_path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        let contents = contents.into();
        Self {
            relative_path: relative_path.into(),
            stat: FileStat::file(contents.len() as u64),
            contents: Some(contents),
        }
    }

    /// A directory entry.
    pub fn directory(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            contents: None,
            stat: FileStat::directory(),
        }
    }

    pub fn with_stat(mut self, stat: FileStat) -> Self {
        self.stat = stat;
        self
    }

    pub fn is_dir(&self) -> bool {
        self.stat.is_dir()
    }

    /// Resolve against `root` into a store record.
    pub fn into_virtual(self, style: PathStyle, root: &str) -> VirtualFile {
        VirtualFile {
            path: style.resolve(root, &self.relative_path),
            contents: self.contents,
            stat: self.stat,
        }
    }

    /// Turn a flushed store record back into an artifact.
    pub fn from_virtual(root: &str, file: VirtualFile) -> Self {
        Self {
            relative_path: relative_to(root, &file.path).to_string(),
            contents: file.contents,
            stat: file.stat,
        }
    }
}
