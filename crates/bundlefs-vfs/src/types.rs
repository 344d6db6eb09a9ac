//! Core VFS types.
//!
//! A [`VirtualFile`] is one in-flight build artifact: its canonical path,
//! its bytes, and the minimal stat the optimizer inspects.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::SystemTime;

use crate::error::{VfsError, VfsResult};

/// File type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory marker.
    Directory,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// File metadata carried alongside an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    /// File type.
    pub kind: FileType,
    /// Size in bytes.
    pub size: u64,
    /// Unix permissions (e.g., 0o644).
    pub mode: u32,
    /// Last modification time; drives "copy only if newer".
    pub mtime: SystemTime,
}

impl FileStat {
    /// Stat for a new file.
    pub fn file(size: u64) -> Self {
        Self {
            kind: FileType::File,
            size,
            mode: 0o644,
            mtime: SystemTime::now(),
        }
    }

    /// Stat for a directory marker.
    pub fn directory() -> Self {
        Self {
            kind: FileType::Directory,
            size: 0,
            mode: 0o755,
            mtime: SystemTime::now(),
        }
    }

    /// Set the modification time.
    pub fn with_mtime(mut self, mtime: SystemTime) -> Self {
        self.mtime = mtime;
        self
    }

    /// Set permissions.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

impl From<&std::fs::Metadata> for FileStat {
    fn from(meta: &std::fs::Metadata) -> Self {
        let kind = if meta.is_dir() {
            FileType::Directory
        } else {
            FileType::File
        };

        #[cfg(unix)]
        let mode = {
            use std::os::unix::fs::PermissionsExt;
            meta.permissions().mode() & 0o7777
        };
        #[cfg(not(unix))]
        let mode = if meta.is_dir() { 0o755 } else { 0o644 };

        Self {
            kind,
            size: meta.len(),
            mode,
            mtime: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }
}

/// One artifact held by the store.
///
/// `Clone` is a deep copy: the clone shares no buffer with the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    /// Canonical path; equal to the record's store key.
    pub path: String,
    /// File bytes. `None` for directory markers and metadata-only clones.
    pub contents: Option<Vec<u8>>,
    pub stat: FileStat,
}

impl VirtualFile {
    /// A regular file with the given contents and a fresh stat.
    pub fn new(path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        let contents = contents.into();
        Self {
            path: path.into(),
            stat: FileStat::file(contents.len() as u64),
            contents: Some(contents),
        }
    }

    /// A directory marker.
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: None,
            stat: FileStat::directory(),
        }
    }

    /// Replace the stat.
    pub fn with_stat(mut self, stat: FileStat) -> Self {
        self.stat = stat;
        self
    }

    /// Copy of the stat only; contents and path are left empty.
    pub fn clone_metadata(&self) -> Self {
        Self {
            path: String::new(),
            contents: None,
            stat: self.stat.clone(),
        }
    }

    /// Replace the contents, keeping `stat.size` in step.
    pub fn set_contents(&mut self, contents: Vec<u8>) {
        self.stat.size = contents.len() as u64;
        self.contents = Some(contents);
    }

    /// Contents as bytes; empty for directory markers.
    pub fn bytes(&self) -> &[u8] {
        self.contents.as_deref().unwrap_or_default()
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.stat.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.stat.is_dir()
    }
}

/// Text encodings accepted by `read_file` / `save_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
}

impl FromStr for Encoding {
    type Err = VfsError;

    /// Accepts `utf8`, `utf-8` (any case), and the empty string.
    fn from_str(s: &str) -> VfsResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "" | "utf8" | "utf-8" => Ok(Encoding::Utf8),
            _ => Err(VfsError::unsupported_encoding(s)),
        }
    }
}

const BOM: char = '\u{FEFF}';

impl Encoding {
    /// Decode stored bytes to text, dropping a leading byte-order mark.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => {
                let text = String::from_utf8_lossy(bytes);
                match text.strip_prefix(BOM) {
                    Some(rest) => rest.to_string(),
                    None => text.into_owned(),
                }
            }
        }
    }

    /// Encode text for storage.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Utf8 => text.as_bytes().to_vec(),
        }
    }
}

/// Where a write lands.
///
/// The optimizer stages output under a scratch name (`out.js-temp`) and
/// means the logical file (`out.js`). The store only ever keeps the logical
/// path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTarget {
    /// Key the contents are stored under.
    pub logical: String,
    /// Scratch name the writer used, if it differs from `logical`.
    pub staging: Option<String>,
}

impl WriteTarget {
    /// Write straight to `path`.
    pub fn logical(path: impl Into<String>) -> Self {
        Self {
            logical: path.into(),
            staging: None,
        }
    }

    /// Derive the logical path by stripping `suffix` from a staging name.
    ///
    /// A path without the suffix is its own logical target.
    pub fn from_staging(path: &str, suffix: &str) -> Self {
        match path.strip_suffix(suffix) {
            Some(logical) if !suffix.is_empty() && !logical.is_empty() => Self {
                logical: logical.to_string(),
                staging: Some(path.to_string()),
            },
            _ => Self::logical(path),
        }
    }
}
