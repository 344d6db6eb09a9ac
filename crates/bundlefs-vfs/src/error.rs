//! VFS error types.

use std::io;
use thiserror::Error;

/// Errors raised by the build filesystem surface.
///
/// These are handed straight back to the optimizer, which treats them the
/// way it would treat real I/O errors.
#[derive(Debug, Error)]
pub enum VfsError {
    /// No record is stored under this path.
    #[error("not found: {0}")]
    NotFound(String),

    /// Expected a file, found a directory record.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Invalid path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Text encoding the store cannot decode or encode.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Invalid include/exclude pattern.
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The surface was used after its batch left the optimize phase.
    #[error("filesystem detached from its batch")]
    Detached,

    /// I/O error from the real filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl VfsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Create an UnsupportedEncoding error.
    pub fn unsupported_encoding(name: impl Into<String>) -> Self {
        Self::UnsupportedEncoding(name.into())
    }

    /// Wrap a regex compile failure.
    pub fn pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Returns true for the missing-file condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound(_))
    }
}

/// Convert VfsError to std::io::Error for compatibility.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::IsADirectory(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            VfsError::InvalidPath(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            VfsError::UnsupportedEncoding(msg) => {
                io::Error::new(io::ErrorKind::InvalidInput, msg)
            }
            e @ VfsError::Pattern { .. } => io::Error::new(io::ErrorKind::InvalidInput, e),
            VfsError::Detached => io::Error::new(io::ErrorKind::NotConnected, "filesystem detached"),
            VfsError::Io(e) => e,
        }
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_kinds() {
        let e: io::Error = VfsError::not_found("/proj/a.js").into();
        assert_eq!(e.kind(), io::ErrorKind::NotFound);

        let e: io::Error = VfsError::is_a_directory("/proj/lib").into();
        assert_eq!(e.kind(), io::ErrorKind::IsADirectory);

        let e: io::Error = VfsError::Detached.into();
        assert_eq!(e.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            VfsError::not_found("/proj/a.js").to_string(),
            "not found: /proj/a.js"
        );
        assert!(VfsError::not_found("x").is_not_found());
        assert!(!VfsError::Detached.is_not_found());
    }
}
