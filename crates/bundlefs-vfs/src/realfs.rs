//! Real-disk collaborator.
//!
//! The only thing the build filesystem ever does to the host disk is create
//! directories the optimizer asks for, and resolve real paths.

use std::fmt::Debug;
use std::io;
use std::path::Path;

/// Creates directories on the host filesystem.
pub trait DirCreator: Debug + Send + Sync {
    /// Create a single directory. An existing directory is not an error.
    fn create_dir(&self, path: &Path) -> io::Result<()>;
}

/// [`DirCreator`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDirs;

impl DirCreator for LocalDirs {
    fn create_dir(&self, path: &Path) -> io::Result<()> {
        let mut builder = std::fs::DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o777);
        }
        match builder.create(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Canonical real path, without Windows `\\?\` verbatim prefixes.
pub fn real_path(path: &Path) -> io::Result<std::path::PathBuf> {
    dunce::canonicalize(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dir_tolerates_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");
        LocalDirs.create_dir(&dir).unwrap();
        assert!(dir.is_dir());
        LocalDirs.create_dir(&dir).unwrap();
    }

    #[test]
    fn test_create_dir_over_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("taken");
        std::fs::write(&file, b"x").unwrap();
        assert!(LocalDirs.create_dir(&file).is_err());
    }

    #[test]
    fn test_create_dir_missing_parent_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(LocalDirs.create_dir(&tmp.path().join("a/b")).is_err());
    }

    #[test]
    fn test_real_path() {
        let tmp = tempfile::tempdir().unwrap();
        let resolved = real_path(&tmp.path().join(".")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.is_dir());
    }
}
