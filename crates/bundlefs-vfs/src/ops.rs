//! The filesystem capability surface handed to the optimizer.
//!
//! This is the optimizer's whole view of "disk" during a batch. Paths are
//! plain strings in the optimizer's own convention; implementations
//! canonicalize them before touching the store.

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use crate::dirs::FileFilter;
use crate::error::VfsResult;
use crate::path;
use crate::types::{Encoding, WriteTarget};

/// Default `copy_dir` filter: any path with a word character.
static ANY_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w").expect("static regex"));

/// Filesystem operations available to an optimizer.
///
/// Operations that need an existing record fail with
/// [`VfsError::NotFound`](crate::VfsError::NotFound); callers are expected to
/// check [`exists`](BuildFs::exists) first, as they would against a real
/// disk.
#[async_trait]
pub trait BuildFs: Send + Sync {
    // ========================================================================
    // Paths
    // ========================================================================

    /// Canonical store-key form of `path`.
    fn normalize(&self, path: &str) -> String;

    /// Real absolute path of something on the host disk, normalized.
    fn abs_path(&self, path: &str) -> VfsResult<String>;

    // ========================================================================
    // Queries
    // ========================================================================

    /// True for the batch root and for any stored path.
    fn exists(&self, path: &str) -> bool;

    /// True if `path` is stored as a regular file.
    fn is_file(&self, path: &str) -> bool;

    /// True for directory markers. In path-prefix mode, also for any path
    /// with stored descendants.
    fn is_dir(&self, path: &str) -> bool;

    /// Stored files under `start_dir` accepted by `filter`, in store order.
    ///
    /// Paths matching the configured exclusion pattern are skipped.
    fn get_filtered_file_list(&self, start_dir: &str, filter: &FileFilter) -> VfsResult<Vec<String>>;

    // ========================================================================
    // Reading
    // ========================================================================

    /// Read a stored file as text. A leading byte-order mark is dropped.
    fn read_file(&self, path: &str, encoding: Encoding) -> VfsResult<String>;

    // ========================================================================
    // Writing
    // ========================================================================

    /// Store `contents` at `target.logical`.
    ///
    /// An existing record keeps its stat; otherwise a fresh file stat is
    /// made. Any record under the staging name is dropped.
    fn write_target(&self, target: &WriteTarget, contents: &[u8]) -> VfsResult<()>;

    /// Save text. A trailing temp suffix (`-temp` by default) is stripped,
    /// so `out.js-temp` lands on `out.js`.
    fn save_file(&self, path: &str, contents: &str, encoding: Encoding) -> VfsResult<()>;

    /// Clone `src` to `dest`. Returns whether a copy happened.
    ///
    /// With `only_if_newer`, an existing `dest` whose mtime is not older
    /// than `src` is left alone.
    fn copy_file(&self, src: &str, dest: &str, only_if_newer: bool) -> VfsResult<bool>;

    /// Move a record (and, for directories, everything inside it).
    fn rename_file(&self, from: &str, to: &str) -> VfsResult<bool>;

    /// Delete a file, or a directory and everything inside it.
    ///
    /// Deleting a missing path does nothing.
    fn delete_file(&self, path: &str) -> VfsResult<()>;

    /// Drop directory markers under `start_dir` that have nothing inside.
    fn delete_empty_dirs(&self, start_dir: &str) -> VfsResult<()>;

    /// Create one real directory, unless the store already has the path or
    /// it is a bare drive root.
    fn mk_dir(&self, path: &str) -> VfsResult<()>;

    // ========================================================================
    // Convenience methods (default implementations)
    // ========================================================================

    /// Separator used in every path this surface returns.
    fn line_separator(&self) -> &'static str {
        "/"
    }

    /// `path` with its last `/` segment removed.
    fn parent(&self, path: &str) -> String {
        path::parent(path)
    }

    /// Read a stored file without blocking the caller.
    ///
    /// Completes on a later poll; errors arrive through the returned value
    /// only.
    async fn read_file_async(&self, path: &str, encoding: Encoding) -> VfsResult<String> {
        tokio::task::yield_now().await;
        self.read_file(path, encoding)
    }

    /// Save UTF-8 text.
    fn save_utf8_file(&self, path: &str, contents: &str) -> VfsResult<()> {
        self.save_file(path, contents, Encoding::Utf8)
    }

    /// Copy every listed file under `src_dir` to the same relative place
    /// under `dest_dir`. Returns the destination paths actually written.
    fn copy_dir(
        &self,
        src_dir: &str,
        dest_dir: &str,
        filter: Option<&FileFilter>,
        only_if_newer: bool,
    ) -> VfsResult<Vec<String>> {
        let src_dir = self.normalize(src_dir);
        let dest_dir = self.normalize(dest_dir);
        let default_filter;
        let filter = match filter {
            Some(f) => f,
            None => {
                default_filter = FileFilter::include(ANY_WORD.clone());
                &default_filter
            }
        };

        let mut copied = Vec::new();
        for src in self.get_filtered_file_list(&src_dir, filter)? {
            let dest = match src.strip_prefix(src_dir.as_str()) {
                Some(rest) => {
                    let rest = rest.trim_start_matches(['/', '\\']);
                    self.normalize(&format!("{dest_dir}/{rest}"))
                }
                // Substring containment can match mid-path.
                None => src.replacen(src_dir.as_str(), &dest_dir, 1),
            };
            if self.copy_file(&src, &dest, only_if_newer)? {
                copied.push(dest);
            }
        }
        Ok(copied)
    }

    /// Create every directory along `path`, one segment at a time.
    fn mk_full_dir(&self, path: &str) -> VfsResult<()> {
        let mut current = String::new();
        for part in path.split('/') {
            current.push_str(part);
            current.push('/');
            if !part.is_empty() {
                self.mk_dir(&current)?;
            }
        }
        Ok(())
    }
}
