//! In-memory build filesystem.
//!
//! [`MemoryFs`] implements [`BuildFs`] over a [`VirtualFileStore`]. It is
//! built around one batch's store and hands that store back through
//! [`MemoryFs::detach`] when the optimize phase ends; after that every
//! operation fails with [`VfsError::Detached`].

use async_trait::async_trait;
use parking_lot::RwLock;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::dirs::{FileFilter, PrefixMode};
use crate::error::{VfsError, VfsResult};
use crate::ops::BuildFs;
use crate::path::PathStyle;
use crate::realfs::{self, DirCreator, LocalDirs};
use crate::store::VirtualFileStore;
use crate::types::{Encoding, VirtualFile, WriteTarget};

/// Default exclusion: any path component starting with `.`.
pub const DEFAULT_EXCLUSION: &str = r"(^|/)\.";

/// Default staging suffix stripped by `save_file`.
pub const DEFAULT_TEMP_SUFFIX: &str = "-temp";

/// Behavior knobs for a [`MemoryFs`].
#[derive(Debug, Clone)]
pub struct FsOptions {
    /// The batch root; always reported as existing.
    pub base_url: String,
    pub style: PathStyle,
    pub prefix_mode: PrefixMode,
    /// Paths (relative to the listing root) hidden from listings.
    pub exclusion: Option<Regex>,
    pub temp_suffix: String,
}

impl FsOptions {
    /// Defaults for a batch rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            style: PathStyle::native(),
            prefix_mode: PrefixMode::default(),
            exclusion: Some(Regex::new(DEFAULT_EXCLUSION).expect("static regex")),
            temp_suffix: DEFAULT_TEMP_SUFFIX.to_string(),
        }
    }

    pub fn with_style(mut self, style: PathStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_prefix_mode(mut self, mode: PrefixMode) -> Self {
        self.prefix_mode = mode;
        self
    }

    /// Replace the listing exclusion; `None` lists dot-files too.
    pub fn with_exclusion(mut self, exclusion: Option<Regex>) -> Self {
        self.exclusion = exclusion;
        self
    }

    pub fn with_temp_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.temp_suffix = suffix.into();
        self
    }

    /// Canonical form of the batch root.
    pub fn root(&self) -> String {
        self.style.normalize(&self.base_url)
    }
}

/// The build filesystem over one batch's store.
///
/// Thread-safe via an internal `RwLock`, so it can be shared with an async
/// optimizer as `Arc<dyn BuildFs>`.
#[derive(Debug)]
pub struct MemoryFs {
    store: RwLock<Option<VirtualFileStore>>,
    options: FsOptions,
    root: String,
    dirs: Arc<dyn DirCreator>,
}

impl MemoryFs {
    /// Wrap `store`, creating real directories through `std::fs`.
    pub fn new(store: VirtualFileStore, options: FsOptions) -> Self {
        Self::with_dir_creator(store, options, Arc::new(LocalDirs))
    }

    /// Wrap `store` with a custom real-disk collaborator.
    pub fn with_dir_creator(
        store: VirtualFileStore,
        options: FsOptions,
        dirs: Arc<dyn DirCreator>,
    ) -> Self {
        let root = options.root();
        Self {
            store: RwLock::new(Some(store)),
            options,
            root,
            dirs,
        }
    }

    pub fn options(&self) -> &FsOptions {
        &self.options
    }

    /// Take the store back. Later calls through any handle fail with
    /// [`VfsError::Detached`]. Returns `None` if already detached.
    pub fn detach(&self) -> Option<VirtualFileStore> {
        self.store.write().take()
    }

    pub fn is_detached(&self) -> bool {
        self.store.read().is_none()
    }

    fn read<T>(&self, f: impl FnOnce(&VirtualFileStore) -> VfsResult<T>) -> VfsResult<T> {
        let guard = self.store.read();
        let store = guard.as_ref().ok_or(VfsError::Detached)?;
        f(store)
    }

    fn write<T>(&self, f: impl FnOnce(&mut VirtualFileStore) -> VfsResult<T>) -> VfsResult<T> {
        let mut guard = self.store.write();
        let store = guard.as_mut().ok_or(VfsError::Detached)?;
        f(store)
    }

    /// Boolean query that reads `false` once detached.
    fn query(&self, path: &str, f: impl FnOnce(&VirtualFileStore, &str) -> bool) -> bool {
        let key = self.normalize(path);
        match self.read(|store| Ok(f(store, &key))) {
            Ok(answer) => answer,
            Err(_) => {
                warn!(path = %key, "query on detached build filesystem");
                false
            }
        }
    }
}

#[async_trait]
impl BuildFs for MemoryFs {
    fn normalize(&self, path: &str) -> String {
        self.options.style.normalize(path)
    }

    fn abs_path(&self, path: &str) -> VfsResult<String> {
        let real = realfs::real_path(Path::new(path))?;
        Ok(self.normalize(&real.to_string_lossy()))
    }

    fn exists(&self, path: &str) -> bool {
        self.query(path, |store, key| key == self.root || store.contains(key))
    }

    fn is_file(&self, path: &str) -> bool {
        self.query(path, |store, key| store.is_file(key))
    }

    fn is_dir(&self, path: &str) -> bool {
        let mode = self.options.prefix_mode;
        self.query(path, |store, key| store.is_dir(key, mode))
    }

    fn get_filtered_file_list(&self, start_dir: &str, filter: &FileFilter) -> VfsResult<Vec<String>> {
        let start = self.normalize(start_dir);
        self.read(|store| {
            Ok(store.list_files(
                &start,
                filter,
                self.options.exclusion.as_ref(),
                self.options.prefix_mode,
            ))
        })
    }

    fn read_file(&self, path: &str, encoding: Encoding) -> VfsResult<String> {
        let key = self.normalize(path);
        self.read(|store| match store.get(&key) {
            Some(file) if file.is_dir() => Err(VfsError::is_a_directory(&key)),
            Some(file) => Ok(encoding.decode(file.bytes())),
            None => Err(VfsError::not_found(&key)),
        })
    }

    fn write_target(&self, target: &WriteTarget, contents: &[u8]) -> VfsResult<()> {
        let key = self.normalize(&target.logical);
        let staging = target.staging.as_deref().map(|s| self.normalize(s));

        self.write(|store| {
            let mut file = match store.get(&key) {
                Some(existing) if existing.is_dir() => {
                    return Err(VfsError::is_a_directory(&key));
                }
                Some(existing) => existing.clone_metadata(),
                None => VirtualFile::new(key.clone(), Vec::new()),
            };
            file.set_contents(contents.to_vec());
            store.insert_at(key.clone(), file);

            if let Some(staging) = staging.filter(|s| *s != key) {
                store.remove(&staging);
            }
            debug!(path = %key, bytes = contents.len(), "saved");
            Ok(())
        })
    }

    fn save_file(&self, path: &str, contents: &str, encoding: Encoding) -> VfsResult<()> {
        let target = WriteTarget::from_staging(&self.normalize(path), &self.options.temp_suffix);
        self.write_target(&target, &encoding.encode(contents))
    }

    fn copy_file(&self, src: &str, dest: &str, only_if_newer: bool) -> VfsResult<bool> {
        let src = self.normalize(src);
        let dest = self.normalize(dest);

        self.write(|store| {
            let source = store.get(&src).ok_or_else(|| VfsError::not_found(&src))?;

            if only_if_newer {
                if let Some(existing) = store.get(&dest) {
                    if existing.stat.mtime >= source.stat.mtime {
                        debug!(%src, %dest, "copy skipped, destination not older");
                        return Ok(false);
                    }
                }
            }

            let copy = source.clone();
            store.insert_at(dest.clone(), copy);
            debug!(%src, %dest, "copied");
            Ok(true)
        })
    }

    fn rename_file(&self, from: &str, to: &str) -> VfsResult<bool> {
        let from = self.normalize(from);
        let to = self.normalize(to);
        if from == to {
            return self.read(|store| {
                if store.contains(&from) {
                    Ok(true)
                } else {
                    Err(VfsError::not_found(&from))
                }
            });
        }

        let style = self.options.style;
        self.write(|store| {
            let moving_dir = store.is_dir(&from, PrefixMode::Path);
            if !moving_dir {
                let file = store.remove(&from).ok_or_else(|| VfsError::not_found(&from))?;
                store.insert_at(to.clone(), file);
                debug!(%from, %to, "renamed");
                return Ok(true);
            }

            let moved = store.keys_within(&from);
            for old in &moved {
                if let Some(file) = store.remove(old) {
                    let rest = old
                        .strip_prefix(from.as_str())
                        .unwrap_or(old.as_str())
                        .trim_start_matches(['/', '\\']);
                    let new = if rest.is_empty() {
                        to.clone()
                    } else {
                        style.normalize(&format!("{to}/{rest}"))
                    };
                    store.insert_at(new, file);
                }
            }
            debug!(%from, %to, entries = moved.len(), "renamed directory");
            Ok(true)
        })
    }

    fn delete_file(&self, path: &str) -> VfsResult<()> {
        let key = self.normalize(path);
        let mode = self.options.prefix_mode;

        self.write(|store| {
            if store.is_dir(&key, mode) {
                let removed = store.remove_tree(&key, mode);
                debug!(path = %key, entries = removed.len(), "deleted directory");
            } else if store.remove(&key).is_some() {
                debug!(path = %key, "deleted");
            }
            Ok(())
        })
    }

    fn delete_empty_dirs(&self, start_dir: &str) -> VfsResult<()> {
        let start = self.normalize(start_dir);
        self.write(|store| {
            let removed = store.prune_empty_dirs(&start, &self.root, self.options.prefix_mode);
            debug!(start = %start, removed = removed.len(), "pruned empty directories");
            Ok(())
        })
    }

    fn mk_dir(&self, path: &str) -> VfsResult<()> {
        let key = self.normalize(path);
        if self.exists(&key) || self.options.style.is_drive_root(&key) {
            return Ok(());
        }
        debug!(path = %key, "creating real directory");
        self.dirs.create_dir(Path::new(&key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileStat;
    use parking_lot::Mutex;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn fs_with(files: &[(&str, &str)]) -> MemoryFs {
        let mut store = VirtualFileStore::new();
        for (path, contents) in files {
            store.insert(VirtualFile::new(*path, *contents));
        }
        MemoryFs::new(store, FsOptions::new("/proj").with_style(PathStyle::Posix))
    }

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn set_mtime(fs: &MemoryFs, path: &str, secs: u64) {
        let mut guard = fs.store.write();
        let store = guard.as_mut().unwrap();
        let file = store.get(path).unwrap().clone();
        let stat = FileStat {
            mtime: at(secs),
            ..file.stat.clone()
        };
        store.insert(file.with_stat(stat));
    }

    #[derive(Debug, Default)]
    struct RecordingDirs(Mutex<Vec<PathBuf>>);

    impl DirCreator for RecordingDirs {
        fn create_dir(&self, path: &Path) -> std::io::Result<()> {
            self.0.lock().push(path.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn test_root_always_exists() {
        let fs = fs_with(&[]);
        assert!(fs.exists("/proj"));
        assert!(fs.exists("/proj/"));
        assert!(fs.exists("/proj/lib/.."));
        assert!(!fs.exists("/proj/a.js"));
    }

    #[test]
    fn test_read_round_trip_and_bom() {
        let fs = fs_with(&[("/proj/a.js", "var a;"), ("/proj/bom.js", "\u{FEFF}var b;")]);
        assert_eq!(fs.read_file("/proj/a.js", Encoding::Utf8).unwrap(), "var a;");
        assert_eq!(fs.read_file("/proj/./a.js", Encoding::Utf8).unwrap(), "var a;");
        assert_eq!(fs.read_file("/proj/bom.js", Encoding::Utf8).unwrap(), "var b;");
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let fs = fs_with(&[]);
        let err = fs.read_file("/proj/nope.js", Encoding::Utf8).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_read_directory_marker_fails() {
        let mut store = VirtualFileStore::new();
        store.insert(VirtualFile::directory("/proj/lib"));
        let fs = MemoryFs::new(store, FsOptions::new("/proj").with_style(PathStyle::Posix));
        assert!(matches!(
            fs.read_file("/proj/lib", Encoding::Utf8),
            Err(VfsError::IsADirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_read_file_async() {
        let fs = fs_with(&[("/proj/a.js", "var a;")]);
        assert_eq!(
            fs.read_file_async("/proj/a.js", Encoding::Utf8).await.unwrap(),
            "var a;"
        );
        let err = fs
            .read_file_async("/proj/missing.js", Encoding::Utf8)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_save_file_detemps() {
        let fs = fs_with(&[]);
        fs.save_file("/proj/foo.js-temp", "X", Encoding::Utf8).unwrap();
        assert!(fs.exists("/proj/foo.js"));
        assert!(!fs.exists("/proj/foo.js-temp"));
        assert_eq!(fs.read_file("/proj/foo.js", Encoding::Utf8).unwrap(), "X");
    }

    #[test]
    fn test_save_file_preserves_existing_stat() {
        let fs = fs_with(&[("/proj/foo.js", "old")]);
        set_mtime(&fs, "/proj/foo.js", 42);
        fs.save_utf8_file("/proj/foo.js-temp", "new contents").unwrap();

        let guard = fs.store.read();
        let file = guard.as_ref().unwrap().get("/proj/foo.js").unwrap();
        assert_eq!(file.stat.mtime, at(42));
        assert_eq!(file.stat.size, 12);
        assert_eq!(file.bytes(), b"new contents");
        assert_eq!(file.path, "/proj/foo.js");
    }

    #[test]
    fn test_write_target_drops_staging_record() {
        let fs = fs_with(&[("/proj/out.js.tmp", "partial")]);
        let target = WriteTarget {
            logical: "/proj/out.js".into(),
            staging: Some("/proj/out.js.tmp".into()),
        };
        fs.write_target(&target, b"done").unwrap();
        assert!(!fs.exists("/proj/out.js.tmp"));
        assert_eq!(fs.read_file("/proj/out.js", Encoding::Utf8).unwrap(), "done");
    }

    #[test]
    fn test_save_over_directory_fails() {
        let mut store = VirtualFileStore::new();
        store.insert(VirtualFile::directory("/proj/lib"));
        let fs = MemoryFs::new(store, FsOptions::new("/proj").with_style(PathStyle::Posix));
        assert!(fs.save_utf8_file("/proj/lib", "x").is_err());
    }

    #[test]
    fn test_copy_is_independent() {
        let fs = fs_with(&[("/proj/a.js", "A")]);
        assert!(fs.copy_file("/proj/a.js", "/proj/b.js", false).unwrap());
        fs.save_utf8_file("/proj/b.js", "B").unwrap();
        assert_eq!(fs.read_file("/proj/a.js", Encoding::Utf8).unwrap(), "A");
        assert_eq!(fs.read_file("/proj/b.js", Encoding::Utf8).unwrap(), "B");
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let fs = fs_with(&[]);
        assert!(fs.copy_file("/proj/a.js", "/proj/b.js", false).unwrap_err().is_not_found());
    }

    #[test]
    fn test_copy_only_if_newer() {
        let fs = fs_with(&[("/proj/src.js", "SRC"), ("/proj/dest.js", "DEST")]);
        set_mtime(&fs, "/proj/src.js", 10);
        set_mtime(&fs, "/proj/dest.js", 20);
        assert!(!fs.copy_file("/proj/src.js", "/proj/dest.js", true).unwrap());
        assert_eq!(fs.read_file("/proj/dest.js", Encoding::Utf8).unwrap(), "DEST");

        set_mtime(&fs, "/proj/dest.js", 5);
        assert!(fs.copy_file("/proj/src.js", "/proj/dest.js", true).unwrap());
        assert_eq!(fs.read_file("/proj/dest.js", Encoding::Utf8).unwrap(), "SRC");
    }

    #[test]
    fn test_copy_only_if_newer_equal_mtime_skips() {
        let fs = fs_with(&[("/proj/src.js", "SRC"), ("/proj/dest.js", "DEST")]);
        set_mtime(&fs, "/proj/src.js", 10);
        set_mtime(&fs, "/proj/dest.js", 10);
        assert!(!fs.copy_file("/proj/src.js", "/proj/dest.js", true).unwrap());
    }

    #[test]
    fn test_copy_dir() {
        let fs = fs_with(&[
            ("/proj/a.js", "a"),
            ("/proj/lib/b.js", "b"),
            ("/proj/lib/sub/c.js", "c"),
            ("/proj/lib/.hidden", "h"),
        ]);
        let copied = fs.copy_dir("/proj/lib", "/proj/dist", None, false).unwrap();
        assert_eq!(copied, vec!["/proj/dist/b.js", "/proj/dist/sub/c.js"]);
        assert_eq!(fs.read_file("/proj/dist/sub/c.js", Encoding::Utf8).unwrap(), "c");
        assert!(!fs.exists("/proj/dist/a.js"));
        assert!(!fs.exists("/proj/dist/.hidden"));
    }

    #[test]
    fn test_copy_dir_with_filter_and_nothing_copied() {
        let fs = fs_with(&[("/proj/lib/b.js", "b"), ("/proj/lib/s.css", "s")]);
        let css = FileFilter::include(Regex::new(r"\.css$").unwrap());
        let copied = fs.copy_dir("/proj/lib", "/proj/dist", Some(&css), false).unwrap();
        assert_eq!(copied, vec!["/proj/dist/s.css"]);

        let none = fs.copy_dir("/proj/empty", "/proj/dist", None, false).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_rename_transfers_identity() {
        let fs = fs_with(&[("/proj/a.js", "A")]);
        assert!(fs.rename_file("/proj/a.js", "/proj/b.js").unwrap());
        assert!(!fs.exists("/proj/a.js"));
        assert!(fs.exists("/proj/b.js"));
        assert_eq!(fs.read_file("/proj/b.js", Encoding::Utf8).unwrap(), "A");

        let guard = fs.store.read();
        assert_eq!(guard.as_ref().unwrap().get("/proj/b.js").unwrap().path, "/proj/b.js");
    }

    #[test]
    fn test_rename_missing_fails() {
        let fs = fs_with(&[]);
        assert!(fs.rename_file("/proj/a.js", "/proj/b.js").unwrap_err().is_not_found());
    }

    #[test]
    fn test_rename_directory_moves_children() {
        let fs = fs_with(&[("/proj/lib/b.js", "b"), ("/proj/lib/x/c.js", "c"), ("/proj/libs.js", "l")]);
        assert!(fs.rename_file("/proj/lib", "/proj/vendor").unwrap());
        assert!(fs.exists("/proj/vendor/b.js"));
        assert!(fs.exists("/proj/vendor/x/c.js"));
        assert!(fs.exists("/proj/libs.js"));
        assert!(!fs.is_dir("/proj/lib"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let fs = fs_with(&[("/proj/a.js", "A"), ("/proj/b.js", "B")]);
        fs.delete_file("/proj/a.js").unwrap();
        fs.delete_file("/proj/a.js").unwrap();
        fs.delete_file("/proj/never.js").unwrap();
        assert!(!fs.exists("/proj/a.js"));
        assert!(fs.exists("/proj/b.js"));
    }

    #[test]
    fn test_delete_directory_path_mode() {
        let fs = fs_with(&[("/proj/a/x.js", "x"), ("/proj/ab/c.js", "c")]);
        fs.delete_file("/proj/a").unwrap();
        assert!(!fs.exists("/proj/a/x.js"));
        assert!(fs.exists("/proj/ab/c.js"));
    }

    #[test]
    fn test_delete_directory_substring_mode() {
        let mut store = VirtualFileStore::new();
        store.insert(VirtualFile::directory("/proj/a"));
        store.insert(VirtualFile::new("/proj/a/x.js", "x"));
        store.insert(VirtualFile::new("/proj/ab/c.js", "c"));
        let fs = MemoryFs::new(
            store,
            FsOptions::new("/proj")
                .with_style(PathStyle::Posix)
                .with_prefix_mode(PrefixMode::Substring),
        );
        fs.delete_file("/proj/a").unwrap();
        assert!(!fs.exists("/proj/ab/c.js"));
    }

    #[test]
    fn test_delete_absent_substring_mode_is_noop() {
        let mut store = VirtualFileStore::new();
        store.insert(VirtualFile::new("/proj/ab/c.js", "c"));
        store.insert(VirtualFile::new("/proj/a.js.map", "{}"));
        let fs = MemoryFs::new(
            store,
            FsOptions::new("/proj")
                .with_style(PathStyle::Posix)
                .with_prefix_mode(PrefixMode::Substring),
        );
        assert!(!fs.is_dir("/proj/a.js"));

        fs.delete_file("/proj/a").unwrap();
        fs.delete_file("/proj/a.js").unwrap();
        assert!(fs.exists("/proj/ab/c.js"));
        assert!(fs.exists("/proj/a.js.map"));
    }

    #[test]
    fn test_listing_filter() {
        let fs = fs_with(&[("/proj/x.js", ""), ("/proj/x.min.js", ""), ("/proj/y.css", "")]);
        let filter = FileFilter::new(r"\.js$", Some(r"\.min\.js$")).unwrap();
        assert_eq!(fs.get_filtered_file_list("/proj", &filter).unwrap(), vec!["/proj/x.js"]);
    }

    #[test]
    fn test_parent_and_separator() {
        let fs = fs_with(&[]);
        assert_eq!(fs.parent("/proj/lib/b.js"), "/proj/lib");
        assert_eq!(fs.line_separator(), "/");
    }

    #[test]
    fn test_mk_full_dir_skips_stored_paths() {
        let dirs = Arc::new(RecordingDirs::default());
        let mut store = VirtualFileStore::new();
        store.insert(VirtualFile::directory("/out"));
        let fs = MemoryFs::with_dir_creator(
            store,
            FsOptions::new("/proj").with_style(PathStyle::Posix),
            dirs.clone(),
        );
        fs.mk_full_dir("/out/js/lib").unwrap();
        let created = dirs.0.lock().clone();
        assert_eq!(created, vec![PathBuf::from("/out/js"), PathBuf::from("/out/js/lib")]);
    }

    #[test]
    fn test_mk_dir_skips_drive_root() {
        let dirs = Arc::new(RecordingDirs::default());
        let fs = MemoryFs::with_dir_creator(
            VirtualFileStore::new(),
            FsOptions::new("C:\\proj").with_style(PathStyle::Windows),
            dirs.clone(),
        );
        fs.mk_full_dir("C:/build/out").unwrap();
        let created = dirs.0.lock().clone();
        assert_eq!(
            created,
            vec![PathBuf::from("C:\\build"), PathBuf::from("C:\\build\\out")]
        );
    }

    #[test]
    fn test_mk_dir_real_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let fs = fs_with(&[]);
        let target = tmp.path().join("a/b");
        fs.mk_full_dir(&target.to_string_lossy()).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_abs_path() {
        let tmp = tempfile::tempdir().unwrap();
        let fs = fs_with(&[]);
        let abs = fs.abs_path(&tmp.path().join(".").to_string_lossy()).unwrap();
        assert!(abs.starts_with('/'));
        assert!(!abs.ends_with('.'));
        assert!(fs.abs_path("/definitely/not/here").is_err());
    }

    #[test]
    fn test_detach_revokes_surface() {
        let fs = fs_with(&[("/proj/a.js", "A")]);
        let store = fs.detach().unwrap();
        assert_eq!(store.len(), 1);
        assert!(fs.is_detached());
        assert!(matches!(
            fs.read_file("/proj/a.js", Encoding::Utf8),
            Err(VfsError::Detached)
        ));
        assert!(!fs.exists("/proj/a.js"));
        assert!(fs.detach().is_none());
    }
}
