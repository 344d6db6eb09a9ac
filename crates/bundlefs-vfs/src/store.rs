//! The batch-scoped virtual file store.

use indexmap::IndexMap;
use std::collections::BTreeSet;

use crate::path::is_within;
use crate::types::VirtualFile;

/// Canonical path → in-flight file, for one batch.
///
/// Iteration follows insertion order, so a flush emits files in the order
/// they were ingested or produced. A sorted copy of the keys answers
/// path-prefix queries without a full scan.
///
/// The store never canonicalizes: callers hand it keys that already went
/// through [`PathStyle::normalize`](crate::PathStyle::normalize).
#[derive(Debug, Clone, Default)]
pub struct VirtualFileStore {
    files: IndexMap<String, VirtualFile>,
    index: BTreeSet<String>,
}

impl VirtualFileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file under its own `path`, returning any record it replaced.
    pub fn insert(&mut self, file: VirtualFile) -> Option<VirtualFile> {
        self.index.insert(file.path.clone());
        self.files.insert(file.path.clone(), file)
    }

    /// Insert a file under `path`, rewriting the record's own path to match.
    pub fn insert_at(&mut self, path: impl Into<String>, mut file: VirtualFile) -> Option<VirtualFile> {
        file.path = path.into();
        self.insert(file)
    }

    /// Remove a record, preserving the order of the rest.
    pub fn remove(&mut self, path: &str) -> Option<VirtualFile> {
        self.index.remove(path);
        self.files.shift_remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&VirtualFile> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Stored paths in store order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Stored records in store order.
    pub fn iter(&self) -> impl Iterator<Item = &VirtualFile> {
        self.files.values()
    }

    /// Keys equal to `dir` or below it, in sorted order.
    pub fn keys_within(&self, dir: &str) -> Vec<String> {
        if dir == "." {
            return self
                .index
                .iter()
                .filter(|k| is_within(dir, k))
                .cloned()
                .collect();
        }
        self.index
            .range::<str, _>((std::ops::Bound::Included(dir), std::ops::Bound::Unbounded))
            .take_while(|k| k.starts_with(dir))
            .filter(|k| is_within(dir, k))
            .cloned()
            .collect()
    }

    /// True if some key other than `dir` lies below it.
    pub fn has_descendants(&self, dir: &str) -> bool {
        self.keys_within(dir).iter().any(|k| k != dir)
    }

    /// Consume the store, yielding every record in store order.
    pub fn into_files(self) -> Vec<VirtualFile> {
        self.files.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(paths: &[&str]) -> VirtualFileStore {
        let mut store = VirtualFileStore::new();
        for p in paths {
            store.insert(VirtualFile::new(*p, *p));
        }
        store
    }

    #[test]
    fn test_insert_and_replace() {
        let mut store = VirtualFileStore::new();
        assert!(store.insert(VirtualFile::new("/proj/a.js", "1")).is_none());
        let old = store.insert(VirtualFile::new("/proj/a.js", "2")).unwrap();
        assert_eq!(old.bytes(), b"1");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("/proj/a.js").unwrap().bytes(), b"2");
    }

    #[test]
    fn test_insert_at_rewrites_path() {
        let mut store = VirtualFileStore::new();
        store.insert_at("/proj/b.js", VirtualFile::new("/elsewhere", "x"));
        assert_eq!(store.get("/proj/b.js").unwrap().path, "/proj/b.js");
        assert!(!store.contains("/elsewhere"));
    }

    #[test]
    fn test_order_survives_removal() {
        let mut store = store_with(&["/p/c.js", "/p/a.js", "/p/b.js"]);
        store.remove("/p/a.js");
        let order: Vec<_> = store.paths().collect();
        assert_eq!(order, vec!["/p/c.js", "/p/b.js"]);
    }

    #[test]
    fn test_keys_within_is_path_prefix() {
        let store = store_with(&["/a/x.js", "/ab/c.js", "/a", "/a/b/y.js", "/b.js"]);
        assert_eq!(store.keys_within("/a"), vec!["/a", "/a/b/y.js", "/a/x.js"]);
        assert!(store.has_descendants("/a"));
        assert!(!store.has_descendants("/b.js"));
        assert_eq!(store.keys_within("/").len(), 5);
    }

    #[test]
    fn test_into_files_keeps_order() {
        let store = store_with(&["/z.js", "/a.js"]);
        let files = store.into_files();
        assert_eq!(files[0].path, "/z.js");
        assert_eq!(files[1].path, "/a.js");
    }
}
