//! Directory emulation over the flat key space.
//!
//! The store holds no directory tree. A directory exists if it has an
//! explicit marker record or if some stored key lies below it, and listing
//! and recursive deletion are prefix queries over the keys.
//!
//! Two containment rules are supported, see [`PrefixMode`].

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{VfsError, VfsResult};
use crate::path::{is_within, relative_to};
use crate::store::VirtualFileStore;

/// How "is `path` inside directory `dir`" is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixMode {
    /// Strict path-prefix containment: `/a` holds `/a/x.js`, not `/ab/x.js`.
    #[default]
    Path,
    /// Legacy text containment: `/a` holds any key containing `/a`,
    /// including `/ab/x.js` and `/lib/a/x.js`.
    Substring,
}

impl PrefixMode {
    /// True if `path` is `dir` or lies inside it under this mode.
    pub fn contains(self, dir: &str, path: &str) -> bool {
        match self {
            PrefixMode::Path => is_within(dir, path),
            PrefixMode::Substring => path.contains(dir),
        }
    }
}

/// Include/exclude regexes for listings.
///
/// With no include pattern every path is included.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl FileFilter {
    /// Match everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Include only paths matching `include`.
    pub fn include(include: Regex) -> Self {
        Self {
            include: Some(include),
            exclude: None,
        }
    }

    /// Compile an include pattern and an optional exclude pattern.
    pub fn new(include: &str, exclude: Option<&str>) -> VfsResult<Self> {
        let include = Regex::new(include).map_err(|e| VfsError::pattern(include, e))?;
        let exclude = exclude
            .map(|p| Regex::new(p).map_err(|e| VfsError::pattern(p, e)))
            .transpose()?;
        Ok(Self {
            include: Some(include),
            exclude,
        })
    }

    /// Also reject paths matching `exclude`.
    pub fn with_exclude(mut self, exclude: Regex) -> Self {
        self.exclude = Some(exclude);
        self
    }

    pub fn matches(&self, path: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(path) {
                return false;
            }
        }
        match &self.exclude {
            Some(exclude) => !exclude.is_match(path),
            None => true,
        }
    }
}

impl From<Regex> for FileFilter {
    fn from(include: Regex) -> Self {
        Self::include(include)
    }
}

impl VirtualFileStore {
    /// True if `path` is a directory marker. Under `PrefixMode::Path` a
    /// path with any stored key strictly below it is a directory too;
    /// `Substring` only trusts explicit markers.
    pub fn is_dir(&self, path: &str, mode: PrefixMode) -> bool {
        match (self.get(path), mode) {
            (Some(file), _) => file.is_dir(),
            (None, PrefixMode::Path) => self.keys_within(path).iter().any(|k| k != path),
            (None, PrefixMode::Substring) => false,
        }
    }

    /// True if `path` is stored as a regular file.
    pub fn is_file(&self, path: &str) -> bool {
        self.get(path).is_some_and(|f| f.is_file())
    }

    /// Keys equal to `dir` or inside it, under `mode`.
    ///
    /// `Path` uses the sorted index; `Substring` scans every key.
    pub fn descendants(&self, dir: &str, mode: PrefixMode) -> Vec<String> {
        match mode {
            PrefixMode::Path => self.keys_within(dir),
            PrefixMode::Substring => self
                .paths()
                .filter(|k| k.contains(dir))
                .map(str::to_string)
                .collect(),
        }
    }

    /// Regular files inside `root_dir` accepted by `filter`, in store order.
    ///
    /// `exclusion` is tested against the path relative to `root_dir`, so a
    /// dot-directory above the root does not hide the whole tree.
    pub fn list_files(
        &self,
        root_dir: &str,
        filter: &FileFilter,
        exclusion: Option<&Regex>,
        mode: PrefixMode,
    ) -> Vec<String> {
        self.iter()
            .filter(|f| f.is_file())
            .filter(|f| mode.contains(root_dir, &f.path))
            .filter(|f| filter.matches(&f.path))
            .filter(|f| {
                exclusion.is_none_or(|re| !re.is_match(relative_to(root_dir, &f.path)))
            })
            .map(|f| f.path.clone())
            .collect()
    }

    /// Remove `dir` and everything inside it. Returns the removed keys.
    pub fn remove_tree(&mut self, dir: &str, mode: PrefixMode) -> Vec<String> {
        let doomed = self.descendants(dir, mode);
        for key in &doomed {
            self.remove(key);
        }
        doomed
    }

    /// Remove directory markers under `start_dir` with nothing left inside.
    ///
    /// Markers are visited deepest first, so a parent emptied by pruning its
    /// children goes too. Under `PrefixMode::Path` a marker stored at
    /// `base_root` itself is dropped (the root always exists implicitly).
    /// Under `PrefixMode::Substring` every key containing `base_root` is
    /// swept, directories recursively, which clears the whole batch when
    /// all keys sit below the root.
    pub fn prune_empty_dirs(
        &mut self,
        start_dir: &str,
        base_root: &str,
        mode: PrefixMode,
    ) -> Vec<String> {
        let mut removed = Vec::new();

        match mode {
            PrefixMode::Path => {
                if self.get(base_root).is_some_and(|f| f.is_dir()) {
                    self.remove(base_root);
                    removed.push(base_root.to_string());
                }
            }
            PrefixMode::Substring => {
                let swept: Vec<String> = self
                    .paths()
                    .filter(|k| k.contains(base_root))
                    .map(str::to_string)
                    .collect();
                for key in swept {
                    match self.get(&key) {
                        Some(f) if f.is_dir() => removed.extend(self.remove_tree(&key, mode)),
                        Some(_) => {
                            self.remove(&key);
                            removed.push(key);
                        }
                        None => {}
                    }
                }
            }
        }

        let mut markers: Vec<String> = self
            .iter()
            .filter(|f| f.is_dir() && mode.contains(start_dir, &f.path))
            .map(|f| f.path.clone())
            .collect();
        markers.sort_by_key(|p| std::cmp::Reverse(p.matches(['/', '\\']).count()));

        for marker in markers {
            let occupied = self.descendants(&marker, mode).iter().any(|k| *k != marker);
            if !occupied {
                self.remove(&marker);
                removed.push(marker);
            }
        }

        removed
    }
}
