//! Path canonicalization for store keys.
//!
//! Every path that reaches the store goes through [`PathStyle::normalize`],
//! so two spellings of the same file (`/proj/./lib//b.js`,
//! `/proj/lib/../lib/b.js`) land on one key. Keys compare by exact string
//! equality; no case folding happens here.
//!
//! The one wrinkle is Windows: drive-absolute paths (`C:\proj\a.js`) keep
//! the native backslash form because the real-disk directory calls on that
//! platform need it. Everything else is front-slashed.

use serde::{Deserialize, Serialize};

/// Path convention of the host the batch runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// `/` is the only separator; `\` is an ordinary character.
    Posix,
    /// Both `/` and `\` separate; drive-absolute paths stay backslashed.
    Windows,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::native()
    }
}

impl PathStyle {
    /// The style of the platform this binary was built for.
    pub fn native() -> Self {
        if cfg!(windows) {
            PathStyle::Windows
        } else {
            PathStyle::Posix
        }
    }

    fn is_separator(self, c: char) -> bool {
        match self {
            PathStyle::Posix => c == '/',
            PathStyle::Windows => c == '/' || c == '\\',
        }
    }

    /// Canonicalize a path into its store-key form.
    ///
    /// Collapses `.` and `..` segments and repeated separators. `..` above an
    /// absolute root is dropped; leading `..` on a relative path is kept.
    /// Empty input normalizes to `.`. Trailing separators are removed.
    pub fn normalize(self, path: &str) -> String {
        let (drive, rest) = self.split_drive(path);
        let absolute = rest.chars().next().is_some_and(|c| self.is_separator(c));

        let mut stack: Vec<&str> = Vec::new();
        for segment in rest.split(|c| self.is_separator(c)) {
            match segment {
                "" | "." => {}
                ".." => {
                    if stack.last().is_some_and(|s| *s != "..") {
                        stack.pop();
                    } else if !absolute {
                        stack.push("..");
                    }
                }
                s => stack.push(s),
            }
        }

        // Drive-absolute on Windows keeps the native form.
        let sep = if drive.is_some() && absolute { "\\" } else { "/" };
        let body = stack.join(sep);

        let mut out = String::with_capacity(path.len());
        if let Some(d) = drive {
            out.push_str(d);
        }
        if absolute {
            out.push_str(sep);
        }
        out.push_str(&body);

        if out.is_empty() {
            out.push('.');
        }
        out
    }

    /// Resolve `path` against `base`, then normalize.
    ///
    /// Absolute paths ignore `base`.
    pub fn resolve(self, base: &str, path: &str) -> String {
        if self.is_absolute(path) {
            self.normalize(path)
        } else {
            self.normalize(&format!("{base}/{path}"))
        }
    }

    /// Returns true for rooted paths (`/x`, and `C:\x` / `\x` on Windows).
    pub fn is_absolute(self, path: &str) -> bool {
        let (_, rest) = self.split_drive(path);
        rest.chars().next().is_some_and(|c| self.is_separator(c))
    }

    /// Returns true if `path` is a drive-absolute path (`C:\...`).
    ///
    /// Always false for [`PathStyle::Posix`].
    pub fn is_drive_absolute(self, path: &str) -> bool {
        match self.split_drive(path) {
            (Some(_), rest) => rest.chars().next().is_some_and(|c| self.is_separator(c)),
            (None, _) => false,
        }
    }

    /// Returns true if `path` names nothing but a drive root (`C:`, `C:\`).
    pub fn is_drive_root(self, path: &str) -> bool {
        match self.split_drive(path) {
            (Some(_), rest) => rest.chars().all(|c| self.is_separator(c)),
            (None, _) => false,
        }
    }

    fn split_drive(self, path: &str) -> (Option<&str>, &str) {
        if self != PathStyle::Windows {
            return (None, path);
        }
        let bytes = path.as_bytes();
        if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
            (Some(&path[..2]), &path[2..])
        } else {
            (None, path)
        }
    }
}

/// Drop the last `/`-delimited segment of a path.
///
/// Purely textual: `parent("/proj/lib/b.js") == "/proj/lib"`,
/// `parent("/proj") == ""`.
pub fn parent(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

/// Strict path-prefix containment: `dir` itself or anything below it.
///
/// `/a` contains `/a` and `/a/b.js`, but not `/ab/c.js`. The relative root
/// `.` contains every relative path.
pub fn is_within(dir: &str, path: &str) -> bool {
    if path == dir {
        return true;
    }
    if dir == "." {
        let climbs = path == ".." || path.starts_with("../") || path.starts_with("..\\");
        return !path.starts_with(['/', '\\']) && !climbs;
    }
    match path.strip_prefix(dir) {
        Some(rest) => dir.ends_with(['/', '\\']) || rest.starts_with(['/', '\\']),
        None => false,
    }
}

/// Path of `path` relative to `base`, or `path` unchanged when it lies
/// outside `base`.
pub fn relative_to<'a>(base: &str, path: &'a str) -> &'a str {
    if path == base {
        return "";
    }
    if !is_within(base, path) {
        return path;
    }
    match path.strip_prefix(base) {
        Some(rest) => rest.trim_start_matches(['/', '\\']),
        None => path,
    }
}
