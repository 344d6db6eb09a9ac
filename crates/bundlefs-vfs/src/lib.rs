//! # bundlefs-vfs
//!
//! In-memory build filesystem for running a batch-oriented bundler over a
//! stream of in-flight artifacts.
//!
//! Key components:
//!
//! - [`PathStyle`] - canonicalizes paths into store keys
//! - [`VirtualFileStore`] - canonical path → [`VirtualFile`], one per batch
//! - Directory emulation ([`PrefixMode`], [`FileFilter`]) - directories are
//!   derived from key prefixes, never stored as a tree
//! - [`BuildFs`] - the filesystem surface handed to the optimizer
//! - [`MemoryFs`] - [`BuildFs`] over a store
//!
//! ## Design Decisions
//!
//! - **Flat key space**: a directory exists if a marker record is stored at
//!   its path or any key lies below it.
//! - **Strict path prefixes by default**: `/a` never contains `/ab`. The
//!   legacy text-containment rule is available as [`PrefixMode::Substring`].
//! - **Revocable surface**: the adapter detaches the store when the
//!   optimize phase ends, so a leaked handle cannot mutate a flushed batch.

mod dirs;
mod error;
mod memory;
mod ops;
pub mod path;
pub mod realfs;
mod store;
mod types;

pub use dirs::{FileFilter, PrefixMode};
pub use error::{VfsError, VfsResult};
pub use memory::{DEFAULT_EXCLUSION, DEFAULT_TEMP_SUFFIX, FsOptions, MemoryFs};
pub use ops::BuildFs;
pub use path::PathStyle;
pub use realfs::{DirCreator, LocalDirs};
pub use store::VirtualFileStore;
pub use types::{Encoding, FileStat, FileType, VirtualFile, WriteTarget};
