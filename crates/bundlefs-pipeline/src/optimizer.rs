//! The optimizer seam.
//!
//! An optimizer is the external bundler the batch exists to feed. The
//! adapter calls it once per batch with the config and the filesystem
//! surface, and treats its single result as the end of the optimize phase.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use bundlefs_vfs::BuildFs;

use crate::config::BatchConfig;

/// What a successful optimizer run reports back.
///
/// The adapter only logs it; flushing is driven by success alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildResponse {
    pub summary: String,
}

impl BuildResponse {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
        }
    }
}

impl fmt::Display for BuildResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}

/// A bundler driven against the in-memory filesystem.
///
/// `optimize` is invoked exactly once per batch. It may call any
/// [`BuildFs`] operation, any number of times, in any order, until it
/// returns. The surface is revoked as soon as it does, so handles must not
/// be kept past the call.
#[async_trait]
pub trait Optimizer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Run the build.
    async fn optimize(
        &self,
        config: &BatchConfig,
        fs: Arc<dyn BuildFs>,
    ) -> anyhow::Result<BuildResponse>;
}
