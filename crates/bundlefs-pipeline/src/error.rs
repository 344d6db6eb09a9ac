//! Pipeline error types.

use std::time::Duration;
use thiserror::Error;

use bundlefs_vfs::VfsError;

use crate::adapter::BatchState;

/// Errors from driving a batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A lifecycle call arrived in the wrong phase.
    #[error("cannot {op} while batch is {state}")]
    InvalidState { op: &'static str, state: BatchState },

    /// The optimizer reported failure. Nothing was flushed.
    #[error("optimizer failed: {0:#}")]
    Optimizer(anyhow::Error),

    /// The optimizer did not finish in time. Nothing was flushed.
    #[error("optimizer timed out after {0:?}")]
    Timeout(Duration),

    /// Downstream hung up before every artifact was emitted.
    #[error("output closed during flush")]
    OutputClosed,

    /// Invalid batch configuration.
    #[error("invalid config: {0}")]
    Config(String),

    /// Config file did not parse.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    Vfs(#[from] VfsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn invalid_state(op: &'static str, state: BatchState) -> Self {
        Self::InvalidState { op, state }
    }
}

/// Pipeline result type.
pub type PipelineResult<T> = Result<T, PipelineError>;
