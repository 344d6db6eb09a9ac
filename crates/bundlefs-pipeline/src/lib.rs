//! # bundlefs-pipeline
//!
//! Runs a batch-oriented optimizer (a bundler that expects a real disk)
//! inside a streaming build pipeline.
//!
//! Upstream artifacts are ingested into a [`VirtualFileStore`](bundlefs_vfs::VirtualFileStore),
//! the optimizer is invoked once against a [`BuildFs`](bundlefs_vfs::BuildFs)
//! over that store, and every file left in the store afterwards is flushed
//! downstream.
//!
//! ```ignore
//! let (tx, mut rx) = tokio::sync::mpsc::channel(64);
//! let optimizer = PlanOptimizer::from_config(&config);
//! let report = run_batch(config, &optimizer, futures::stream::iter(artifacts), tx).await?;
//! ```

mod adapter;
mod artifact;
mod config;
mod error;
mod optimizer;
mod plan;

pub use adapter::{BatchAdapter, BatchReport, BatchState, run_batch};
pub use artifact::Artifact;
pub use config::BatchConfig;
pub use error::{PipelineError, PipelineResult};
pub use optimizer::{BuildResponse, Optimizer};
pub use plan::{PlanOptimizer, PlanStep};
