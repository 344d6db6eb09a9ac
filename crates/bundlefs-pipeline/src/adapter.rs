//! The batch adapter.
//!
//! Collects every artifact of a batch into a store, hands the store to the
//! optimizer as a filesystem, then flushes whatever the store holds
//! afterwards. One adapter drives one batch:
//!
//! ```text
//! Idle ──start──▶ Ingesting ──finish──▶ Optimizing ──ok──▶ Flushing ──▶ Done
//!                                            │                 │
//!                                            └──err/timeout──▶ Failed ◀──┘
//! ```

use futures::{Stream, StreamExt};
use std::pin::pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use bundlefs_vfs::{BuildFs, DirCreator, FsOptions, LocalDirs, MemoryFs, VirtualFileStore};

use crate::artifact::Artifact;
use crate::config::BatchConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::optimizer::{BuildResponse, Optimizer};

/// Where a batch is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BatchState {
    Idle,
    Ingesting,
    Optimizing,
    Flushing,
    Done,
    Failed,
}

/// Outcome of a completed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub response: BuildResponse,
    /// Artifacts received from upstream.
    pub ingested: usize,
    /// Artifacts sent downstream.
    pub emitted: usize,
}

/// Drives one batch through ingest, optimize and flush.
#[derive(Debug)]
pub struct BatchAdapter {
    config: BatchConfig,
    fs_options: FsOptions,
    root: String,
    state: BatchState,
    store: Option<VirtualFileStore>,
    dirs: Arc<dyn DirCreator>,
    ingested: usize,
}

impl BatchAdapter {
    /// Validate `config` and prepare an idle adapter.
    pub fn new(config: BatchConfig) -> PipelineResult<Self> {
        config.validate()?;
        let fs_options = config.fs_options()?;
        let root = config.root();
        Ok(Self {
            config,
            fs_options,
            root,
            state: BatchState::Idle,
            store: None,
            dirs: Arc::new(LocalDirs),
            ingested: 0,
        })
    }

    /// Route `mk_dir` through a custom real-disk collaborator.
    pub fn with_dir_creator(mut self, dirs: Arc<dyn DirCreator>) -> Self {
        self.dirs = dirs;
        self
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Begin a batch with an empty store.
    pub fn start(&mut self) -> PipelineResult<()> {
        if self.state != BatchState::Idle {
            return Err(PipelineError::invalid_state("start", self.state));
        }
        self.store = Some(VirtualFileStore::new());
        self.state = BatchState::Ingesting;
        info!(root = %self.root, "batch started");
        Ok(())
    }

    /// Store one upstream artifact. Returns its canonical key.
    ///
    /// A later artifact with the same resolved path replaces the earlier
    /// one. Starts the batch if it is still idle.
    pub fn ingest(&mut self, artifact: Artifact) -> PipelineResult<String> {
        if self.state == BatchState::Idle {
            self.start()?;
        }
        if self.state != BatchState::Ingesting {
            return Err(PipelineError::invalid_state("ingest", self.state));
        }

        let file = artifact.into_virtual(self.fs_options.style, &self.root);
        let key = file.path.clone();
        self.store
            .get_or_insert_with(VirtualFileStore::new)
            .insert(file);
        self.ingested += 1;
        debug!(path = %key, "ingested");
        Ok(key)
    }

    /// End of input: run the optimizer once, then flush into `output`.
    ///
    /// `output` is dropped when this returns, so the receiver sees
    /// end-of-output whether or not anything was sent. On optimizer failure
    /// or timeout nothing is sent.
    ///
    /// Flushing waits on `output`'s capacity, so the receiver must be
    /// drained concurrently (on another task) or this never returns once the
    /// store holds more records than the channel can buffer.
    #[tracing::instrument(
        skip_all,
        name = "batch.finish",
        fields(optimizer = optimizer.name(), root = %self.root)
    )]
    pub async fn finish(
        &mut self,
        optimizer: &dyn Optimizer,
        output: mpsc::Sender<Artifact>,
    ) -> PipelineResult<BatchReport> {
        if self.state == BatchState::Idle {
            self.start()?;
        }
        if self.state != BatchState::Ingesting {
            return Err(PipelineError::invalid_state("optimize", self.state));
        }

        let store = self.store.take().unwrap_or_default();
        self.state = BatchState::Optimizing;
        info!(files = store.len(), "optimizing");

        let response = match self.optimize(optimizer, store).await {
            Ok((response, store)) => {
                self.store = Some(store);
                response
            }
            Err(e) => {
                error!(error = %e, "batch failed, nothing flushed");
                self.state = BatchState::Failed;
                return Err(e);
            }
        };
        info!(%response, "optimizer finished");

        self.state = BatchState::Flushing;
        match self.flush(&output).await {
            Ok(emitted) => {
                self.state = BatchState::Done;
                info!(emitted, "batch done");
                Ok(BatchReport {
                    response,
                    ingested: self.ingested,
                    emitted,
                })
            }
            Err(e) => {
                error!(error = %e, "flush aborted");
                self.state = BatchState::Failed;
                Err(e)
            }
        }
    }

    /// Run the optimizer over `store` and take the store back afterwards.
    async fn optimize(
        &self,
        optimizer: &dyn Optimizer,
        store: VirtualFileStore,
    ) -> PipelineResult<(BuildResponse, VirtualFileStore)> {
        let fs = Arc::new(MemoryFs::with_dir_creator(
            store,
            self.fs_options.clone(),
            self.dirs.clone(),
        ));
        let surface: Arc<dyn BuildFs> = fs.clone();
        let run = optimizer.optimize(&self.config, surface);

        let result = match self.config.optimize_timeout() {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(result) => result.map_err(PipelineError::Optimizer),
                Err(_) => Err(PipelineError::Timeout(limit)),
            },
            None => run.await.map_err(PipelineError::Optimizer),
        };

        // Revoke every outstanding handle before looking at the result.
        let store = fs.detach();
        let response = result?;
        let store = store.ok_or(bundlefs_vfs::VfsError::Detached)?;
        Ok((response, store))
    }

    /// Send every stored record downstream in store order.
    async fn flush(&mut self, output: &mpsc::Sender<Artifact>) -> PipelineResult<usize> {
        let store = self.store.take().unwrap_or_default();
        let mut emitted = 0;
        for file in store.into_files() {
            let artifact = Artifact::from_virtual(&self.root, file);
            debug!(path = %artifact.relative_path, "emit");
            output
                .send(artifact)
                .await
                .map_err(|_| PipelineError::OutputClosed)?;
            emitted += 1;
        }
        Ok(emitted)
    }
}

/// Run one whole batch: ingest `input` to its end, optimize, flush.
///
/// As with [`BatchAdapter::finish`], `output` must be drained on another
/// task while this runs.
pub async fn run_batch<S>(
    config: BatchConfig,
    optimizer: &dyn Optimizer,
    input: S,
    output: mpsc::Sender<Artifact>,
) -> PipelineResult<BatchReport>
where
    S: Stream<Item = Artifact>,
{
    let mut adapter = BatchAdapter::new(config)?;
    adapter.start()?;

    let mut input = pin!(input);
    while let Some(artifact) = input.next().await {
        adapter.ingest(artifact)?;
    }

    adapter.finish(optimizer, output).await
}
