//! Job lifecycle coordination: start, track, poll.

use std::sync::Arc;

use catalog_core::CatalogStore;
use search_engine::{ContentEnricher, SemanticProvider};
use tracing::info;
use uuid::Uuid;

use crate::job::{JobRegistry, ReindexJob};
use crate::progress::{NoopReindexProgress, ReindexProgress};
use crate::worker::{self, WorkerCtx};

/// Target entry set of one job.
#[derive(Debug, Clone, Copy)]
pub enum ReindexScope {
    /// Every published entry.
    Full,
    /// One entry, regardless of lifecycle state.
    Single(i64),
}

/// Per-job knobs.
#[derive(Debug, Clone)]
pub struct ReindexOptions {
    /// Fetch/refresh enrichment text while indexing.
    pub crawl: bool,
    /// Refetch enrichment even when a fresh cache exists.
    pub force_refresh: bool,
    /// Compose without full descriptions and enrichment (faster, less signal).
    pub quick: bool,
    /// Entries per batch between the longer pauses.
    pub batch_size: usize,
    /// Enrichment cache age, in days, beyond which a refetch happens.
    pub staleness_days: i64,
    /// Pause after every entry, milliseconds.
    pub entry_pause_ms: u64,
    /// Pause after every full batch, milliseconds.
    pub batch_pause_ms: u64,
}

impl Default for ReindexOptions {
    fn default() -> Self {
        Self {
            crawl: false,
            force_refresh: false,
            quick: false,
            batch_size: 10,
            staleness_days: 30,
            entry_pause_ms: 200,
            batch_pause_ms: 2000,
        }
    }
}

/// Starts and tracks background reindex jobs.
///
/// One worker runs per job; multiple jobs may run concurrently and do not
/// coordinate. The embedding write is idempotently derived from current
/// entry state, so last write wins.
pub struct ReindexCoordinator {
    store: Arc<CatalogStore>,
    provider: Arc<dyn SemanticProvider>,
    enricher: Arc<dyn ContentEnricher>,
    registry: JobRegistry,
    progress: Arc<dyn ReindexProgress>,
}

impl ReindexCoordinator {
    pub fn new(
        store: Arc<CatalogStore>,
        provider: Arc<dyn SemanticProvider>,
        enricher: Arc<dyn ContentEnricher>,
    ) -> Self {
        Self {
            store,
            provider,
            enricher,
            registry: JobRegistry::new(),
            progress: Arc::new(NoopReindexProgress),
        }
    }

    /// Replaces the progress reporter (CLI runs want the indicatif bar).
    pub fn with_progress(mut self, progress: Arc<dyn ReindexProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Queues a job and spawns its worker. Returns immediately with the id
    /// a client polls via [`Self::status`].
    pub async fn start(&self, scope: ReindexScope, opts: ReindexOptions) -> Uuid {
        let id = Uuid::new_v4();
        self.registry.insert(ReindexJob::pending(id)).await;
        info!(job_id = %id, ?scope, "reindex job queued");

        let ctx = self.worker_ctx();
        tokio::spawn(async move {
            worker::run(ctx, id, scope, opts).await;
        });
        id
    }

    /// Runs a job inline to its terminal state and returns the final record.
    /// Used by CLI tooling and tests; the HTTP surface uses [`Self::start`].
    pub async fn run_inline(&self, scope: ReindexScope, opts: ReindexOptions) -> ReindexJob {
        let id = Uuid::new_v4();
        self.registry.insert(ReindexJob::pending(id)).await;
        worker::run(self.worker_ctx(), id, scope, opts).await;
        self.registry
            .get(id)
            .await
            .expect("job vanished from registry")
    }

    /// Polls one job. `None` means "unknown id"; callers surface a
    /// not-found status, never an error.
    pub async fn status(&self, id: Uuid) -> Option<ReindexJob> {
        self.registry.get(id).await
    }

    /// All known jobs, most recent first.
    pub async fn jobs(&self) -> Vec<ReindexJob> {
        self.registry.list().await
    }

    fn worker_ctx(&self) -> WorkerCtx {
        WorkerCtx {
            store: self.store.clone(),
            provider: self.provider.clone(),
            enricher: self.enricher.clone(),
            registry: self.registry.clone(),
            progress: self.progress.clone(),
        }
    }
}
