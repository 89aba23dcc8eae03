//! Reindex job model and the in-process job registry.
//!
//! Jobs follow `Pending → Running → {Completed | Failed}`. Per-entry
//! failures never fail a job; `Failed` is reserved for job-level fatal
//! conditions. The registry is a keyed map behind a narrow handle so a
//! shared external store can replace it without touching the state machine.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Lifecycle state of one reindex job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// One background reindexing run. Process-lifetime only: a best-effort
/// operational record, not a correctness-critical one.
#[derive(Debug, Clone, Serialize)]
pub struct ReindexJob {
    pub id: Uuid,
    pub state: JobState,
    /// Target entry count, fixed when the job starts running.
    pub total: u64,
    /// Entries embedded successfully.
    pub processed: u64,
    /// Entries whose embedding failed; the batch continued past them.
    pub errors: u64,
    /// Entries whose enrichment was freshly crawled.
    pub enriched: u64,
    /// Human-readable progress message.
    pub message: String,
    /// Name of the entry currently being indexed.
    pub current: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReindexJob {
    pub(crate) fn pending(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            state: JobState::Pending,
            total: 0,
            processed: 0,
            errors: 0,
            enriched: 0,
            message: "queued".to_string(),
            current: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// Completion percentage over attempted entries.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (((self.processed + self.errors) * 100) / self.total).min(100) as u8
    }
}

/// Shared handle to the job table.
#[derive(Clone, Default)]
pub struct JobRegistry {
    inner: Arc<RwLock<HashMap<Uuid, ReindexJob>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, job: ReindexJob) {
        self.inner.write().await.insert(job.id, job);
    }

    /// Applies a mutation to one job, stamping `updated_at`.
    pub async fn update<F>(&self, id: Uuid, mutate: F)
    where
        F: FnOnce(&mut ReindexJob),
    {
        if let Some(job) = self.inner.write().await.get_mut(&id) {
            mutate(job);
            job.updated_at = Utc::now();
        }
    }

    /// Snapshot of one job; `None` maps to a "not found" status upstream,
    /// never to an error.
    pub async fn get(&self, id: Uuid) -> Option<ReindexJob> {
        self.inner.read().await.get(&id).cloned()
    }

    /// All known jobs, most recently started first.
    pub async fn list(&self) -> Vec<ReindexJob> {
        let mut jobs: Vec<ReindexJob> = self.inner.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        jobs
    }
}
