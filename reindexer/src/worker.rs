//! The reindex worker loop.
//!
//! One worker per job, never parallelized across entries: the external
//! embedding/enrichment providers impose rate limits, and the fixed
//! per-entry and per-batch pauses are the backpressure mechanism. One
//! entry's failure never aborts the batch.

use std::sync::Arc;
use std::time::Duration;

use catalog_core::{CatalogEntry, CatalogStore};
use chrono::Utc;
use search_engine::{ComposeContext, ComposeOptions, ContentEnricher, SemanticProvider, compose};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::coordinator::{ReindexOptions, ReindexScope};
use crate::job::{JobRegistry, JobState};
use crate::progress::ReindexProgress;

pub(crate) struct WorkerCtx {
    pub store: Arc<CatalogStore>,
    pub provider: Arc<dyn SemanticProvider>,
    pub enricher: Arc<dyn ContentEnricher>,
    pub registry: JobRegistry,
    pub progress: Arc<dyn ReindexProgress>,
}

/// Runs one job to a terminal state, updating the registry as it goes.
pub(crate) async fn run(ctx: WorkerCtx, job_id: Uuid, scope: ReindexScope, opts: ReindexOptions) {
    // Job-level fatal condition: nothing to embed with at all.
    if !ctx.provider.available() {
        warn!(%job_id, "reindex aborted: no embedding provider configured");
        ctx.registry
            .update(job_id, |job| {
                job.state = JobState::Failed;
                job.message = "no embedding provider configured".to_string();
            })
            .await;
        ctx.progress.finish("failed: no provider");
        return;
    }

    let target_ids: Vec<i64> = match scope {
        ReindexScope::Full => ctx.store.published_entry_ids().await,
        ReindexScope::Single(id) => {
            if ctx.store.entry(id).await.is_none() {
                ctx.registry
                    .update(job_id, |job| {
                        job.state = JobState::Failed;
                        job.message = format!("unknown catalog entry: {id}");
                    })
                    .await;
                ctx.progress.finish("failed: unknown entry");
                return;
            }
            vec![id]
        }
    };

    let total = target_ids.len() as u64;
    info!(%job_id, total, "reindex running");
    ctx.registry
        .update(job_id, |job| {
            job.state = JobState::Running;
            job.total = total;
            job.message = "running".to_string();
        })
        .await;
    ctx.progress.begin(total);

    let batch_size = opts.batch_size.max(1);
    for (index, entry_id) in target_ids.iter().enumerate() {
        let Some(entry) = ctx.store.entry(*entry_id).await else {
            // Entry vanished mid-run; count it with the failures.
            ctx.registry.update(job_id, |job| job.errors += 1).await;
            continue;
        };
        let name = entry.name_en.clone();

        ctx.registry
            .update(job_id, |job| {
                job.current = Some(name.clone());
                job.message = format!("indexing {name}");
            })
            .await;

        let enrichment = resolve_enrichment(&ctx, &entry, &opts, job_id).await;

        let context = ComposeContext {
            categories: ctx.store.categories_by_ids(&entry.category_ids).await,
            metadata: ctx.store.active_options_for_entry(entry.id).await,
            enrichment,
        };
        let document = compose(
            &entry,
            &context,
            ComposeOptions {
                complete: !opts.quick,
                include_enrichment: opts.crawl,
            },
        );

        match ctx.provider.embed(&document).await {
            Ok(vector) if !vector.is_empty() => {
                if let Err(e) = ctx.store.set_embedding(entry.id, vector).await {
                    warn!(%job_id, entry_id = entry.id, error = %e, "embedding write failed");
                    ctx.registry.update(job_id, |job| job.errors += 1).await;
                } else {
                    ctx.registry.update(job_id, |job| job.processed += 1).await;
                }
            }
            Ok(_) => {
                warn!(%job_id, entry_id = entry.id, "provider returned empty embedding");
                ctx.registry.update(job_id, |job| job.errors += 1).await;
            }
            Err(e) => {
                warn!(%job_id, entry_id = entry.id, error = %e, "embedding failed; continuing");
                ctx.registry.update(job_id, |job| job.errors += 1).await;
            }
        }

        ctx.progress.entry(&name);
        debug!(%job_id, entry_id = entry.id, "entry done");

        // Rate-limit pacing: brief pause after every entry, longer pause
        // after every full batch.
        if opts.entry_pause_ms > 0 {
            tokio::time::sleep(Duration::from_millis(opts.entry_pause_ms)).await;
        }
        if (index + 1) % batch_size == 0 && index + 1 < target_ids.len() && opts.batch_pause_ms > 0
        {
            debug!(%job_id, batch = (index + 1) / batch_size, "batch pause");
            tokio::time::sleep(Duration::from_millis(opts.batch_pause_ms)).await;
        }
    }

    ctx.registry
        .update(job_id, |job| {
            job.state = JobState::Completed;
            job.current = None;
            job.message = format!(
                "reindex complete: {} processed, {} errors, {} enriched",
                job.processed, job.errors, job.enriched
            );
        })
        .await;
    if let Some(job) = ctx.registry.get(job_id).await {
        info!(%job_id, processed = job.processed, errors = job.errors, "reindex completed");
        ctx.progress.finish(&job.message);
    }
}

/// Decides the enrichment text for one entry: a fresh cache is reused,
/// otherwise a crawl is attempted; a failed crawl simply omits enrichment.
async fn resolve_enrichment(
    ctx: &WorkerCtx,
    entry: &CatalogEntry,
    opts: &ReindexOptions,
    job_id: Uuid,
) -> Option<String> {
    if !opts.crawl {
        return None;
    }

    if !opts.force_refresh {
        if let Some(cache) = &entry.enrichment {
            if !cache.is_stale(opts.staleness_days, Utc::now()) {
                return Some(cache.text.clone());
            }
        }
    }

    match ctx.enricher.fetch(entry).await {
        Some(text) => {
            if let Err(e) = ctx.store.set_enrichment(entry.id, text.clone(), Utc::now()).await {
                warn!(%job_id, entry_id = entry.id, error = %e, "enrichment write failed");
            }
            ctx.registry.update(job_id, |job| job.enriched += 1).await;
            Some(text)
        }
        None => {
            debug!(%job_id, entry_id = entry.id, "no enrichment available");
            None
        }
    }
}
