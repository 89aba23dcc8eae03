//! Background reindexing pipeline for the app directory.
//!
//! A reindex job walks a target entry set, optionally refreshes enrichment
//! text, composes the embedding document, requests an embedding, and
//! persists the vector, pacing itself against provider rate limits and
//! isolating per-entry failures. Progress is observable live through the
//! job registry.

mod coordinator;
mod job;
mod progress;
mod worker;

pub use coordinator::{ReindexCoordinator, ReindexOptions, ReindexScope};
pub use job::{JobRegistry, JobState, ReindexJob};
pub use progress::{BarProgress, NoopReindexProgress, ReindexProgress};

#[cfg(test)]
mod tests {
    use super::*;

    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use catalog_core::{CatalogEntry, CatalogStore, Developer, EntryStatus, Platform};
    use chrono::{Duration as ChronoDuration, Utc};
    use search_engine::{ContentEnricher, NoopProvider, SearchError, SemanticProvider};

    /// Embeds everything except documents naming a poisoned entry.
    struct FlakyProvider {
        poison: &'static str,
    }

    impl SemanticProvider for FlakyProvider {
        fn embed<'a>(
            &'a self,
            text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, SearchError>> + Send + 'a>> {
            let poisoned = text.contains(self.poison);
            Box::pin(async move {
                if poisoned {
                    Err(SearchError::Provider("embedding backend hiccup".into()))
                } else {
                    Ok(vec![0.5, 0.5, 0.5])
                }
            })
        }

        fn complete<'a>(
            &'a self,
            _system: &'a str,
            _user: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, SearchError>> + Send + 'a>> {
            Box::pin(async { Ok(String::new()) })
        }
    }

    /// Counts fetches and returns fixed text.
    #[derive(Default)]
    struct CountingEnricher {
        calls: AtomicUsize,
    }

    impl ContentEnricher for CountingEnricher {
        fn fetch<'a>(
            &'a self,
            _entry: &'a CatalogEntry,
        ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Some("crawled listing text".to_string()) })
        }
    }

    fn entry(id: i64, name: &str) -> CatalogEntry {
        CatalogEntry {
            id,
            name_en: name.to_string(),
            name_ar: format!("تطبيق {id}"),
            summary_en: "summary".into(),
            summary_ar: String::new(),
            description_en: String::new(),
            description_ar: String::new(),
            category_ids: vec![],
            developer: Developer::default(),
            platform: Platform::Android,
            play_store_url: None,
            app_store_url: None,
            website_url: None,
            rating: 0.0,
            review_count: 0,
            view_count: 0,
            status: EntryStatus::Published,
            featured: false,
            embedding: None,
            enrichment: None,
        }
    }

    fn fast_opts() -> ReindexOptions {
        ReindexOptions {
            entry_pause_ms: 0,
            batch_pause_ms: 0,
            ..ReindexOptions::default()
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let store = Arc::new(CatalogStore::new());
        for id in 1..=12 {
            let name = if id == 5 {
                "Poisoned App".to_string()
            } else {
                format!("App {id}")
            };
            store.upsert_entry(entry(id, &name)).await;
        }

        let coordinator = ReindexCoordinator::new(
            store.clone(),
            Arc::new(FlakyProvider { poison: "Poisoned" }),
            Arc::new(search_engine::NoopEnricher),
        );
        let job = coordinator.run_inline(ReindexScope::Full, fast_opts()).await;

        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.total, 12);
        assert_eq!(job.processed, 11);
        assert_eq!(job.errors, 1);
        assert_eq!(job.percent(), 100);
        assert!(job.message.contains("11 processed"));

        // The failing entry stays unindexed; the rest got vectors.
        assert!(store.entry(5).await.unwrap().embedding.is_none());
        assert!(store.entry(6).await.unwrap().embedding.is_some());
    }

    #[tokio::test]
    async fn missing_provider_fails_the_job() {
        let store = Arc::new(CatalogStore::new());
        store.upsert_entry(entry(1, "App 1")).await;

        let coordinator = ReindexCoordinator::new(
            store,
            Arc::new(NoopProvider),
            Arc::new(search_engine::NoopEnricher),
        );
        let job = coordinator.run_inline(ReindexScope::Full, fast_opts()).await;

        assert_eq!(job.state, JobState::Failed);
        assert!(job.message.contains("no embedding provider"));
        assert_eq!(job.processed, 0);
    }

    #[tokio::test]
    async fn single_scope_touches_one_entry() {
        let store = Arc::new(CatalogStore::new());
        store.upsert_entry(entry(1, "App 1")).await;
        store.upsert_entry(entry(2, "App 2")).await;

        let coordinator = ReindexCoordinator::new(
            store.clone(),
            Arc::new(FlakyProvider { poison: "nope" }),
            Arc::new(search_engine::NoopEnricher),
        );
        let job = coordinator
            .run_inline(ReindexScope::Single(2), fast_opts())
            .await;

        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.total, 1);
        assert!(store.entry(2).await.unwrap().embedding.is_some());
        assert!(store.entry(1).await.unwrap().embedding.is_none());
    }

    #[tokio::test]
    async fn unknown_single_entry_fails_the_job() {
        let store = Arc::new(CatalogStore::new());
        let coordinator = ReindexCoordinator::new(
            store,
            Arc::new(FlakyProvider { poison: "nope" }),
            Arc::new(search_engine::NoopEnricher),
        );
        let job = coordinator
            .run_inline(ReindexScope::Single(404), fast_opts())
            .await;
        assert_eq!(job.state, JobState::Failed);
    }

    #[tokio::test]
    async fn fresh_cache_skips_the_crawl_unless_forced() {
        let store = Arc::new(CatalogStore::new());
        store.upsert_entry(entry(1, "App 1")).await;
        store
            .set_enrichment(1, "cached text".into(), Utc::now())
            .await
            .unwrap();

        let enricher = Arc::new(CountingEnricher::default());
        let coordinator = ReindexCoordinator::new(
            store.clone(),
            Arc::new(FlakyProvider { poison: "nope" }),
            enricher.clone(),
        );

        let opts = ReindexOptions {
            crawl: true,
            ..fast_opts()
        };
        let job = coordinator.run_inline(ReindexScope::Full, opts.clone()).await;
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.enriched, 0);
        assert_eq!(enricher.calls.load(Ordering::SeqCst), 0);

        let forced = ReindexOptions {
            force_refresh: true,
            ..opts
        };
        let job = coordinator.run_inline(ReindexScope::Full, forced).await;
        assert_eq!(job.enriched, 1);
        assert_eq!(enricher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_cache_triggers_a_refetch() {
        let store = Arc::new(CatalogStore::new());
        store.upsert_entry(entry(1, "App 1")).await;
        store
            .set_enrichment(1, "old text".into(), Utc::now() - ChronoDuration::days(90))
            .await
            .unwrap();

        let enricher = Arc::new(CountingEnricher::default());
        let coordinator = ReindexCoordinator::new(
            store.clone(),
            Arc::new(FlakyProvider { poison: "nope" }),
            enricher.clone(),
        );
        let job = coordinator
            .run_inline(
                ReindexScope::Full,
                ReindexOptions {
                    crawl: true,
                    ..fast_opts()
                },
            )
            .await;

        assert_eq!(job.enriched, 1);
        assert_eq!(enricher.calls.load(Ordering::SeqCst), 1);
        let cached = store.entry(1).await.unwrap().enrichment.unwrap();
        assert_eq!(cached.text, "crawled listing text");
    }

    #[tokio::test]
    async fn started_jobs_are_pollable_and_unknown_ids_are_not_found() {
        let store = Arc::new(CatalogStore::new());
        store.upsert_entry(entry(1, "App 1")).await;

        let coordinator = ReindexCoordinator::new(
            store,
            Arc::new(FlakyProvider { poison: "nope" }),
            Arc::new(search_engine::NoopEnricher),
        );
        let id = coordinator.start(ReindexScope::Full, fast_opts()).await;

        // The job reaches a terminal state shortly; poll until it does.
        let mut state = JobState::Pending;
        for _ in 0..100 {
            if let Some(job) = coordinator.status(id).await {
                state = job.state;
                if state == JobState::Completed || state == JobState::Failed {
                    break;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(state, JobState::Completed);

        assert!(coordinator.status(uuid::Uuid::new_v4()).await.is_none());
        assert_eq!(coordinator.jobs().await.len(), 1);
    }
}
