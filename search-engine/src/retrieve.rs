//! Hybrid retrieval: metadata pre-filtering, vector ranking, boosts,
//! rerank splice, facets, pagination.
//!
//! The whole path is synchronous per request and stateless; concurrent
//! queries share only the read-only store snapshots. Provider degradation
//! never produces an error here: an unavailable embedding yields an empty,
//! well-formed page.

use std::collections::HashMap;

use catalog_core::{CatalogEntry, CatalogStore, Platform};
use serde::Serialize;
use tracing::{debug, trace};

use crate::boost::{MatchReason, boost_for_query};
use crate::errors::SearchError;
use crate::facets::{FacetEntry, FacetMap, compute_facets};
use crate::provider::{EmbedOutcome, SemanticProvider, embed_or_unavailable};
use crate::rerank::{RerankCandidate, rerank};

/// Engine-level bounds; fixed at construction.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Candidate pool size when the request does not specify one.
    pub default_limit: usize,
    /// Hard cap on the candidate pool.
    pub max_limit: usize,
    /// Hard cap on how many candidates go to the reranker.
    pub rerank_cap: usize,
    /// Bounded sample size for facet computation.
    pub facet_population_cap: usize,
    /// Length of the summary excerpt sent to the reranker.
    pub excerpt_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 100,
            rerank_cap: 20,
            facet_population_cap: 500,
            excerpt_chars: 160,
        }
    }
}

/// One search invocation.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    /// Metadata-type name → comma-separated option values.
    pub filters: HashMap<String, String>,
    pub platform: Option<Platform>,
    pub category_id: Option<i64>,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    /// Candidate pool override, clamped to the engine cap.
    pub limit: Option<usize>,
    pub with_facets: bool,
    pub with_boost: bool,
    pub with_rerank: bool,
    pub rerank_top_k: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: HashMap::new(),
            platform: None,
            category_id: None,
            page: 1,
            page_size: 10,
            limit: None,
            with_facets: false,
            with_boost: true,
            with_rerank: false,
            rerank_top_k: 10,
        }
    }
}

/// A catalog entry decorated for the lifetime of one query. The decorations
/// never flow back into storage.
#[derive(Debug, Clone, Serialize)]
pub struct SearchCandidate {
    pub entry: CatalogEntry,
    /// Cosine distance to the query embedding (lower is closer).
    pub distance: f32,
    /// Boost multiplier from metadata keyword overlap.
    pub boost: f32,
    /// Combined relevance score: `(1 - distance) * boost`.
    pub score: f32,
    pub match_reasons: Vec<MatchReason>,
    pub rerank_reasoning: Option<String>,
}

/// Paginated, facet-annotated result set.
#[derive(Debug, Serialize)]
pub struct SearchPage {
    pub results: Vec<SearchCandidate>,
    pub page: usize,
    pub page_size: usize,
    /// Size of the full ordered candidate list, before pagination.
    pub total: usize,
    pub facets: Option<FacetMap>,
}

impl SearchPage {
    fn empty(page: usize, page_size: usize) -> Self {
        Self {
            results: Vec::new(),
            page,
            page_size,
            total: 0,
            facets: None,
        }
    }
}

/// Executes the full retrieval pipeline.
///
/// # Errors
/// Returns store errors only; provider failures degrade per the fail-open
/// contract instead of erroring.
pub async fn search(
    cfg: &SearchConfig,
    store: &CatalogStore,
    provider: &dyn SemanticProvider,
    req: &SearchRequest,
) -> Result<SearchPage, SearchError> {
    let page = req.page.max(1);
    let page_size = req.page_size.clamp(1, 100);

    // 1. Query embedding; unavailable → empty page, not a 500.
    let EmbedOutcome::Vector(query_vec) = embed_or_unavailable(provider, &req.query).await else {
        return Ok(SearchPage::empty(page, page_size));
    };

    // 2. Base candidate set: published entries narrowed by resolved
    //    metadata filters plus direct platform/category filters.
    let registry = store.metadata_registry().await;
    let resolved = registry.resolve(&req.filters);

    let mut filtered = store.published_entries().await;
    if let Some(platform) = req.platform {
        filtered.retain(|e| e.platform == platform);
    }
    if let Some(category_id) = req.category_id {
        filtered.retain(|e| e.category_ids.contains(&category_id));
    }
    for tf in &resolved.per_type {
        let holders = store.entries_holding_any(&tf.option_ids).await;
        filtered.retain(|e| holders.contains(&e.id));
    }
    trace!(filtered = filtered.len(), filters = resolved.per_type.len(), "pre-filter done");

    // 3. Vector ranking, ascending distance, bounded pool.
    let limit = req.limit.unwrap_or(cfg.default_limit).clamp(1, cfg.max_limit);
    let mut ranked: Vec<SearchCandidate> = filtered
        .iter()
        .filter_map(|e| {
            let embedding = e.embedding.as_ref()?;
            let distance = 1.0 - cosine(&query_vec, embedding);
            Some(SearchCandidate {
                entry: e.clone(),
                distance,
                boost: 1.0,
                score: 1.0 - distance,
                match_reasons: Vec::new(),
                rerank_reasoning: None,
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.entry.id.cmp(&b.entry.id))
    });
    ranked.truncate(limit);

    // 4. Keyword boosts, then re-sort by combined score. The explicit
    //    (score, distance, id) key keeps ties deterministic.
    if req.with_boost && !ranked.is_empty() {
        let ids: Vec<i64> = ranked.iter().map(|c| c.entry.id).collect();
        let options = store.active_options_by_entry(&ids).await;
        for c in &mut ranked {
            if let Some(pairs) = options.get(&c.entry.id) {
                let boost = boost_for_query(&req.query, pairs);
                c.boost = boost.multiplier;
                c.match_reasons = boost.reasons;
                c.score = (1.0 - c.distance) * c.boost;
            }
        }
        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.distance.total_cmp(&b.distance))
                .then_with(|| a.entry.id.cmp(&b.entry.id))
        });
    }

    // 5. Rerank the top K and splice the returned order back in front;
    //    everything else keeps its prior relative order.
    if req.with_rerank && provider.available() && !ranked.is_empty() {
        let k = req.rerank_top_k.clamp(1, cfg.rerank_cap).min(ranked.len());
        let rerank_input: Vec<RerankCandidate> = ranked[..k]
            .iter()
            .map(|c| RerankCandidate {
                id: c.entry.id,
                name: c.entry.name_en.clone(),
                excerpt: c.entry.summary_en.chars().take(cfg.excerpt_chars).collect(),
            })
            .collect();
        let order = rerank(provider, &req.query, &rerank_input).await;

        let prior_order: Vec<i64> = ranked.iter().map(|c| c.entry.id).collect();
        let mut by_id: HashMap<i64, SearchCandidate> =
            ranked.drain(..).map(|c| (c.entry.id, c)).collect();

        let mut spliced = Vec::with_capacity(by_id.len());
        for item in &order {
            if let Some(mut c) = by_id.remove(&item.id) {
                c.rerank_reasoning = item.reasoning.clone();
                spliced.push(c);
            }
        }
        for id in prior_order {
            if let Some(c) = by_id.remove(&id) {
                spliced.push(c);
            }
        }
        ranked = spliced;
    }

    // 6. Facets over the filtered-but-pre-limit population, bounded.
    let facets = if req.with_facets {
        let population: Vec<&CatalogEntry> =
            filtered.iter().take(cfg.facet_population_cap).collect();
        let ids: Vec<i64> = population.iter().map(|e| e.id).collect();
        let mut options = store.active_options_by_entry(&ids).await;
        let members: Vec<FacetEntry> = population
            .iter()
            .map(|e| FacetEntry {
                entry_id: e.id,
                platform: e.platform,
                metadata: options.remove(&e.id).unwrap_or_default(),
            })
            .collect();
        Some(compute_facets(&registry, &members))
    } else {
        None
    };

    // 7. Paginate.
    let total = ranked.len();
    let start = (page - 1) * page_size;
    let results: Vec<SearchCandidate> = ranked.into_iter().skip(start).take(page_size).collect();

    debug!(total, page, returned = results.len(), "search done");
    Ok(SearchPage {
        results,
        page,
        page_size,
        total,
        facets,
    })
}

/// Cosine similarity over the shared prefix of two vectors.
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    let len = a.len().min(b.len());
    for i in 0..len {
        dot += a[i] * b[i];
        na += a[i] * a[i];
        nb += b[i] * b[i];
    }
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}
