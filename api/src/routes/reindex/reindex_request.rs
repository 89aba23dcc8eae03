use serde::Deserialize;

#[derive(Deserialize)]
pub struct ReindexRequestBody {
    /// Reindex one entry; absent means the full catalog.
    #[serde(default)]
    pub entry_id: Option<i64>,
    /// Fetch/refresh enrichment text while indexing.
    #[serde(default)]
    pub crawl: Option<bool>,
    /// Refetch enrichment even when a fresh cache exists.
    #[serde(default)]
    pub refresh: Option<bool>,
    /// Skip full descriptions and enrichment for a faster pass.
    #[serde(default)]
    pub quick: Option<bool>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub staleness_days: Option<i64>,
}
