use std::collections::HashMap;

use catalog_core::Platform;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct SearchRequestBody {
    pub query: String,
    /// Metadata-type name → comma-separated option values.
    #[serde(default)]
    pub filters: HashMap<String, String>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub facets: Option<bool>,
    #[serde(default)]
    pub boost: Option<bool>,
    #[serde(default)]
    pub rerank: Option<bool>,
    #[serde(default)]
    pub rerank_top_k: Option<usize>,
}
