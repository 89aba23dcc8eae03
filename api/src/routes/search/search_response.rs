use search_engine::{FacetMap, MatchReason, SearchCandidate, SearchPage};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<FacetMap>,
}

/// One result row: public entry fields plus relevance annotations. The
/// embedding vector and other operational fields never leave the server.
#[derive(Debug, Serialize)]
pub struct SearchResultItem {
    pub id: i64,
    pub name_en: String,
    pub name_ar: String,
    pub summary_en: String,
    pub summary_ar: String,
    pub platform: String,
    pub rating: f32,
    pub score: f32,
    pub distance: f32,
    pub boost: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub match_reasons: Vec<MatchReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_reasoning: Option<String>,
}

impl From<SearchPage> for SearchResponse {
    fn from(page: SearchPage) -> Self {
        Self {
            results: page.results.into_iter().map(SearchResultItem::from).collect(),
            page: page.page,
            page_size: page.page_size,
            total: page.total,
            facets: page.facets,
        }
    }
}

impl From<SearchCandidate> for SearchResultItem {
    fn from(c: SearchCandidate) -> Self {
        Self {
            id: c.entry.id,
            name_en: c.entry.name_en,
            name_ar: c.entry.name_ar,
            summary_en: c.entry.summary_en,
            summary_ar: c.entry.summary_ar,
            platform: c.entry.platform.as_str().to_string(),
            rating: c.entry.rating,
            score: c.score,
            distance: c.distance,
            boost: c.boost,
            match_reasons: c.match_reasons,
            rerank_reasoning: c.rerank_reasoning,
        }
    }
}
