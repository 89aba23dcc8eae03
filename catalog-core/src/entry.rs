//! Catalog entry model: the searchable unit of the directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Distribution platform of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Android,
    Ios,
    /// Published on both mobile stores.
    Both,
    Web,
}

impl Platform {
    /// Stable lowercase name used as a facet value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Both => "both",
            Self::Web => "web",
        }
    }
}

/// Lifecycle state of an entry. Only `Published` entries are searchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Draft,
    Pending,
    Published,
    Archived,
}

/// Developer reference embedded in an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Developer {
    pub name_en: String,
    pub name_ar: String,
    /// Set through the admin verification workflow.
    #[serde(default)]
    pub verified: bool,
}

/// Cached enrichment text crawled from an external listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentCache {
    pub text: String,
    pub fetched_at: DateTime<Utc>,
}

impl EnrichmentCache {
    /// Whether the cache is older than `threshold_days`.
    pub fn is_stale(&self, threshold_days: i64, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at).num_days() >= threshold_days
    }
}

/// A browsing category with bilingual names and descriptions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name_en: String,
    pub name_ar: String,
    #[serde(default)]
    pub description_en: String,
    #[serde(default)]
    pub description_ar: String,
}

/// One searchable item in the directory.
///
/// Owned by the catalog subsystem; the search engine reads these fields and
/// writes only `embedding` and `enrichment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,

    pub name_en: String,
    pub name_ar: String,

    /// Short description, always indexed untruncated.
    #[serde(default)]
    pub summary_en: String,
    #[serde(default)]
    pub summary_ar: String,

    /// Full description, indexed only in complete-composition mode.
    #[serde(default)]
    pub description_en: String,
    #[serde(default)]
    pub description_ar: String,

    #[serde(default)]
    pub category_ids: Vec<i64>,
    #[serde(default)]
    pub developer: Developer,
    pub platform: Platform,

    #[serde(default)]
    pub play_store_url: Option<String>,
    #[serde(default)]
    pub app_store_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,

    /// Average review rating, 0.0..=5.0.
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub view_count: u64,

    pub status: EntryStatus,
    #[serde(default)]
    pub featured: bool,

    /// Dense vector, absent until the first reindex touches the entry.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub enrichment: Option<EnrichmentCache>,
}

impl CatalogEntry {
    /// Whether the entry is in a publishable lifecycle state.
    pub fn is_published(&self) -> bool {
        self.status == EntryStatus::Published
    }
}
