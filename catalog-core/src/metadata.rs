//! Dynamic metadata model: admin-defined filter dimensions.
//!
//! Three levels: [`MetadataType`] (a filter dimension such as
//! "narration-style") → [`MetadataOption`] (one selectable value such as
//! "hafs") → assignment rows linking entries to options. New filterable
//! facets are added at runtime by inserting rows, never by code changes.

use serde::{Deserialize, Serialize};

/// A named, versionable filter dimension.
///
/// `name` is the slug used as the query-parameter key. An inactive type is
/// invisible to both filtering and facet computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataType {
    pub id: i64,
    /// Slug-like unique name, e.g. `narration-style`.
    pub name: String,
    pub label_en: String,
    pub label_ar: String,
    /// Whether an entry may hold multiple values of this type.
    #[serde(default)]
    pub multi_valued: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// One selectable value within a [`MetadataType`].
///
/// `(type_id, value)` pairs are unique; the same value string may exist
/// under different types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataOption {
    pub id: i64,
    pub type_id: i64,
    /// Slug-like value unique within its type, e.g. `hafs`.
    pub value: String,
    pub label_en: String,
    pub label_ar: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub sort_order: i32,
    /// Optional UI hints.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

fn default_true() -> bool {
    true
}
