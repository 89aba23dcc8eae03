//! In-process catalog repository.
//!
//! Stands in for the relational tables of the directory. Tables live behind
//! `tokio::sync::RwLock` maps; reads hand out cloned snapshots so the query
//! path never holds a lock across await points. The search engine is
//! read-only here except for the two narrow writes it owns: the embedding
//! vector and the enrichment cache.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::entry::{Category, CatalogEntry};
use crate::errors::CatalogError;
use crate::metadata::{MetadataOption, MetadataType};
use crate::registry::MetadataRegistry;

/// Process-local repository for catalog entities.
#[derive(Default)]
pub struct CatalogStore {
    entries: RwLock<HashMap<i64, CatalogEntry>>,
    categories: RwLock<HashMap<i64, Category>>,
    metadata_types: RwLock<HashMap<i64, MetadataType>>,
    metadata_options: RwLock<HashMap<i64, MetadataOption>>,
    /// `(entry_id, option_id)` assignment rows; the set enforces uniqueness.
    assignments: RwLock<HashSet<(i64, i64)>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /* --------------------- entries --------------------- */

    /// Returns a snapshot of one entry.
    pub async fn entry(&self, id: i64) -> Option<CatalogEntry> {
        self.entries.read().await.get(&id).cloned()
    }

    /// Inserts or replaces an entry.
    pub async fn upsert_entry(&self, entry: CatalogEntry) {
        self.entries.write().await.insert(entry.id, entry);
    }

    /// Removes an entry; its assignment rows cascade away.
    pub async fn remove_entry(&self, id: i64) {
        self.entries.write().await.remove(&id);
        self.assignments.write().await.retain(|(e, _)| *e != id);
    }

    /// All entries in a publishable lifecycle state.
    pub async fn published_entries(&self) -> Vec<CatalogEntry> {
        let mut list: Vec<CatalogEntry> = self
            .entries
            .read()
            .await
            .values()
            .filter(|e| e.is_published())
            .cloned()
            .collect();
        list.sort_by_key(|e| e.id);
        list
    }

    /// Ids of all published entries, ascending.
    pub async fn published_entry_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .entries
            .read()
            .await
            .values()
            .filter(|e| e.is_published())
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Writes the embedding vector of one entry. The only vector write path.
    ///
    /// # Errors
    /// Returns [`CatalogError::UnknownEntry`] if the entry does not exist.
    pub async fn set_embedding(&self, id: i64, vector: Vec<f32>) -> Result<(), CatalogError> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(&id).ok_or(CatalogError::UnknownEntry(id))?;
        entry.embedding = Some(vector);
        Ok(())
    }

    /// Writes the cached enrichment payload of one entry.
    ///
    /// # Errors
    /// Returns [`CatalogError::UnknownEntry`] if the entry does not exist.
    pub async fn set_enrichment(
        &self,
        id: i64,
        text: String,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(&id).ok_or(CatalogError::UnknownEntry(id))?;
        entry.enrichment = Some(crate::entry::EnrichmentCache { text, fetched_at });
        Ok(())
    }

    /* --------------------- categories --------------------- */

    pub async fn upsert_category(&self, category: Category) {
        self.categories.write().await.insert(category.id, category);
    }

    pub async fn category(&self, id: i64) -> Option<Category> {
        self.categories.read().await.get(&id).cloned()
    }

    /// Snapshot of the categories referenced by the given ids, input order.
    pub async fn categories_by_ids(&self, ids: &[i64]) -> Vec<Category> {
        let categories = self.categories.read().await;
        ids.iter().filter_map(|id| categories.get(id).cloned()).collect()
    }

    /* --------------------- metadata schema --------------------- */

    pub async fn upsert_metadata_type(&self, ty: MetadataType) {
        self.metadata_types.write().await.insert(ty.id, ty);
    }

    /// Inserts or replaces an option, enforcing `(type, value)` uniqueness.
    ///
    /// # Errors
    /// - [`CatalogError::UnknownType`] if the parent type does not exist
    /// - [`CatalogError::DuplicateOptionValue`] if another option of the same
    ///   type already carries this value
    pub async fn upsert_metadata_option(&self, option: MetadataOption) -> Result<(), CatalogError> {
        if !self.metadata_types.read().await.contains_key(&option.type_id) {
            return Err(CatalogError::UnknownType(option.type_id));
        }
        let mut options = self.metadata_options.write().await;
        let clash = options.values().any(|o| {
            o.id != option.id
                && o.type_id == option.type_id
                && o.value.eq_ignore_ascii_case(&option.value)
        });
        if clash {
            return Err(CatalogError::DuplicateOptionValue {
                type_id: option.type_id,
                value: option.value,
            });
        }
        options.insert(option.id, option);
        Ok(())
    }

    /// Removes an option; its assignment rows cascade away.
    pub async fn remove_metadata_option(&self, id: i64) {
        self.metadata_options.write().await.remove(&id);
        self.assignments.write().await.retain(|(_, o)| *o != id);
    }

    /// Builds the active-schema snapshot used by filtering, facets, and
    /// document composition.
    pub async fn metadata_registry(&self) -> MetadataRegistry {
        let types: Vec<MetadataType> = self.metadata_types.read().await.values().cloned().collect();
        let options: Vec<MetadataOption> =
            self.metadata_options.read().await.values().cloned().collect();
        MetadataRegistry::new(types, options)
    }

    /* --------------------- assignments --------------------- */

    /// Tags an entry with an option. Idempotent: assigning the same pair
    /// twice is a no-op, not an error. Returns whether a new row was created.
    ///
    /// # Errors
    /// - [`CatalogError::UnknownEntry`] / [`CatalogError::UnknownOption`] for
    ///   dangling references.
    pub async fn assign_metadata(&self, entry_id: i64, option_id: i64) -> Result<bool, CatalogError> {
        if !self.entries.read().await.contains_key(&entry_id) {
            return Err(CatalogError::UnknownEntry(entry_id));
        }
        if !self.metadata_options.read().await.contains_key(&option_id) {
            return Err(CatalogError::UnknownOption(option_id));
        }
        let inserted = self.assignments.write().await.insert((entry_id, option_id));
        if !inserted {
            debug!(entry_id, option_id, "metadata assignment already present");
        }
        Ok(inserted)
    }

    /// Removes one assignment row if present.
    pub async fn unassign_metadata(&self, entry_id: i64, option_id: i64) -> bool {
        self.assignments.write().await.remove(&(entry_id, option_id))
    }

    /// Number of assignment rows (test/diagnostic aid).
    pub async fn assignment_count(&self) -> usize {
        self.assignments.read().await.len()
    }

    /// Options held by one entry, with their parent types, restricted to the
    /// active schema, in admin sort order.
    pub async fn active_options_for_entry(&self, entry_id: i64) -> Vec<(MetadataType, MetadataOption)> {
        let assignments = self.assignments.read().await;
        let options = self.metadata_options.read().await;
        let types = self.metadata_types.read().await;

        let mut out: Vec<(MetadataType, MetadataOption)> = assignments
            .iter()
            .filter(|(e, _)| *e == entry_id)
            .filter_map(|(_, o)| options.get(o))
            .filter(|o| o.active)
            .filter_map(|o| {
                types
                    .get(&o.type_id)
                    .filter(|t| t.active)
                    .map(|t| (t.clone(), o.clone()))
            })
            .collect();
        out.sort_by_key(|(t, o)| (t.sort_order, t.id, o.sort_order, o.id));
        out
    }

    /// Bulk variant of [`Self::active_options_for_entry`] for a set of
    /// entries, taking the table locks once.
    pub async fn active_options_by_entry(
        &self,
        entry_ids: &[i64],
    ) -> HashMap<i64, Vec<(MetadataType, MetadataOption)>> {
        let wanted: HashSet<i64> = entry_ids.iter().copied().collect();
        let assignments = self.assignments.read().await;
        let options = self.metadata_options.read().await;
        let types = self.metadata_types.read().await;

        let mut out: HashMap<i64, Vec<(MetadataType, MetadataOption)>> = HashMap::new();
        for (entry_id, option_id) in assignments.iter() {
            if !wanted.contains(entry_id) {
                continue;
            }
            let Some(opt) = options.get(option_id).filter(|o| o.active) else {
                continue;
            };
            let Some(ty) = types.get(&opt.type_id).filter(|t| t.active) else {
                continue;
            };
            out.entry(*entry_id).or_default().push((ty.clone(), opt.clone()));
        }
        for pairs in out.values_mut() {
            pairs.sort_by_key(|(t, o)| (t.sort_order, t.id, o.sort_order, o.id));
        }
        out
    }

    /// Semi-join: ids of entries holding **any** of the given options.
    ///
    /// The returned set is deduplicated, so multi-valued matches never
    /// multiply row counts.
    pub async fn entries_holding_any(&self, option_ids: &HashSet<i64>) -> HashSet<i64> {
        self.assignments
            .read()
            .await
            .iter()
            .filter(|(_, o)| option_ids.contains(o))
            .map(|(e, _)| *e)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Developer, EntryStatus, Platform};

    fn entry(id: i64) -> CatalogEntry {
        CatalogEntry {
            id,
            name_en: format!("App {id}"),
            name_ar: format!("تطبيق {id}"),
            summary_en: String::new(),
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

    async fn store_with_schema() -> CatalogStore {
        let store = CatalogStore::new();
        store
            .upsert_metadata_type(MetadataType {
                id: 1,
                name: "narration-style".into(),
                label_en: "Narration style".into(),
                label_ar: "نوع الرواية".into(),
                multi_valued: true,
                active: true,
                sort_order: 0,
            })
            .await;
        for (id, value) in [(10, "hafs"), (11, "warsh")] {
            store
                .upsert_metadata_option(MetadataOption {
                    id,
                    type_id: 1,
                    value: value.into(),
                    label_en: value.into(),
                    label_ar: value.into(),
                    active: true,
                    sort_order: 0,
                    color: None,
                    icon: None,
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn assignment_is_idempotent() {
        let store = store_with_schema().await;
        store.upsert_entry(entry(1)).await;

        assert!(store.assign_metadata(1, 10).await.unwrap());
        assert!(!store.assign_metadata(1, 10).await.unwrap());
        assert_eq!(store.assignment_count().await, 1);
    }

    #[tokio::test]
    async fn duplicate_option_value_is_rejected() {
        let store = store_with_schema().await;
        let err = store
            .upsert_metadata_option(MetadataOption {
                id: 99,
                type_id: 1,
                value: "HAFS".into(),
                label_en: "x".into(),
                label_ar: "x".into(),
                active: true,
                sort_order: 0,
                color: None,
                icon: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateOptionValue { .. }));
    }

    #[tokio::test]
    async fn semi_join_deduplicates_multi_valued_matches() {
        let store = store_with_schema().await;
        for id in [1, 2, 3] {
            store.upsert_entry(entry(id)).await;
        }
        // Entry 1 holds both values, entry 3 one, entry 2 none.
        store.assign_metadata(1, 10).await.unwrap();
        store.assign_metadata(1, 11).await.unwrap();
        store.assign_metadata(3, 11).await.unwrap();

        let hits = store.entries_holding_any(&HashSet::from([10, 11])).await;
        assert_eq!(hits, HashSet::from([1, 3]));
    }

    #[tokio::test]
    async fn removing_an_entry_cascades_assignments() {
        let store = store_with_schema().await;
        store.upsert_entry(entry(1)).await;
        store.assign_metadata(1, 10).await.unwrap();

        store.remove_entry(1).await;
        assert_eq!(store.assignment_count().await, 0);
    }

    #[tokio::test]
    async fn embedding_write_targets_only_the_entry_vector() {
        let store = store_with_schema().await;
        store.upsert_entry(entry(1)).await;

        store.set_embedding(1, vec![0.1, 0.2]).await.unwrap();
        let e = store.entry(1).await.unwrap();
        assert_eq!(e.embedding.as_deref(), Some(&[0.1, 0.2][..]));

        assert!(matches!(
            store.set_embedding(404, vec![]).await,
            Err(CatalogError::UnknownEntry(404))
        ));
    }
}
