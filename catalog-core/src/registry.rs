//! Active-metadata registry and filter resolution.
//!
//! The registry is a snapshot of the currently **active** metadata types and
//! their active options, loaded once per request. Filter resolution is a pure
//! function of `(registry, raw filter map)`: raw query parameters go in,
//! option-id sets come out, and everything unknown or inactive is silently
//! dropped so stale links never produce confusing empty results.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::metadata::{MetadataOption, MetadataType};

/// One active type with its active options, keyed by lowercase value.
#[derive(Debug, Clone)]
pub struct RegistryType {
    pub ty: MetadataType,
    pub options: HashMap<String, MetadataOption>,
}

/// Snapshot of active metadata types keyed by their slug name.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    types: HashMap<String, RegistryType>,
}

impl MetadataRegistry {
    /// Builds a registry from active types and their active options.
    ///
    /// Inactive types and inactive options are excluded here once, so every
    /// consumer (filtering, facets, composition) sees the same world.
    pub fn new(types: Vec<MetadataType>, options: Vec<MetadataOption>) -> Self {
        let mut by_type: HashMap<i64, HashMap<String, MetadataOption>> = HashMap::new();
        for opt in options.into_iter().filter(|o| o.active) {
            by_type
                .entry(opt.type_id)
                .or_default()
                .insert(opt.value.to_lowercase(), opt);
        }

        let mut map = HashMap::new();
        for ty in types.into_iter().filter(|t| t.active) {
            let options = by_type.remove(&ty.id).unwrap_or_default();
            map.insert(ty.name.clone(), RegistryType { ty, options });
        }

        Self { types: map }
    }

    /// Active types in admin sort order.
    pub fn types_sorted(&self) -> Vec<&RegistryType> {
        let mut list: Vec<&RegistryType> = self.types.values().collect();
        list.sort_by_key(|rt| (rt.ty.sort_order, rt.ty.id));
        list
    }

    /// Looks up an active type by its slug name.
    pub fn get(&self, name: &str) -> Option<&RegistryType> {
        self.types.get(name)
    }

    /// Resolves a raw filter map (`type-name` → comma-separated values) into
    /// per-type option-id sets.
    ///
    /// - keys not naming an active type are ignored,
    /// - values are trimmed and matched case-insensitively,
    /// - empty/whitespace-only filter values are ignored,
    /// - several values of one type combine with OR downstream.
    pub fn resolve(&self, raw: &HashMap<String, String>) -> ResolvedFilters {
        let mut per_type = Vec::new();

        for (key, csv) in raw {
            if csv.trim().is_empty() {
                continue;
            }
            let Some(rt) = self.types.get(key.trim()) else {
                debug!(key = %key, "filter key is not an active metadata type; ignored");
                continue;
            };

            let mut option_ids = HashSet::new();
            for token in csv.split(',') {
                let token = token.trim().to_lowercase();
                if token.is_empty() {
                    continue;
                }
                match rt.options.get(&token) {
                    Some(opt) => {
                        option_ids.insert(opt.id);
                    }
                    None => {
                        debug!(key = %key, value = %token, "unknown option value in filter");
                    }
                }
            }

            per_type.push(TypeFilter {
                type_id: rt.ty.id,
                type_name: rt.ty.name.clone(),
                option_ids,
            });
        }

        ResolvedFilters { per_type }
    }
}

/// Requested options of a single metadata type (OR semantics within).
#[derive(Debug, Clone)]
pub struct TypeFilter {
    pub type_id: i64,
    pub type_name: String,
    pub option_ids: HashSet<i64>,
}

/// All resolved per-type filters (AND semantics across).
#[derive(Debug, Clone, Default)]
pub struct ResolvedFilters {
    pub per_type: Vec<TypeFilter>,
}

impl ResolvedFilters {
    /// True when no filter survived resolution (filtering is a no-op).
    pub fn is_empty(&self) -> bool {
        self.per_type.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(id: i64, name: &str, active: bool) -> MetadataType {
        MetadataType {
            id,
            name: name.into(),
            label_en: name.into(),
            label_ar: format!("{name}-ar"),
            multi_valued: true,
            active,
            sort_order: 0,
        }
    }

    fn opt(id: i64, type_id: i64, value: &str) -> MetadataOption {
        MetadataOption {
            id,
            type_id,
            value: value.into(),
            label_en: value.into(),
            label_ar: format!("{value}-ar"),
            active: true,
            sort_order: 0,
            color: None,
            icon: None,
        }
    }

    fn registry() -> MetadataRegistry {
        MetadataRegistry::new(
            vec![ty(1, "narration-style", true), ty(2, "features", true), ty(3, "old", false)],
            vec![opt(10, 1, "hafs"), opt(11, 1, "warsh"), opt(20, 2, "offline"), opt(30, 3, "x")],
        )
    }

    #[test]
    fn inactive_types_are_invisible() {
        let reg = registry();
        assert!(reg.get("old").is_none());
        let raw = HashMap::from([("old".to_string(), "x".to_string())]);
        assert!(reg.resolve(&raw).is_empty());
    }

    #[test]
    fn unknown_keys_and_blank_values_are_ignored() {
        let reg = registry();
        let raw = HashMap::from([
            ("bogus".to_string(), "hafs".to_string()),
            ("features".to_string(), "   ".to_string()),
        ]);
        assert!(reg.resolve(&raw).is_empty());
    }

    #[test]
    fn csv_values_resolve_case_insensitively_with_or_semantics() {
        let reg = registry();
        let raw = HashMap::from([("narration-style".to_string(), " Hafs , WARSH ".to_string())]);
        let resolved = reg.resolve(&raw);
        assert_eq!(resolved.per_type.len(), 1);
        let tf = &resolved.per_type[0];
        assert_eq!(tf.type_id, 1);
        assert_eq!(tf.option_ids, HashSet::from([10, 11]));
    }

    #[test]
    fn unknown_values_do_not_resolve() {
        let reg = registry();
        let raw = HashMap::from([("features".to_string(), "offline,nope".to_string())]);
        let resolved = reg.resolve(&raw);
        assert_eq!(resolved.per_type[0].option_ids, HashSet::from([20]));
    }
}
