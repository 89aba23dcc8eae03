//! Facet computation over the filtered candidate population.
//!
//! Facets describe "what else you could filter by": per active metadata
//! type, how many distinct entries of the population hold each option.
//! They are informational only and never restrict the result set.

use std::collections::{BTreeMap, HashMap, HashSet};

use catalog_core::{MetadataOption, MetadataRegistry, MetadataType, Platform};
use serde::Serialize;

/// One countable option within a facet dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetValue {
    pub value: String,
    pub label_en: String,
    pub label_ar: String,
    pub count: usize,
}

/// Facet dimensions keyed by metadata-type name (plus `"platform"`).
pub type FacetMap = BTreeMap<String, Vec<FacetValue>>;

/// One population member with its resolved metadata values.
#[derive(Debug)]
pub struct FacetEntry {
    pub entry_id: i64,
    pub platform: Platform,
    pub metadata: Vec<(MetadataType, MetadataOption)>,
}

/// Computes option counts per active metadata type, emitting only options
/// with count > 0, in admin sort order. A platform facet is computed the
/// same way.
pub fn compute_facets(registry: &MetadataRegistry, population: &[FacetEntry]) -> FacetMap {
    // Distinct entries per option id.
    let mut holders: HashMap<i64, HashSet<i64>> = HashMap::new();
    for member in population {
        for (_, opt) in &member.metadata {
            holders.entry(opt.id).or_default().insert(member.entry_id);
        }
    }

    let mut facets = FacetMap::new();

    for rt in registry.types_sorted() {
        let mut options: Vec<&MetadataOption> = rt.options.values().collect();
        options.sort_by_key(|o| (o.sort_order, o.id));

        let values: Vec<FacetValue> = options
            .into_iter()
            .filter_map(|opt| {
                let count = holders.get(&opt.id).map_or(0, HashSet::len);
                (count > 0).then(|| FacetValue {
                    value: opt.value.clone(),
                    label_en: opt.label_en.clone(),
                    label_ar: opt.label_ar.clone(),
                    count,
                })
            })
            .collect();

        if !values.is_empty() {
            facets.insert(rt.ty.name.clone(), values);
        }
    }

    let platform_values = platform_facet(population);
    if !platform_values.is_empty() {
        facets.insert("platform".to_string(), platform_values);
    }

    facets
}

fn platform_facet(population: &[FacetEntry]) -> Vec<FacetValue> {
    let mut counts: HashMap<Platform, usize> = HashMap::new();
    for member in population {
        *counts.entry(member.platform).or_default() += 1;
    }

    [Platform::Android, Platform::Ios, Platform::Both, Platform::Web]
        .into_iter()
        .filter_map(|p| {
            let count = counts.get(&p).copied().unwrap_or(0);
            (count > 0).then(|| FacetValue {
                value: p.as_str().to_string(),
                label_en: platform_label_en(p).to_string(),
                label_ar: platform_label_ar(p).to_string(),
                count,
            })
        })
        .collect()
}

fn platform_label_en(p: Platform) -> &'static str {
    match p {
        Platform::Android => "Android",
        Platform::Ios => "iOS",
        Platform::Both => "Android & iOS",
        Platform::Web => "Web",
    }
}

fn platform_label_ar(p: Platform) -> &'static str {
    match p {
        Platform::Android => "أندرويد",
        Platform::Ios => "آي أو إس",
        Platform::Both => "أندرويد وآي أو إس",
        Platform::Web => "ويب",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(id: i64, name: &str) -> MetadataType {
        MetadataType {
            id,
            name: name.into(),
            label_en: name.into(),
            label_ar: format!("{name}-ar"),
            multi_valued: true,
            active: true,
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

    #[test]
    fn zero_count_options_are_omitted() {
        let registry = MetadataRegistry::new(
            vec![ty(1, "features")],
            vec![opt(10, 1, "audio"), opt(11, 1, "offline")],
        );

        // Five entries; "audio" held by three, "offline" by none.
        let population: Vec<FacetEntry> = (1..=5)
            .map(|entry_id| FacetEntry {
                entry_id,
                platform: Platform::Android,
                metadata: if entry_id <= 3 {
                    vec![(ty(1, "features"), opt(10, 1, "audio"))]
                } else {
                    vec![]
                },
            })
            .collect();

        let facets = compute_facets(&registry, &population);
        let features = &facets["features"];
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].value, "audio");
        assert_eq!(features[0].count, 3);
    }

    #[test]
    fn counts_are_per_distinct_entry() {
        let registry = MetadataRegistry::new(vec![ty(1, "features")], vec![opt(10, 1, "audio")]);
        // The same entry appearing with the same option twice counts once.
        let population = vec![
            FacetEntry {
                entry_id: 1,
                platform: Platform::Ios,
                metadata: vec![
                    (ty(1, "features"), opt(10, 1, "audio")),
                    (ty(1, "features"), opt(10, 1, "audio")),
                ],
            },
        ];
        let facets = compute_facets(&registry, &population);
        assert_eq!(facets["features"][0].count, 1);
    }

    #[test]
    fn platform_facet_counts_population_members() {
        let registry = MetadataRegistry::new(vec![], vec![]);
        let population = vec![
            FacetEntry { entry_id: 1, platform: Platform::Android, metadata: vec![] },
            FacetEntry { entry_id: 2, platform: Platform::Android, metadata: vec![] },
            FacetEntry { entry_id: 3, platform: Platform::Ios, metadata: vec![] },
        ];
        let facets = compute_facets(&registry, &population);
        let platforms = &facets["platform"];
        assert_eq!(platforms[0].value, "android");
        assert_eq!(platforms[0].count, 2);
        assert_eq!(platforms[1].value, "ios");
        assert_eq!(platforms[1].count, 1);
    }
}
