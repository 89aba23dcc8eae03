//! Heuristic ranking boosts from query/metadata keyword overlap.

use catalog_core::{MetadataOption, MetadataType};
use serde::Serialize;

/// Fixed increment added per matched metadata value.
pub const BOOST_INCREMENT: f32 = 0.15;

/// Ceiling for the final multiplier; entries with many tagged values must
/// not dominate purely on metadata breadth.
pub const BOOST_CEILING: f32 = 2.0;

/// Structured reason for one matched metadata value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReason {
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: String,
    pub label_en: String,
    pub label_ar: String,
}

/// Multiplier plus the reasons that produced it.
#[derive(Debug, Clone)]
pub struct BoostResult {
    pub multiplier: f32,
    pub reasons: Vec<MatchReason>,
}

impl Default for BoostResult {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            reasons: Vec::new(),
        }
    }
}

/// Computes the boost multiplier for one entry's metadata values against a
/// query.
///
/// Per value the keyword set is: the raw option value, both bilingual
/// labels, and the individual words of the English label (the non-primary
/// label language of this Arabic-first directory). A value matches when any
/// keyword is a case-insensitive substring of the query; each matching
/// value adds [`BOOST_INCREMENT`] once. The final multiplier is clamped to
/// [`BOOST_CEILING`].
pub fn boost_for_query(query: &str, metadata: &[(MetadataType, MetadataOption)]) -> BoostResult {
    let query = query.to_lowercase();
    let mut result = BoostResult::default();

    for (ty, opt) in metadata {
        if value_matches(&query, opt) {
            result.multiplier += BOOST_INCREMENT;
            result.reasons.push(MatchReason {
                type_name: ty.name.clone(),
                value: opt.value.clone(),
                label_en: opt.label_en.clone(),
                label_ar: opt.label_ar.clone(),
            });
        }
    }

    result.multiplier = result.multiplier.min(BOOST_CEILING);
    result
}

fn value_matches(query_lower: &str, opt: &MetadataOption) -> bool {
    let mut keywords: Vec<String> = vec![
        opt.value.to_lowercase(),
        opt.label_en.to_lowercase(),
        opt.label_ar.to_lowercase(),
    ];
    keywords.extend(opt.label_en.split_whitespace().map(str::to_lowercase));

    keywords
        .iter()
        .any(|k| !k.is_empty() && query_lower.contains(k.as_str()))
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

    fn opt(id: i64, type_id: i64, value: &str, label_en: &str, label_ar: &str) -> MetadataOption {
        MetadataOption {
            id,
            type_id,
            value: value.into(),
            label_en: label_en.into(),
            label_ar: label_ar.into(),
            active: true,
            sort_order: 0,
            color: None,
            icon: None,
        }
    }

    #[test]
    fn hafs_query_boosts_once_with_reason() {
        let metadata = vec![(ty(1, "narration-style"), opt(10, 1, "hafs", "Hafs", "حفص"))];
        let result = boost_for_query("hafs audio app", &metadata);

        assert!((result.multiplier - 1.15).abs() < f32::EPSILON);
        assert_eq!(result.reasons.len(), 1);
        let reason = &result.reasons[0];
        assert_eq!(reason.type_name, "narration-style");
        assert_eq!(reason.value, "hafs");
        assert_eq!(reason.label_en, "Hafs");
        assert_eq!(reason.label_ar, "حفص");
    }

    #[test]
    fn arabic_label_matches_arabic_query() {
        let metadata = vec![(ty(1, "narration-style"), opt(10, 1, "hafs", "Hafs", "حفص"))];
        let result = boost_for_query("تطبيق حفص", &metadata);
        assert!((result.multiplier - 1.15).abs() < f32::EPSILON);
    }

    #[test]
    fn english_label_words_match_individually() {
        let metadata = vec![(
            ty(2, "features"),
            opt(20, 2, "offline-audio", "Offline audio playback", "تشغيل دون اتصال"),
        )];
        // Only the single word "offline" appears in the query.
        let result = boost_for_query("best offline quran app", &metadata);
        assert!((result.multiplier - 1.15).abs() < f32::EPSILON);
    }

    #[test]
    fn multiplier_is_monotone_and_clamped() {
        let mut metadata = Vec::new();
        for i in 0..20 {
            metadata.push((ty(1, "features"), opt(i, 1, "audio", "audio", "صوت")));
        }

        let mut last = 1.0f32;
        for n in 1..=metadata.len() {
            let result = boost_for_query("audio", &metadata[..n]);
            assert!(result.multiplier >= last);
            last = result.multiplier;
        }
        assert!((last - BOOST_CEILING).abs() < f32::EPSILON);
    }

    #[test]
    fn no_overlap_leaves_multiplier_at_one() {
        let metadata = vec![(ty(1, "narration-style"), opt(10, 1, "warsh", "Warsh", "ورش"))];
        let result = boost_for_query("prayer times", &metadata);
        assert!((result.multiplier - 1.0).abs() < f32::EPSILON);
        assert!(result.reasons.is_empty());
    }
}
