//! Deterministic document composition for embedding generation.
//!
//! Converts a catalog entry plus optional enrichment text into one labeled
//! text block. Section order is fixed and significant: embedding windows
//! truncate from the end, so the highest-signal fields come first. Missing
//! optional fields omit their section entirely; the composer never pads.

use catalog_core::{Category, CatalogEntry, MetadataOption, MetadataType, Platform};

/// Caps applied during composition, in characters.
const CATEGORY_EXCERPT_CHARS: usize = 100;
const DESCRIPTION_CHARS: usize = 1000;
const ENRICHMENT_CHARS: usize = 2000;

/// Side data resolved by the caller: categories of the entry, its active
/// metadata values (type-sorted), and enrichment text when requested.
#[derive(Debug, Default)]
pub struct ComposeContext {
    pub categories: Vec<Category>,
    pub metadata: Vec<(MetadataType, MetadataOption)>,
    pub enrichment: Option<String>,
}

/// Composition mode flags.
#[derive(Debug, Clone, Copy)]
pub struct ComposeOptions {
    /// Include full descriptions (capped). Off for quick reindex passes.
    pub complete: bool,
    /// Include enrichment text when the context carries any.
    pub include_enrichment: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            complete: true,
            include_enrichment: true,
        }
    }
}

/// Assembles the embedding document for one entry.
///
/// Re-running on unchanged inputs yields byte-identical output.
pub fn compose(entry: &CatalogEntry, ctx: &ComposeContext, opts: ComposeOptions) -> String {
    let mut sections: Vec<String> = Vec::new();

    // 1. Canonical name, both languages.
    sections.push(format!("[NAME] {} | {}", entry.name_en, entry.name_ar));

    // 2. Category memberships with a short description excerpt for context.
    if !ctx.categories.is_empty() {
        let lines: Vec<String> = ctx
            .categories
            .iter()
            .map(|c| {
                let excerpt = excerpt(&c.description_en, CATEGORY_EXCERPT_CHARS);
                if excerpt.is_empty() {
                    format!("{} / {}", c.name_en, c.name_ar)
                } else {
                    format!("{} / {}: {}", c.name_en, c.name_ar, excerpt)
                }
            })
            .collect();
        sections.push(format!("[CATEGORIES] {}", lines.join("; ")));
    }

    // 3. Developer, with an explicit verification tag.
    if !entry.developer.name_en.is_empty() || !entry.developer.name_ar.is_empty() {
        let mut line = format!("{} / {}", entry.developer.name_en, entry.developer.name_ar);
        if entry.developer.verified {
            line.push_str(" (verified developer)");
        }
        sections.push(format!("[DEVELOPER] {line}"));
    }

    // 4. Short description, untruncated.
    if !entry.summary_en.is_empty() || !entry.summary_ar.is_empty() {
        sections.push(format!("[SUMMARY] {} | {}", entry.summary_en, entry.summary_ar));
    }

    // 5. Full description, complete mode only, capped per language.
    if opts.complete && (!entry.description_en.is_empty() || !entry.description_ar.is_empty()) {
        sections.push(format!(
            "[DESCRIPTION] {} | {}",
            excerpt(&entry.description_en, DESCRIPTION_CHARS),
            excerpt(&entry.description_ar, DESCRIPTION_CHARS)
        ));
    }

    // 6. Platform/availability summary.
    sections.push(format!("[PLATFORM] {}", platform_line(entry)));

    // 7. Derived quality tier phrases. Tier words carry more embedding
    //    signal than raw digits.
    let quality = quality_phrases(entry);
    if !quality.is_empty() {
        sections.push(format!("[QUALITY] {}", quality.join(", ")));
    }

    // 8. Featured tag.
    if entry.featured {
        sections.push("[FEATURED] Editor's choice".to_string());
    }

    // 9. Enrichment text, capped.
    if opts.include_enrichment {
        if let Some(text) = ctx.enrichment.as_deref() {
            let text = excerpt(text, ENRICHMENT_CHARS);
            if !text.is_empty() {
                sections.push(format!("[LISTING] {text}"));
            }
        }
    }

    // 10. One labeled section per active metadata type holding values;
    //     the format self-extends as new types are added.
    for (ty, options) in group_metadata(&ctx.metadata) {
        let values: Vec<String> = options
            .iter()
            .map(|o| format!("{} / {}", o.label_en, o.label_ar))
            .collect();
        sections.push(format!(
            "[{}] {} / {}: {}",
            ty.name.to_uppercase(),
            ty.label_en,
            ty.label_ar,
            values.join(", ")
        ));
    }

    sections.join("\n")
}

/// Char-safe prefix of `s` (Arabic text must not be split mid-codepoint).
fn excerpt(s: &str, max_chars: usize) -> String {
    s.trim().chars().take(max_chars).collect()
}

fn platform_line(entry: &CatalogEntry) -> String {
    let base = match entry.platform {
        Platform::Android => "Android app",
        Platform::Ios => "iOS app",
        Platform::Both => "Android and iOS app",
        Platform::Web => "Web app",
    };
    let mut channels = Vec::new();
    if entry.play_store_url.is_some() {
        channels.push("Google Play");
    }
    if entry.app_store_url.is_some() {
        channels.push("App Store");
    }
    if entry.website_url.is_some() {
        channels.push("website");
    }
    if channels.is_empty() {
        base.to_string()
    } else {
        format!("{base}, listed on {}", channels.join(", "))
    }
}

fn quality_phrases(entry: &CatalogEntry) -> Vec<&'static str> {
    let mut out = Vec::new();
    if entry.rating >= 4.5 {
        out.push("Excellent rating");
    } else if entry.rating >= 4.0 {
        out.push("Very good rating");
    } else if entry.rating >= 3.0 {
        out.push("Good rating");
    }
    if entry.review_count >= 100 {
        out.push("Well reviewed");
    }
    if entry.view_count >= 10_000 {
        out.push("Very popular");
    } else if entry.view_count >= 1_000 {
        out.push("Popular");
    }
    out
}

/// Groups the (type, option) pairs by type, preserving the incoming
/// (admin sort) order.
fn group_metadata(
    pairs: &[(MetadataType, MetadataOption)],
) -> Vec<(&MetadataType, Vec<&MetadataOption>)> {
    let mut out: Vec<(&MetadataType, Vec<&MetadataOption>)> = Vec::new();
    for (ty, opt) in pairs {
        match out.last_mut() {
            Some((last_ty, options)) if last_ty.id == ty.id => options.push(opt),
            _ => out.push((ty, vec![opt])),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{Developer, EntryStatus};

    fn base_entry() -> CatalogEntry {
        CatalogEntry {
            id: 1,
            name_en: "Quran Companion".into(),
            name_ar: "رفيق القرآن".into(),
            summary_en: "Audio recitations with offline mode".into(),
            summary_ar: "تلاوات صوتية مع وضع عدم الاتصال".into(),
            description_en: "Long description. ".repeat(100),
            description_ar: "وصف طويل. ".repeat(100),
            category_ids: vec![7],
            developer: Developer {
                name_en: "Good Apps".into(),
                name_ar: "تطبيقات جيدة".into(),
                verified: true,
            },
            platform: Platform::Both,
            play_store_url: Some("https://play.example/app".into()),
            app_store_url: None,
            website_url: None,
            rating: 4.7,
            review_count: 250,
            view_count: 12_000,
            status: EntryStatus::Published,
            featured: true,
            embedding: None,
            enrichment: None,
        }
    }

    fn ctx() -> ComposeContext {
        ComposeContext {
            categories: vec![Category {
                id: 7,
                name_en: "Quran".into(),
                name_ar: "القرآن".into(),
                description_en: "Recitation, memorization and study apps".into(),
                description_ar: String::new(),
            }],
            metadata: vec![(
                MetadataType {
                    id: 1,
                    name: "narration-style".into(),
                    label_en: "Narration style".into(),
                    label_ar: "نوع الرواية".into(),
                    multi_valued: true,
                    active: true,
                    sort_order: 0,
                },
                MetadataOption {
                    id: 10,
                    type_id: 1,
                    value: "hafs".into(),
                    label_en: "Hafs".into(),
                    label_ar: "حفص".into(),
                    active: true,
                    sort_order: 0,
                    color: None,
                    icon: None,
                },
            )],
            enrichment: Some("Store listing text ".repeat(200)),
        }
    }

    #[test]
    fn composition_is_deterministic() {
        let entry = base_entry();
        let ctx = ctx();
        let a = compose(&entry, &ctx, ComposeOptions::default());
        let b = compose(&entry, &ctx, ComposeOptions::default());
        assert_eq!(a, b);
    }

    #[test]
    fn bare_entry_still_yields_core_sections() {
        let mut entry = base_entry();
        entry.description_en.clear();
        entry.description_ar.clear();
        entry.featured = false;
        let doc = compose(&entry, &ComposeContext::default(), ComposeOptions::default());

        assert!(doc.contains("[NAME] Quran Companion | رفيق القرآن"));
        assert!(doc.contains("[DEVELOPER] Good Apps"));
        assert!(doc.contains("[SUMMARY] Audio recitations"));
        assert!(doc.contains("[PLATFORM] Android and iOS app, listed on Google Play"));
        assert!(!doc.contains("[CATEGORIES]"));
        assert!(!doc.contains("[LISTING]"));
    }

    #[test]
    fn quick_mode_drops_description_and_enrichment() {
        let entry = base_entry();
        let doc = compose(
            &entry,
            &ctx(),
            ComposeOptions {
                complete: false,
                include_enrichment: false,
            },
        );
        assert!(!doc.contains("[DESCRIPTION]"));
        assert!(!doc.contains("[LISTING]"));
        assert!(doc.contains("[SUMMARY]"));
    }

    #[test]
    fn caps_are_applied_per_section() {
        let entry = base_entry();
        let doc = compose(&entry, &ctx(), ComposeOptions::default());

        let description = doc
            .lines()
            .find(|l| l.starts_with("[DESCRIPTION]"))
            .unwrap();
        // Two languages, each capped at 1000 chars, plus labels/separator.
        assert!(description.chars().count() < 2100);

        let listing = doc.lines().find(|l| l.starts_with("[LISTING]")).unwrap();
        assert!(listing.chars().count() <= ENRICHMENT_CHARS + "[LISTING] ".len());
    }

    #[test]
    fn metadata_sections_are_self_extending() {
        let entry = base_entry();
        let doc = compose(&entry, &ctx(), ComposeOptions::default());
        assert!(doc.contains("[NARRATION-STYLE] Narration style / نوع الرواية: Hafs / حفص"));
    }

    #[test]
    fn quality_tiers_use_words_not_digits() {
        let entry = base_entry();
        let doc = compose(&entry, &ctx(), ComposeOptions::default());
        assert!(doc.contains("[QUALITY] Excellent rating, Well reviewed, Very popular"));
    }
}
