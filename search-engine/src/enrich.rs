//! Content enrichment boundary.
//!
//! Supplementary descriptive text crawled from external listing pages
//! improves embedding quality. Fetching is strictly best-effort: every
//! failure is logged and yields `None`, never an error, and composition
//! simply omits the enrichment section.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use catalog_core::CatalogEntry;
use tracing::{debug, warn};

/// External enrichment source. Implementations apply their own per-source
/// timeout and return best-effort partial text.
pub trait ContentEnricher: Send + Sync {
    /// Fetches supplementary text for the entry, or `None` on any failure.
    fn fetch<'a>(
        &'a self,
        entry: &'a CatalogEntry,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
}

/// Enricher that never fetches anything. Used when crawling is disabled.
#[derive(Default, Clone, Copy)]
pub struct NoopEnricher;

impl ContentEnricher for NoopEnricher {
    fn fetch<'a>(
        &'a self,
        _entry: &'a CatalogEntry,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async { None })
    }
}

/// HTTP enricher that pulls the entry's store listing page and reduces it
/// to plain text.
pub struct HttpEnricher {
    client: reqwest::Client,
    max_chars: usize,
}

impl HttpEnricher {
    /// Builds the enricher with a bounded per-request timeout.
    ///
    /// # Errors
    /// Returns the reqwest build error if the client cannot be constructed.
    pub fn new(timeout_secs: u64, max_chars: usize) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client, max_chars })
    }

    /// First listing URL carried by the entry, store pages preferred.
    fn listing_url(entry: &CatalogEntry) -> Option<&str> {
        entry
            .play_store_url
            .as_deref()
            .or(entry.app_store_url.as_deref())
            .or(entry.website_url.as_deref())
    }
}

impl ContentEnricher for HttpEnricher {
    fn fetch<'a>(
        &'a self,
        entry: &'a CatalogEntry,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            let Some(url) = Self::listing_url(entry) else {
                debug!(entry_id = entry.id, "no listing url; skipping enrichment");
                return None;
            };

            let resp = match self.client.get(url).send().await {
                Ok(r) => r,
                Err(e) => {
                    warn!(entry_id = entry.id, url, error = %e, "enrichment fetch failed");
                    return None;
                }
            };
            if !resp.status().is_success() {
                warn!(entry_id = entry.id, url, status = %resp.status(), "enrichment fetch non-2xx");
                return None;
            }
            let body = match resp.text().await {
                Ok(b) => b,
                Err(e) => {
                    warn!(entry_id = entry.id, url, error = %e, "enrichment body read failed");
                    return None;
                }
            };

            let text = strip_markup(&body, self.max_chars);
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        })
    }
}

/// Crude tag stripper: drops `<...>` runs and collapses whitespace. Good
/// enough for embedding input; this is not an HTML parser.
fn strip_markup(html: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(html.len().min(max_chars));
    let mut emitted = 0usize;
    let mut in_tag = false;
    let mut last_was_space = true;
    for c in html.chars() {
        if emitted >= max_chars {
            break;
        }
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if in_tag => {}
            c if c.is_whitespace() => {
                if !last_was_space {
                    out.push(' ');
                    emitted += 1;
                    last_was_space = true;
                }
            }
            c => {
                out.push(c);
                emitted += 1;
                last_was_space = false;
            }
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_markup_flattens_tags_and_whitespace() {
        let html = "<html><body><h1>Great  App</h1>\n<p>Audio &amp; more</p></body></html>";
        assert_eq!(strip_markup(html, 1000), "Great App Audio &amp; more");
    }

    #[test]
    fn strip_markup_respects_the_cap() {
        let html = "word ".repeat(500);
        let out = strip_markup(&html, 40);
        assert!(out.chars().count() <= 40);
    }
}
