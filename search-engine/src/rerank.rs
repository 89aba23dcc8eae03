//! LLM reranking of the top-K candidates.
//!
//! Strict contract: only `{id, name, excerpt}` per candidate goes out, a
//! JSON array of `{id, reasoning}` in desired order comes back. The call is
//! fail-open at every stage (provider error, fenced output, malformed JSON,
//! unknown ids), so search degrades to plain vector order rather than
//! failing the request.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::provider::SemanticProvider;

/// Compact candidate view sent to the provider. Never the full catalog
/// record: payload stays bounded and operational fields stay private.
#[derive(Debug, Clone, Serialize)]
pub struct RerankCandidate {
    pub id: i64,
    pub name: String,
    pub excerpt: String,
}

/// One reranked position: candidate id plus optional model reasoning.
#[derive(Debug, Clone, Deserialize)]
pub struct RankedItem {
    pub id: i64,
    #[serde(default)]
    pub reasoning: Option<String>,
}

const SYSTEM_PROMPT: &str = "You rank app-directory search results by relevance to a user query. \
You never invent results that were not given to you.";

/// Asks the provider to reorder `candidates` for `query`.
///
/// Returns the provider's order with unknown ids dropped and duplicates
/// collapsed to their first occurrence. On any failure the input order is
/// returned unchanged with no reasoning attached.
pub async fn rerank(
    provider: &dyn SemanticProvider,
    query: &str,
    candidates: &[RerankCandidate],
) -> Vec<RankedItem> {
    let passthrough = || {
        candidates
            .iter()
            .map(|c| RankedItem {
                id: c.id,
                reasoning: None,
            })
            .collect::<Vec<_>>()
    };

    if candidates.is_empty() || !provider.available() {
        return passthrough();
    }

    let prompt = build_prompt(query, candidates);
    let raw = match provider.complete(SYSTEM_PROMPT, &prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "rerank call failed; keeping original order");
            return passthrough();
        }
    };

    let clean = cleanup_json_like(&raw);
    let parsed: Vec<RankedItem> = match serde_json::from_str(&clean) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "rerank response unparseable; keeping original order");
            return passthrough();
        }
    };

    // Drop ids we never sent and collapse duplicates, first occurrence wins.
    let known: std::collections::HashSet<i64> = candidates.iter().map(|c| c.id).collect();
    let mut seen = std::collections::HashSet::new();
    let accepted: Vec<RankedItem> = parsed
        .into_iter()
        .filter(|item| known.contains(&item.id) && seen.insert(item.id))
        .collect();

    if accepted.is_empty() {
        warn!("rerank response contained no known ids; keeping original order");
        return passthrough();
    }

    debug!(sent = candidates.len(), accepted = accepted.len(), "rerank applied");
    accepted
}

fn build_prompt(query: &str, candidates: &[RerankCandidate]) -> String {
    let listing = serde_json::to_string_pretty(candidates).unwrap_or_else(|_| "[]".into());
    format!(
        "Query: {query}\n\
\n\
         Candidates (id, name, excerpt):\n{listing}\n\
\n\
         Reorder the candidates from most to least relevant for the query. \
         You may drop clearly irrelevant candidates. Return ONLY a JSON array \
         with this exact shape (no markdown, no comments):\n\
         [{{\"id\": 1, \"reasoning\": \"one short sentence\"}}]\n"
    )
}

/// Strips code fences some providers wrap around JSON output.
fn cleanup_json_like(s: &str) -> String {
    let t = s.trim();
    if t.starts_with("```") {
        t.trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else {
        t.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SearchError;
    use std::future::Future;
    use std::pin::Pin;

    /// Provider that replies to `complete` with a canned string.
    struct CannedProvider {
        reply: Result<String, ()>,
    }

    impl SemanticProvider for CannedProvider {
        fn embed<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, SearchError>> + Send + 'a>> {
            Box::pin(async { Ok(vec![]) })
        }

        fn complete<'a>(
            &'a self,
            _system: &'a str,
            _user: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, SearchError>> + Send + 'a>> {
            let reply = self.reply.clone();
            Box::pin(async move {
                reply.map_err(|()| SearchError::Provider("boom".into()))
            })
        }
    }

    fn candidates() -> Vec<RerankCandidate> {
        (1..=3)
            .map(|id| RerankCandidate {
                id,
                name: format!("App {id}"),
                excerpt: format!("excerpt {id}"),
            })
            .collect()
    }

    fn ids(items: &[RankedItem]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    #[tokio::test]
    async fn malformed_response_preserves_input_order() {
        let provider = CannedProvider {
            reply: Ok("sorry, here you go: two then one".into()),
        };
        let out = rerank(&provider, "q", &candidates()).await;
        assert_eq!(ids(&out), vec![1, 2, 3]);
        assert!(out.iter().all(|i| i.reasoning.is_none()));
    }

    #[tokio::test]
    async fn provider_error_preserves_input_order() {
        let provider = CannedProvider { reply: Err(()) };
        let out = rerank(&provider, "q", &candidates()).await;
        assert_eq!(ids(&out), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn valid_response_reorders_and_keeps_reasoning() {
        let provider = CannedProvider {
            reply: Ok(r#"```json
[{"id": 3, "reasoning": "closest match"}, {"id": 1}]
```"#
                .into()),
        };
        let out = rerank(&provider, "q", &candidates()).await;
        assert_eq!(ids(&out), vec![3, 1]);
        assert_eq!(out[0].reasoning.as_deref(), Some("closest match"));
    }

    #[tokio::test]
    async fn unknown_and_duplicate_ids_are_dropped() {
        let provider = CannedProvider {
            reply: Ok(r#"[{"id": 99}, {"id": 2}, {"id": 2}, {"id": 1}]"#.into()),
        };
        let out = rerank(&provider, "q", &candidates()).await;
        assert_eq!(ids(&out), vec![2, 1]);
    }

    #[tokio::test]
    async fn all_unknown_ids_fall_back_to_input_order() {
        let provider = CannedProvider {
            reply: Ok(r#"[{"id": 98}, {"id": 99}]"#.into()),
        };
        let out = rerank(&provider, "q", &candidates()).await;
        assert_eq!(ids(&out), vec![1, 2, 3]);
    }
}
