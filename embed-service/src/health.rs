//! Health checks for the configured AI backends.
//!
//! - Ollama: `GET {endpoint}/api/tags`
//! - OpenAI: `GET {endpoint}/v1/models` with Bearer auth
//!
//! The returned [`HealthStatus`] is JSON-serializable and suitable for a
//! `/health` endpoint. [`HealthService::check`] is resilient and never fails:
//! errors are mapped to `ok=false`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ProviderConfig, ProviderKind};
use crate::errors::{Result, make_snippet};

/// A serializable health snapshot for a single provider/config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend/provider (e.g. "Ollama", "OpenAi").
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier relevant to the profile.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds for the probe.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

/// A health checker that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds).
    ///
    /// # Errors
    /// Returns a transport error if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Checks health for a single profile config.
    ///
    /// This method is **resilient**: any failure is converted to
    /// `HealthStatus { ok: false, .. }`.
    pub async fn check(&self, cfg: &ProviderConfig) -> HealthStatus {
        let endpoint = cfg.endpoint.trim().trim_end_matches('/');
        let started = Instant::now();

        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            warn!(endpoint = %cfg.endpoint, "invalid endpoint for health check");
            return self.status(cfg, started, false, "invalid endpoint".to_string());
        }

        let (url, bearer) = match cfg.kind {
            ProviderKind::Ollama => (format!("{endpoint}/api/tags"), None),
            ProviderKind::OpenAi => (format!("{endpoint}/v1/models"), cfg.api_key.clone()),
        };

        debug!(url = %url, "health probe");
        let mut req = self.client.get(&url);
        if let Some(key) = bearer {
            req = req.header(header::AUTHORIZATION, format!("Bearer {key}"));
        }

        match req.send().await {
            Ok(resp) if resp.status().is_success() => {
                self.status(cfg, started, true, "reachable".to_string())
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                self.status(
                    cfg,
                    started,
                    false,
                    format!("HTTP {status}: {}", make_snippet(&body)),
                )
            }
            Err(e) => self.status(cfg, started, false, format!("transport: {e}")),
        }
    }

    /// Checks many configs sequentially; order matches the input.
    pub async fn check_many(&self, cfgs: &[ProviderConfig]) -> Vec<HealthStatus> {
        let mut out = Vec::with_capacity(cfgs.len());
        for cfg in cfgs {
            out.push(self.check(cfg).await);
        }
        out
    }

    fn status(
        &self,
        cfg: &ProviderConfig,
        started: Instant,
        ok: bool,
        message: String,
    ) -> HealthStatus {
        HealthStatus {
            provider: format!("{:?}", cfg.kind),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms: started.elapsed().as_millis(),
            message,
        }
    }
}
