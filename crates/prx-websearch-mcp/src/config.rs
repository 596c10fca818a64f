use std::io;
use std::time::Duration;

use prx_websearch::{
    BochaRerankConfig, PipelineConfig, PipelineError, RerankProviderConfig, SearchProviderConfig,
    TencentSearchConfig, WebSearchPipeline, DEFAULT_RELEVANCE_THRESHOLD,
};

pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8788";
const DEFAULT_TIMEOUT_MS: u64 = 15_000;
const MIN_TIMEOUT_MS: u64 = 1_000;
const MAX_TIMEOUT_MS: u64 = 120_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
}

impl Transport {
    fn parse(raw: &str) -> io::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "PRX_WEBSEARCHD_TRANSPORT must be stdio or http",
            )),
        }
    }
}

/// Everything the daemon needs, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub search: TencentSearchConfig,
    pub rerank: BochaRerankConfig,
    pub pipeline: PipelineConfig,
    pub transport: Transport,
    pub http_addr: String,
}

impl ServerConfig {
    pub fn from_env() -> io::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Blank values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> io::Result<Self> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout = Duration::from_millis(
            var("PRX_WEBSEARCH_TIMEOUT_MS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_MS)
                .clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS),
        );

        let mut search = TencentSearchConfig::new(
            var("TENCENT_SECRET_ID").unwrap_or_default(),
            var("TENCENT_SECRET_KEY").unwrap_or_default(),
        );
        search.token = var("TENCENT_SESSION_TOKEN");
        search.region = var("TENCENT_REGION");
        if let Some(endpoint) = var("PRX_SEARCH_ENDPOINT") {
            search.endpoint = endpoint;
        }
        search.timeout = timeout;

        let mut rerank = BochaRerankConfig::new(
            var("BOCHA_API_KEY")
                .or_else(|| var("PRX_RERANK_API_KEY"))
                .unwrap_or_default(),
        );
        if let Some(model) = var("PRX_RERANK_MODEL") {
            rerank.model = model;
        }
        if let Some(endpoint) = var("PRX_RERANK_ENDPOINT") {
            rerank.endpoint = endpoint;
        }
        rerank.timeout = timeout;

        let pipeline = PipelineConfig {
            relevance_threshold: var("PRX_WEBSEARCH_RELEVANCE_THRESHOLD")
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(DEFAULT_RELEVANCE_THRESHOLD)
                .clamp(0.0, 1.0),
            max_results: var("PRX_WEBSEARCH_MAX_RESULTS")
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|v| *v > 0),
        };

        let transport = match var("PRX_WEBSEARCHD_TRANSPORT") {
            Some(raw) => Transport::parse(&raw)?,
            None => Transport::Stdio,
        };
        let http_addr = var("PRX_WEBSEARCH_HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.into());

        let config = Self {
            search,
            rerank,
            pipeline,
            transport,
            http_addr,
        };
        config.warn_missing_credentials();
        Ok(config)
    }

    /// Configured secret values, for scrubbing client-facing diagnostics.
    pub fn secrets(&self) -> Vec<String> {
        [
            Some(&self.search.secret_key),
            self.search.token.as_ref(),
            Some(&self.rerank.api_key),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect()
    }

    pub fn build_pipeline(&self) -> Result<WebSearchPipeline, PipelineError> {
        WebSearchPipeline::from_configs(
            SearchProviderConfig::Tencent(self.search.clone()),
            RerankProviderConfig::Bocha(self.rerank.clone()),
            self.pipeline.clone(),
        )
    }

    fn warn_missing_credentials(&self) {
        if self.search.secret_id.is_empty() || self.search.secret_key.is_empty() {
            tracing::warn!(
                "TENCENT_SECRET_ID / TENCENT_SECRET_KEY not set; search requests will be rejected"
            );
        }
        if self.rerank.api_key.is_empty() {
            tracing::warn!("BOCHA_API_KEY not set; rerank requests will be rejected");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> io::Result<ServerConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).expect("config");
        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.http_addr, DEFAULT_HTTP_ADDR);
        assert_eq!(config.search.endpoint, "https://tms.tencentcloudapi.com");
        assert_eq!(config.search.timeout, Duration::from_secs(15));
        assert_eq!(config.rerank.model, "gte-rerank");
        assert!((config.pipeline.relevance_threshold - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.pipeline.max_results, None);
        assert!(config.secrets().is_empty());
    }

    #[test]
    fn credentials_and_overrides_are_read() {
        let config = config_from(&[
            ("TENCENT_SECRET_ID", "AKID1"),
            ("TENCENT_SECRET_KEY", "tc-key"),
            ("TENCENT_SESSION_TOKEN", "tc-token"),
            ("TENCENT_REGION", "ap-guangzhou"),
            ("PRX_SEARCH_ENDPOINT", "http://127.0.0.1:9000"),
            ("PRX_RERANK_API_KEY", "sk-fallback"),
            ("PRX_RERANK_MODEL", "gte-rerank-v2"),
            ("PRX_WEBSEARCHD_TRANSPORT", "HTTP"),
            ("PRX_WEBSEARCH_HTTP_ADDR", "0.0.0.0:9999"),
            ("PRX_WEBSEARCH_MAX_RESULTS", "8"),
        ])
        .expect("config");
        assert_eq!(config.search.secret_id, "AKID1");
        assert_eq!(config.search.region.as_deref(), Some("ap-guangzhou"));
        assert_eq!(config.search.endpoint, "http://127.0.0.1:9000");
        assert_eq!(config.search.host, "tms.tencentcloudapi.com");
        assert_eq!(config.rerank.api_key, "sk-fallback");
        assert_eq!(config.rerank.model, "gte-rerank-v2");
        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.http_addr, "0.0.0.0:9999");
        assert_eq!(config.pipeline.max_results, Some(8));
        assert_eq!(config.secrets(), vec!["tc-key", "tc-token", "sk-fallback"]);
    }

    #[test]
    fn bocha_key_wins_over_generic_key() {
        let config = config_from(&[("BOCHA_API_KEY", "sk-bocha"), ("PRX_RERANK_API_KEY", "sk-x")])
            .expect("config");
        assert_eq!(config.rerank.api_key, "sk-bocha");
    }

    #[test]
    fn numeric_settings_are_clamped() {
        let config = config_from(&[
            ("PRX_WEBSEARCH_RELEVANCE_THRESHOLD", "1.7"),
            ("PRX_WEBSEARCH_TIMEOUT_MS", "5"),
            ("PRX_WEBSEARCH_MAX_RESULTS", "0"),
        ])
        .expect("config");
        assert!((config.pipeline.relevance_threshold - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.search.timeout, Duration::from_millis(1_000));
        assert_eq!(config.rerank.timeout, Duration::from_millis(1_000));
        assert_eq!(config.pipeline.max_results, None);

        let config = config_from(&[
            ("PRX_WEBSEARCH_RELEVANCE_THRESHOLD", "NaN"),
            ("PRX_WEBSEARCH_TIMEOUT_MS", "999999"),
        ])
        .expect("config");
        assert!((config.pipeline.relevance_threshold - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.search.timeout, Duration::from_millis(120_000));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("PRX_SEARCH_ENDPOINT", "  "), ("TENCENT_REGION", "")])
            .expect("config");
        assert_eq!(config.search.endpoint, "https://tms.tencentcloudapi.com");
        assert_eq!(config.search.region, None);
    }

    #[test]
    fn unknown_transport_is_rejected() {
        let err = config_from(&[("PRX_WEBSEARCHD_TRANSPORT", "websocket")]).expect_err("reject");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
