use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::BochaRerankConfig;
use crate::error::ProviderError;
use crate::traits::RerankProvider;
use crate::types::{RerankItem, RerankRequest, RerankResponse};

#[derive(Clone)]
pub struct BochaRerankProvider {
    config: BochaRerankConfig,
    client: Client,
}

impl BochaRerankProvider {
    pub fn new(config: BochaRerankConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }
}

#[async_trait::async_trait]
impl RerankProvider for BochaRerankProvider {
    fn name(&self) -> &'static str {
        "bocha"
    }

    async fn rerank(&self, request: RerankRequest) -> Result<RerankResponse, ProviderError> {
        if request.documents.is_empty() {
            return Ok(RerankResponse {
                provider: self.name().to_string(),
                model: self.config.model.clone(),
                items: Vec::new(),
            });
        }

        let payload = BochaRerankRequest {
            model: &self.config.model,
            query: &request.query,
            documents: &request.documents,
            return_documents: self.config.return_documents,
        };

        let res = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let parsed: BochaRerankResponse = res.json().await?;
        let Some(data) = parsed.data else {
            return Err(ProviderError::InvalidResponse(format!(
                "bocha rerank response has no data (code={}, msg={})",
                parsed.code.map_or_else(|| "none".to_string(), |c| c.to_string()),
                parsed.msg.unwrap_or_default()
            )));
        };

        let items = data
            .results
            .into_iter()
            .map(|it| RerankItem {
                index: it.index,
                score: it.relevance_score,
                document: it.document.as_ref().and_then(document_text),
            })
            .collect();

        Ok(RerankResponse {
            provider: self.name().to_string(),
            model: data.model.unwrap_or_else(|| self.config.model.clone()),
            items,
        })
    }
}

fn document_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("text").and_then(Value::as_str).map(ToString::to_string),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct BochaRerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    return_documents: bool,
}

#[derive(Debug, Deserialize)]
struct BochaRerankResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
    data: Option<BochaRerankData>,
}

#[derive(Debug, Deserialize)]
struct BochaRerankData {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    results: Vec<BochaRerankItem>,
}

#[derive(Debug, Deserialize)]
struct BochaRerankItem {
    index: usize,
    #[serde(alias = "score")]
    relevance_score: f64,
    #[serde(default)]
    document: Option<Value>,
}
