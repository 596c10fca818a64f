use std::time::{SystemTime, UNIX_EPOCH};

use prx_websearch_core::{sort_by_score_desc, PageId, PageRecord};
use prx_websearch_tc3::{Credentials, SigningRequest, Tc3Signer};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::TencentSearchConfig;
use crate::error::ProviderError;
use crate::traits::SearchProvider;
use crate::types::{SearchRequest, SearchResponse};

#[derive(Clone)]
pub struct TencentSearchProvider {
    config: TencentSearchConfig,
    signer: Tc3Signer,
    client: Client,
}

impl TencentSearchProvider {
    pub fn new(config: TencentSearchConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let signer = Tc3Signer::new(Credentials {
            secret_id: config.secret_id.clone(),
            secret_key: config.secret_key.clone(),
            token: config.token.clone(),
        });
        Ok(Self {
            config,
            signer,
            client,
        })
    }
}

#[async_trait::async_trait]
impl SearchProvider for TencentSearchProvider {
    fn name(&self) -> &'static str {
        "tencent"
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, ProviderError> {
        tracing::trace!(query = %request.query, "tencent search request");

        // Signed bytes and sent bytes must be identical.
        let payload = serde_json::to_string(&TencentSearchRequest {
            query: &request.query,
        })?;
        let signed = self.signer.sign(&SigningRequest {
            service: &self.config.service,
            host: &self.config.host,
            action: &self.config.action,
            version: &self.config.version,
            region: self.config.region.as_deref(),
            payload: &payload,
            timestamp: unix_now(),
        })?;

        let mut req = self.client.post(&self.config.endpoint);
        for (name, value) in &signed.headers {
            req = req.header(*name, value);
        }
        let res = req.body(payload).send().await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let body = res.text().await?;
        let (mut pages, request_id) = decode_search_response(&body)?;
        if let Some(count) = request.count {
            pages.truncate(count);
        }
        tracing::debug!(
            provider = self.name(),
            pages = pages.len(),
            request_id = request_id.as_deref().unwrap_or(""),
            "search returned pages"
        );

        Ok(SearchResponse {
            provider: self.name().to_string(),
            request_id,
            pages,
        })
    }
}

/// Decodes `{"Response": {"Pages": ["<json>", ...]}}`. Every page is itself
/// a JSON document encoded as a string and gets a second parse. Pages that
/// fail that parse are skipped but still consume their 1-based position.
///
/// Returns the pages sorted by score (descending, stable) and the request id.
pub fn decode_search_response(
    body: &str,
) -> Result<(Vec<PageRecord>, Option<String>), ProviderError> {
    let envelope: TencentEnvelope = serde_json::from_str(body)?;
    let Some(response) = envelope.response else {
        return Ok((Vec::new(), None));
    };
    if let Some(err) = response.error {
        return Err(ProviderError::Remote {
            code: err.code,
            message: err.message,
        });
    }

    let raw_pages = response.pages.unwrap_or_default();
    let mut pages = Vec::with_capacity(raw_pages.len());
    for (offset, raw) in raw_pages.iter().enumerate() {
        let position = offset + 1;
        let Value::String(encoded) = raw else {
            tracing::warn!(position, "skipping search page that is not a JSON string");
            continue;
        };
        match serde_json::from_str::<TencentPage>(encoded) {
            Ok(page) => pages.push(page.into_record(position)),
            Err(err) => {
                tracing::warn!(position, error = %err, "skipping undecodable search page");
            }
        }
    }

    sort_by_score_desc(&mut pages);
    Ok((pages, response.request_id))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[derive(Debug, Serialize)]
struct TencentSearchRequest<'a> {
    #[serde(rename = "Query")]
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct TencentEnvelope {
    #[serde(rename = "Response")]
    response: Option<TencentResponse>,
}

#[derive(Debug, Deserialize)]
struct TencentResponse {
    #[serde(rename = "Pages")]
    pages: Option<Vec<Value>>,
    #[serde(rename = "Error")]
    error: Option<TencentError>,
    #[serde(rename = "RequestId")]
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TencentError {
    #[serde(rename = "Code", default)]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TencentPage {
    id: Option<Value>,
    title: Option<Value>,
    url: Option<Value>,
    passage: Option<Value>,
    site_name: Option<Value>,
    favicon: Option<Value>,
    date: Option<Value>,
    score: Option<Value>,
}

impl TencentPage {
    fn into_record(self, position: usize) -> PageRecord {
        let passage = text(self.passage.as_ref());
        PageRecord {
            id: page_id(self.id.as_ref(), position),
            title: text(self.title.as_ref()),
            url: text(self.url.as_ref()),
            summary: passage.clone(),
            detail: passage,
            site_name: text(self.site_name.as_ref()),
            site_icon: text(self.favicon.as_ref()),
            date_published: text(self.date.as_ref()),
            score: number(self.score.as_ref()),
        }
    }
}

fn page_id(raw: Option<&Value>, position: usize) -> PageId {
    match raw {
        Some(Value::Number(n)) => n
            .as_i64()
            .map_or_else(|| PageId::Text(n.to_string()), PageId::Number),
        Some(Value::String(s)) => PageId::Text(s.clone()),
        Some(Value::Null) | None => PageId::position(position),
        Some(other) => PageId::Text(other.to_string()),
    }
}

fn text(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn number(raw: Option<&Value>) -> f64 {
    match raw {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
