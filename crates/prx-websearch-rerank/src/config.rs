use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BochaRerankConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub return_documents: bool,
    pub timeout: Duration,
}

impl BochaRerankConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gte-rerank".to_string(),
            endpoint: "https://api.bochaai.com/v1/rerank".to_string(),
            return_documents: true,
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RerankProviderConfig {
    Bocha(BochaRerankConfig),
}
