use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TencentSearchConfig {
    pub secret_id: String,
    pub secret_key: String,
    pub token: Option<String>,
    pub region: Option<String>,
    /// URL the request is sent to. Signing always uses `host`.
    pub endpoint: String,
    pub host: String,
    pub service: String,
    pub action: String,
    pub version: String,
    pub timeout: Duration,
}

impl TencentSearchConfig {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            token: None,
            region: None,
            endpoint: "https://tms.tencentcloudapi.com".to_string(),
            host: "tms.tencentcloudapi.com".to_string(),
            service: "tms".to_string(),
            action: "SearchPro".to_string(),
            version: "2020-12-29".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SearchProviderConfig {
    Tencent(TencentSearchConfig),
}
