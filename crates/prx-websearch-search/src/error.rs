use prx_websearch_tc3::SignError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("request signing failed: {0}")]
    Sign(#[from] SignError),

    #[error("provider returned invalid response: {0}")]
    InvalidResponse(String),

    #[error("provider API error: status={status}, body={body}")]
    Api { status: u16, body: String },

    /// Error reported inside a 2xx envelope (`Response.Error`).
    #[error("provider rejected request: code={code}, message={message}")]
    Remote { code: String, message: String },
}
