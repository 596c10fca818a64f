use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignError {
    #[error("timestamp {0} is outside the representable UTC range")]
    InvalidTimestamp(i64),

    #[error("invalid hmac key: {0}")]
    InvalidKey(String),
}
