use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::SignError;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "TC3-HMAC-SHA256";
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const SIGNED_HEADERS: &str = "content-type;host;x-tc-action";
const TERMINATOR: &str = "tc3_request";

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub secret_id: String,
    pub secret_key: String,
    /// Temporary-credential session token, sent as `X-TC-Token`.
    pub token: Option<String>,
}

impl Credentials {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            token: None,
        }
    }
}

/// Everything that feeds the signature for one `POST /` call.
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    pub service: &'a str,
    pub host: &'a str,
    pub action: &'a str,
    pub version: &'a str,
    pub region: Option<&'a str>,
    /// Exact body bytes that go on the wire.
    pub payload: &'a str,
    /// Unix seconds; also selects the UTC date of the credential scope.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub authorization: String,
    pub headers: Vec<(&'static str, String)>,
}

impl SignedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Tc3Signer {
    credentials: Credentials,
}

impl Tc3Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn authorization(&self, req: &SigningRequest<'_>) -> Result<String, SignError> {
        let date = utc_date(req.timestamp)?;
        let scope = credential_scope(&date, req.service);
        let canonical = canonical_request(req.payload, req.host, req.action);
        let to_sign = string_to_sign(req.timestamp, &scope, &canonical);
        let key = derive_signing_key(&self.credentials.secret_key, &date, req.service)?;
        let mut mac = new_mac(&key)?;
        mac.update(to_sign.as_bytes());
        let signature = format!("{:x}", mac.finalize().into_bytes());
        Ok(format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            self.credentials.secret_id
        ))
    }

    /// Signs `req` and returns the full header set in send order. Region and
    /// token headers are only present when non-empty.
    pub fn sign(&self, req: &SigningRequest<'_>) -> Result<SignedRequest, SignError> {
        let authorization = self.authorization(req)?;
        let mut headers = vec![
            ("Authorization", authorization.clone()),
            ("Content-Type", CONTENT_TYPE.to_string()),
            ("Host", req.host.to_string()),
            ("X-TC-Action", req.action.to_string()),
            ("X-TC-Timestamp", req.timestamp.to_string()),
            ("X-TC-Version", req.version.to_string()),
        ];
        if let Some(region) = req.region.filter(|r| !r.is_empty()) {
            headers.push(("X-TC-Region", region.to_string()));
        }
        if let Some(token) = self.credentials.token.as_deref().filter(|t| !t.is_empty()) {
            headers.push(("X-TC-Token", token.to_string()));
        }
        Ok(SignedRequest {
            authorization,
            headers,
        })
    }
}

pub fn utc_date(timestamp: i64) -> Result<String, SignError> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .ok_or(SignError::InvalidTimestamp(timestamp))
}

pub fn credential_scope(date: &str, service: &str) -> String {
    format!("{date}/{service}/{TERMINATOR}")
}

pub fn canonical_request(payload: &str, host: &str, action: &str) -> String {
    let canonical_headers = format!(
        "content-type:{CONTENT_TYPE}\nhost:{host}\nx-tc-action:{}\n",
        action.to_ascii_lowercase()
    );
    format!(
        "POST\n/\n\n{canonical_headers}\n{SIGNED_HEADERS}\n{}",
        sha256_hex(payload)
    )
}

pub fn string_to_sign(timestamp: i64, scope: &str, canonical_request: &str) -> String {
    format!(
        "{ALGORITHM}\n{timestamp}\n{scope}\n{}",
        sha256_hex(canonical_request)
    )
}

/// `HMAC(HMAC(HMAC("TC3" + secret_key, date), service), "tc3_request")`
pub fn derive_signing_key(
    secret_key: &str,
    date: &str,
    service: &str,
) -> Result<Vec<u8>, SignError> {
    let secret_date = hmac_sha256(format!("TC3{secret_key}").as_bytes(), date)?;
    let secret_service = hmac_sha256(&secret_date, service)?;
    hmac_sha256(&secret_service, TERMINATOR)
}

pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn new_mac(key: &[u8]) -> Result<HmacSha256, SignError> {
    HmacSha256::new_from_slice(key).map_err(|e| SignError::InvalidKey(e.to_string()))
}

fn hmac_sha256(key: &[u8], msg: &str) -> Result<Vec<u8>, SignError> {
    let mut mac = new_mac(key)?;
    mac.update(msg.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}
