//! TC3-HMAC-SHA256 signing for Tencent Cloud API 3.0 requests.
//!
//! Only the shape used by JSON `POST /` calls is supported: empty query
//! string, signed headers `content-type;host;x-tc-action`.

pub mod error;
pub mod signer;

pub use error::SignError;
pub use signer::*;
