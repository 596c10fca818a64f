//! Web search providers. Each provider turns a query into normalized
//! [`PageRecord`](prx_websearch_core::PageRecord)s sorted by provider score.

pub mod config;
pub mod error;
pub mod factory;
pub mod providers;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::ProviderError;
pub use factory::*;
pub use providers::{decode_search_response, TencentSearchProvider};
pub use traits::*;
pub use types::*;
