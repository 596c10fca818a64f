//! Semantic rerank of search summaries. [`rerank_raw`] is the entry point
//! that never fails; use a [`RerankProvider`] directly for typed errors.

pub mod config;
pub mod error;
pub mod factory;
pub mod providers;
pub mod raw;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::ProviderError;
pub use factory::*;
pub use providers::BochaRerankProvider;
pub use raw::rerank_raw;
pub use traits::*;
pub use types::*;
