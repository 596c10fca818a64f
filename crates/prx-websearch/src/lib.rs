//! Web search augmentation: signed provider search, semantic rerank, and a
//! relevance cutoff that turns the survivors into one summary string.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::WebSearchPipeline;

pub use prx_websearch_core::*;
pub use prx_websearch_rerank::{
    build_rerank_provider, rerank_raw, BochaRerankConfig, ProviderError as RerankProviderError,
    RerankItem, RerankProvider, RerankProviderConfig, RerankRequest, RerankResponse,
};
pub use prx_websearch_search::{
    build_search_provider, ProviderError as SearchProviderError, SearchProvider,
    SearchProviderConfig, SearchRequest, SearchResponse, TencentSearchConfig,
};
