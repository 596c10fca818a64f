use prx_websearch_rerank::ProviderError as RerankProviderError;
use prx_websearch_search::ProviderError as SearchProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("search stage failed: {0}")]
    Search(#[source] SearchProviderError),

    #[error("rerank stage failed: {0}")]
    Rerank(#[source] RerankProviderError),
}
