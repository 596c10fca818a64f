use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{SearchRequest, SearchResponse};

/// A remote web search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// One signed request per call. Pages come back sorted by provider
    /// score, highest first; an empty list is a valid answer.
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, ProviderError>;
}
