use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{RerankRequest, RerankResponse};

/// Scores documents against a query with a hosted rerank model.
#[async_trait]
pub trait RerankProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Items reference documents by their position in `request.documents`.
    /// Providers may return them in any order; use
    /// [`RerankResponse::into_ranked`] before walking them by relevance.
    async fn rerank(&self, request: RerankRequest) -> Result<RerankResponse, ProviderError>;
}
