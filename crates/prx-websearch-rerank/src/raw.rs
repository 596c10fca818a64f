use crate::traits::RerankProvider;
use crate::types::{RerankItem, RerankRequest};

/// Reranks `documents` against `query` and never fails: transport, status
/// and shape errors are logged and collapse to an empty list, so a rerank
/// outage yields no results instead of an error.
///
/// The returned items are sorted by score, highest first, regardless of
/// the order the provider used.
pub async fn rerank_raw(
    provider: &dyn RerankProvider,
    query: &str,
    documents: Vec<String>,
) -> Vec<RerankItem> {
    let submitted = documents.len();
    match provider
        .rerank(RerankRequest::new(query, documents))
        .await
    {
        Ok(res) => {
            let ranked = res.into_ranked();
            tracing::debug!(
                provider = provider.name(),
                submitted,
                returned = ranked.len(),
                "rerank completed"
            );
            ranked
        }
        Err(err) => {
            tracing::warn!(
                provider = provider.name(),
                submitted,
                error = %err,
                "rerank failed; continuing with no ranked results"
            );
            Vec::new()
        }
    }
}
