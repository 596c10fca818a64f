use std::sync::Arc;

use prx_websearch_core::{select_relevant, PageRecord, SearchAnswer};
use prx_websearch_rerank::{
    build_rerank_provider, rerank_raw, RerankItem, RerankProvider, RerankProviderConfig,
    RerankRequest,
};
use prx_websearch_search::{
    build_search_provider, SearchProvider, SearchProviderConfig, SearchRequest,
};

use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// Search, then rerank the page summaries against the query, then keep
/// pages in rank order until the first score under the threshold.
///
/// Holds no per-query state; one instance can serve concurrent callers.
#[derive(Clone)]
pub struct WebSearchPipeline {
    search: Arc<dyn SearchProvider>,
    rerank: Arc<dyn RerankProvider>,
    config: PipelineConfig,
}

impl WebSearchPipeline {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        rerank: Arc<dyn RerankProvider>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            search,
            rerank,
            config,
        }
    }

    pub fn from_configs(
        search: SearchProviderConfig,
        rerank: RerankProviderConfig,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        let search = build_search_provider(search).map_err(PipelineError::Search)?;
        let rerank = build_rerank_provider(rerank).map_err(PipelineError::Rerank)?;
        Ok(Self::new(search, rerank, config))
    }

    /// Never fails. A search failure is logged and treated as zero pages; a
    /// rerank failure is logged and treated as zero ranked pages. Either way
    /// the caller gets an empty answer.
    pub async fn answer(&self, query: &str) -> SearchAnswer {
        let pages = match self.search.search(self.search_request(query)).await {
            Ok(res) => res.pages,
            Err(err) => {
                tracing::warn!(
                    provider = self.search.name(),
                    error = %err,
                    "web search failed; continuing with no pages"
                );
                Vec::new()
            }
        };
        if pages.is_empty() {
            tracing::debug!("no pages to rerank");
            return SearchAnswer::default();
        }
        let ranked = rerank_raw(self.rerank.as_ref(), query, documents(&pages)).await;
        self.select(&pages, &ranked)
    }

    /// Like [`Self::answer`] but surfaces stage failures, so callers can
    /// tell "nothing relevant" (`Ok` with an empty answer) from "search
    /// failed".
    pub async fn try_answer(&self, query: &str) -> Result<SearchAnswer, PipelineError> {
        let pages = self
            .search
            .search(self.search_request(query))
            .await
            .map_err(PipelineError::Search)?
            .pages;
        if pages.is_empty() {
            tracing::debug!("no pages to rerank");
            return Ok(SearchAnswer::default());
        }
        let ranked = self
            .rerank
            .rerank(RerankRequest::new(query, documents(&pages)))
            .await
            .map_err(PipelineError::Rerank)?
            .into_ranked();
        Ok(self.select(&pages, &ranked))
    }

    fn search_request(&self, query: &str) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            count: self.config.max_results,
        }
    }

    fn select(&self, pages: &[PageRecord], ranked: &[RerankItem]) -> SearchAnswer {
        let kept = select_relevant(
            pages,
            ranked.iter().map(|it| (it.index, it.score)),
            self.config.relevance_threshold,
        );
        tracing::debug!(
            pages = pages.len(),
            ranked = ranked.len(),
            kept = kept.len(),
            threshold = self.config.relevance_threshold,
            "relevance cutoff applied"
        );
        SearchAnswer::from_pages(kept)
    }
}

fn documents(pages: &[PageRecord]) -> Vec<String> {
    pages.iter().map(|p| p.summary.clone()).collect()
}
