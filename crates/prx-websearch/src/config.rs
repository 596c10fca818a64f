use prx_websearch_core::DEFAULT_RELEVANCE_THRESHOLD;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Rerank scores below this stop the walk over ranked results.
    pub relevance_threshold: f64,
    /// Optional cap on raw search pages sent to the reranker.
    pub max_results: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            max_results: None,
        }
    }
}
