use prx_websearch_core::PageRecord;

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    /// Cap on returned pages after score sorting. `None` keeps everything
    /// the provider sent.
    pub count: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            count: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub provider: String,
    pub request_id: Option<String>,
    /// Sorted by provider score, descending.
    pub pages: Vec<PageRecord>,
}
