use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct RerankRequest {
    pub query: String,
    pub documents: Vec<String>,
}

impl RerankRequest {
    pub fn new(query: impl Into<String>, documents: Vec<String>) -> Self {
        Self {
            query: query.into(),
            documents,
        }
    }
}

/// Position in the submitted document list plus its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankItem {
    pub index: usize,
    pub score: f64,
    /// Document text echoed back by the provider, when requested.
    pub document: Option<String>,
}

impl RerankItem {
    pub fn new(index: usize, score: f64) -> Self {
        Self {
            index,
            score,
            document: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RerankResponse {
    pub provider: String,
    pub model: String,
    pub items: Vec<RerankItem>,
}

impl RerankResponse {
    /// Items ordered by score, highest first. Stable for equal scores; NaN
    /// sorts last.
    pub fn into_ranked(self) -> Vec<RerankItem> {
        let mut items = self.items;
        items.sort_by(|a, b| descending(a.score, b.score));
        items
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}
