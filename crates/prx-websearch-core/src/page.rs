use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider-assigned page identifier, or the 1-based position when the
/// provider omitted one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageId {
    Number(i64),
    Text(String),
}

impl PageId {
    pub fn position(position: usize) -> Self {
        Self::Number(i64::try_from(position).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for PageId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PageId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One normalized search result. Field names serialize in the camelCase
/// shape downstream consumers already read (`siteName`, `datePublished`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub id: PageId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub site_icon: String,
    #[serde(default)]
    pub date_published: String,
    /// Search-provider score; only orders raw results, never the rerank stage.
    #[serde(default)]
    pub score: f64,
}

impl PageRecord {
    pub fn new(id: impl Into<PageId>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            url: String::new(),
            summary: String::new(),
            detail: String::new(),
            site_name: String::new(),
            site_icon: String::new(),
            date_published: String::new(),
            score: 0.0,
        }
    }
}

/// Sort by provider score, highest first. Stable: ties keep provider order.
pub fn sort_by_score_desc(pages: &mut [PageRecord]) {
    pages.sort_by(|a, b| b.score.total_cmp(&a.score));
}
