use serde::{Deserialize, Serialize};

use crate::page::PageRecord;

pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.4;

/// Final pipeline output: surviving pages plus their summaries joined by `\n`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchAnswer {
    pub summary: String,
    pub results: Vec<PageRecord>,
}

impl SearchAnswer {
    pub fn from_pages(results: Vec<PageRecord>) -> Self {
        Self {
            summary: join_summaries(&results),
            results,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

pub fn join_summaries(pages: &[PageRecord]) -> String {
    pages
        .iter()
        .map(|p| p.summary.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Walks `ranked` (index, score) pairs in order and keeps `pages[index]`
/// until the first score below `threshold`; everything after that point is
/// dropped. `ranked` must already be sorted by score descending.
///
/// A NaN score halts like a low score. Indices outside `pages` are skipped.
pub fn select_relevant<I>(pages: &[PageRecord], ranked: I, threshold: f64) -> Vec<PageRecord>
where
    I: IntoIterator<Item = (usize, f64)>,
{
    let mut selected = Vec::new();
    for (index, score) in ranked {
        if score.is_nan() || score < threshold {
            break;
        }
        if let Some(page) = pages.get(index) {
            selected.push(page.clone());
        }
    }
    selected
}
