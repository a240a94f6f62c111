//! Free-text search with paging

use crate::{types::LedgerEntry, Ledger, Result};
use serde::Serialize;
use std::cmp::Reverse;
use tracing::debug;

/// Page size when the caller gives none
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Matched case-insensitively against the customer name, or as-is
    /// against the phone; empty matches everything
    pub text: String,
    /// 1-based page number
    pub page: usize,
    /// Page size
    pub limit: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery {
    /// Query for `text`, first page, default size
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Select a page; zero is treated as the first
    pub fn page(mut self, page: usize, limit: usize) -> Self {
        self.page = page.max(1);
        self.limit = limit.max(1);
        self
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    /// Entries on this page
    pub results: Vec<LedgerEntry>,
    /// Matches across all pages
    pub total: usize,
}

/// Sort newest sale first; rows without a readable date go last
pub fn sort_newest_first(entries: &mut [LedgerEntry]) {
    entries.sort_by_key(|e| Reverse(e.record.sale_date()));
}

/// Sort, filter and page ledger entries
pub fn search(mut entries: Vec<LedgerEntry>, query: &SearchQuery) -> SearchPage {
    sort_newest_first(&mut entries);

    if !query.text.is_empty() {
        let needle = query.text.to_lowercase();
        entries.retain(|e| {
            e.record.customer_name.to_lowercase().contains(&needle)
                || e.record.phone.contains(&query.text)
        });
    }

    let total = entries.len();
    let start = query.page.max(1).saturating_sub(1).saturating_mul(query.limit);
    let results = entries
        .into_iter()
        .skip(start)
        .take(query.limit)
        .collect();

    SearchPage { results, total }
}

impl Ledger {
    /// Search the whole ledger
    pub async fn search_transactions(&self, query: &SearchQuery) -> Result<SearchPage> {
        let page = search(self.list_all_transactions().await?, query);
        debug!(
            "Search {:?} page {}: {} of {}",
            query.text,
            query.page,
            page.results.len(),
            page.total
        );
        Ok(page)
    }
}
