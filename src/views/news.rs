//! News feed paging and previews

use serde::Serialize;

use crate::models::NewsItem;

/// Characters kept in a list preview
pub const EXCERPT_CHARS: usize = 200;

/// One page of the news feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsPage {
    pub items: Vec<NewsItem>,
    pub skip: i64,
    pub limit: i64,
    pub has_more: bool,
}

impl NewsPage {
    /// Build a page from a fetch of `limit + 1` rows; the extra row only
    /// signals that another page exists.
    pub fn from_probe(mut fetched: Vec<NewsItem>, skip: i64, limit: i64) -> Self {
        let limit = limit.max(1);
        let has_more = fetched.len() as i64 > limit;
        fetched.truncate(limit as usize);
        Self {
            items: fetched,
            skip,
            limit,
            has_more,
        }
    }

    pub fn next_skip(&self) -> i64 {
        self.skip.saturating_add(self.limit)
    }
}

/// First paragraph cut to `EXCERPT_CHARS`, with an ellipsis when cut
pub fn excerpt(content: &str) -> String {
    let first = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    if first.chars().count() <= EXCERPT_CHARS {
        return first.to_string();
    }
    let cut: String = first.chars().take(EXCERPT_CHARS).collect();
    format!("{}…", cut.trim_end())
}
