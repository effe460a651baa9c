use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::feed::FeedSource;
use crate::items::NormalizedItem;

/// Default number of items in the combined feed.
pub const DEFAULT_FEED_ITEM_LIMIT: usize = 50;

/// `lastBuildDate` format for the combined feed.
pub const LAST_BUILD_FORMAT: &str = "%a, %d %b %Y %H:%M:%S +0000";

/// One sidebar line: a source name and where it links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarEntry {
    pub display_name: String,
    pub link: String,
}

/// Payload for the combined RSS feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedFeed {
    pub items: Vec<NormalizedItem>,
    pub last_build: String,
}

/// Merges per-source item lists and sorts newest first.
///
/// Sources are concatenated in the order given (the source list order).
/// The sort is stable: items with equal timestamps keep that concatenation
/// order. Undated items carry the epoch and end up last.
pub fn merge_and_sort<I>(per_source: I) -> Vec<NormalizedItem>
where
    I: IntoIterator<Item = Vec<NormalizedItem>>,
{
    let mut items: Vec<NormalizedItem> = per_source.into_iter().flatten().collect();
    sort_newest_first(&mut items);
    items
}

/// Stable descending sort by `sort_timestamp`.
pub fn sort_newest_first(items: &mut [NormalizedItem]) {
    items.sort_by(|a, b| b.sort_timestamp.cmp(&a.sort_timestamp));
}

/// Builds the sidebar: sources ordered by display name, ignoring case.
///
/// Independent of item order. Names that compare equal keep source list order.
pub fn sidebar(sources: &[FeedSource]) -> Vec<SidebarEntry> {
    let mut entries: Vec<SidebarEntry> = sources
        .iter()
        .map(|s| SidebarEntry {
            display_name: s.display_name.clone(),
            link: s.resolved_link.clone(),
        })
        .collect();
    entries.sort_by_cached_key(|e| e.display_name.to_lowercase());
    entries
}

/// Takes the newest `limit` items for the combined feed and stamps the build time.
///
/// `items` must already be sorted newest first.
pub fn combined_feed(items: &[NormalizedItem], limit: usize, now: DateTime<Utc>) -> CombinedFeed {
    CombinedFeed {
        items: items.iter().take(limit).cloned().collect(),
        last_build: now.format(LAST_BUILD_FORMAT).to_string(),
    }
}
