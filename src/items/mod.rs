//! Item normalization and ordering.
//!
//! - [`timestamp`] - total sort-key extraction with fallbacks to the epoch
//! - [`normalize`] - raw entries to [`NormalizedItem`]s, per-source limits and truncation
//! - [`aggregate`] - cross-source merge, newest-first sort, sidebar order, combined feed payload

pub mod aggregate;
pub mod normalize;
pub mod timestamp;

pub use aggregate::{
    combined_feed, merge_and_sort, sidebar, sort_newest_first, CombinedFeed, SidebarEntry,
    DEFAULT_FEED_ITEM_LIMIT, LAST_BUILD_FORMAT,
};
pub use normalize::{
    normalize_entries, EntryDefect, ItemLimits, MissingField, Normalized, NormalizedItem,
    DEFAULT_ITEMS_PER_SOURCE, DEFAULT_SUMMARY_LENGTH,
};
pub use timestamp::{extract_timestamp, parse_date_text, EPOCH};
