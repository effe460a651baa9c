use std::fmt;

use chrono::{DateTime, Utc};

use crate::feed::{FeedSource, RawEntry};
use crate::items::timestamp::extract_timestamp;
use crate::util::{non_blank, truncate_chars};

/// Default number of entries taken from each source.
pub const DEFAULT_ITEMS_PER_SOURCE: usize = 5;
/// Default summary budget, in characters.
pub const DEFAULT_SUMMARY_LENGTH: usize = 200;

/// Per-source limits applied while normalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemLimits {
    /// Entries taken from the head of each feed, in feed order.
    pub per_source: usize,
    /// Summary length in characters. Longer summaries are cut hard.
    pub summary_chars: usize,
}

impl Default for ItemLimits {
    fn default() -> Self {
        Self {
            per_source: DEFAULT_ITEMS_PER_SOURCE,
            summary_chars: DEFAULT_SUMMARY_LENGTH,
        }
    }
}

/// A render-ready entry.
///
/// `sort_timestamp` orders items and is independent of `display_date`,
/// which is whatever text the feed supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedItem {
    pub title: String,
    pub link: String,
    pub source_name: String,
    pub display_date: String,
    pub summary: String,
    pub sort_timestamp: DateTime<Utc>,
}

/// Which required field an entry lacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Title,
    Link,
    TitleAndLink,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingField::Title => f.write_str("title"),
            MissingField::Link => f.write_str("link"),
            MissingField::TitleAndLink => f.write_str("title and link"),
        }
    }
}

/// An entry dropped because it had no title or no link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDefect {
    pub source_name: String,
    /// Zero-based position of the entry in its feed.
    pub position: usize,
    pub missing: MissingField,
}

impl fmt::Display for EntryDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: entry #{} has no {}",
            self.source_name,
            self.position + 1,
            self.missing
        )
    }
}

/// Output of [`normalize_entries`] for one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub items: Vec<NormalizedItem>,
    pub defects: Vec<EntryDefect>,
}

/// Converts the head of a source's entries into [`NormalizedItem`]s.
///
/// Takes at most `limits.per_source` entries in the order the feed lists
/// them; there is no re-sorting before the cut. Each entry becomes:
///
/// - `title`, `link`: copied verbatim
/// - `source_name`: the source's display name
/// - `display_date`: raw `published`, else raw `updated`, else the sort
///   timestamp as `YYYY-MM-DD`
/// - `summary`: hard-truncated to `limits.summary_chars` characters
/// - `sort_timestamp`: [`extract_timestamp`]
///
/// Entries without a title or link are not given placeholder values. They
/// are left out and reported in [`Normalized::defects`]; they still count
/// toward the per-source limit since the cut happens first.
pub fn normalize_entries(
    source: &FeedSource,
    entries: &[RawEntry],
    limits: ItemLimits,
) -> Normalized {
    let mut out = Normalized::default();

    for (position, entry) in entries.iter().take(limits.per_source).enumerate() {
        let title = non_blank(entry.title.as_deref()).and(entry.title.as_ref());
        let link = non_blank(entry.link.as_deref()).and(entry.link.as_ref());

        let (title, link) = match (title, link) {
            (Some(title), Some(link)) => (title, link),
            (title, link) => {
                let missing = match (title, link) {
                    (None, None) => MissingField::TitleAndLink,
                    (None, _) => MissingField::Title,
                    _ => MissingField::Link,
                };
                tracing::warn!(
                    source = %source.display_name,
                    position = position,
                    missing = %missing,
                    "Skipping feed entry with missing required field"
                );
                out.defects.push(EntryDefect {
                    source_name: source.display_name.clone(),
                    position,
                    missing,
                });
                continue;
            }
        };

        let sort_timestamp = extract_timestamp(entry);
        let display_date = entry
            .published
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| entry.updated.as_deref().filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| sort_timestamp.format("%Y-%m-%d").to_string());
        let summary = entry
            .summary
            .as_deref()
            .map(|s| truncate_chars(s, limits.summary_chars).into_owned())
            .unwrap_or_default();

        out.items.push(NormalizedItem {
            title: title.clone(),
            link: link.clone(),
            source_name: source.display_name.clone(),
            display_date,
            summary,
            sort_timestamp,
        });
    }

    tracing::debug!(
        source = %source.display_name,
        items = out.items.len(),
        skipped = out.defects.len(),
        "Normalized feed entries"
    );

    out
}
