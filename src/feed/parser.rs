use chrono::NaiveDateTime;
use feed_rs::model::Link;
use feed_rs::parser::{self, ParseFeedError};

/// RFC 2822 with a zero-padded day, the way RSS `pubDate` is usually written.
const DATE_TEXT_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Feed-level data plus entries, as handed to the normalization pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedFeed {
    pub title: Option<String>,
    pub link: Option<String>,
    pub entries: Vec<RawEntry>,
}

/// One entry exactly as the feed described it.
///
/// Every field is optional: real-world feeds omit titles, links and dates
/// freely. Structured times are naive and are interpreted as UTC; the textual
/// `published`/`updated` fields are what gets shown to readers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub published_parsed: Option<NaiveDateTime>,
    pub updated_parsed: Option<NaiveDateTime>,
    pub summary: Option<String>,
}

/// Parses RSS or Atom bytes into a [`FetchedFeed`].
///
/// Entry order is kept exactly as it appears in the document. `feed-rs`
/// normalizes timestamps while parsing and does not keep the source text, so
/// the textual date fields are filled with the RFC 2822 rendering of the
/// parsed value.
pub fn parse_feed(bytes: &[u8]) -> Result<FetchedFeed, ParseFeedError> {
    let feed = parser::parse(bytes)?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body));

            RawEntry {
                title: entry.title.map(|t| t.content),
                link: primary_link(&entry.links),
                published: entry.published.map(|dt| dt.format(DATE_TEXT_FORMAT).to_string()),
                updated: entry.updated.map(|dt| dt.format(DATE_TEXT_FORMAT).to_string()),
                published_parsed: entry.published.map(|dt| dt.naive_utc()),
                updated_parsed: entry.updated.map(|dt| dt.naive_utc()),
                summary,
            }
        })
        .collect();

    Ok(FetchedFeed {
        title: feed.title.map(|t| t.content),
        link: primary_link(&feed.links),
        entries,
    })
}

/// Picks the page link from a link list.
///
/// Atom feeds list `rel="self"` (the feed document) next to
/// `rel="alternate"` (the website); RSS links carry no rel at all.
fn primary_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}
