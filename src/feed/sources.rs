use std::path::Path;

use thiserror::Error;

use crate::feed::FetchedFeed;
use crate::util::non_blank;

/// Errors that can occur while reading the feed source list.
#[derive(Debug, Error)]
pub enum SourceListError {
    /// The feeds file could not be read.
    #[error("Failed to read feeds file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A `name,url` line with nothing after the comma.
    #[error("Line {line}: missing feed URL")]
    MissingUrl { line: usize },

    /// No sources at all. Nothing can be published.
    #[error("No feed sources configured")]
    Empty,
}

/// One line of the feed source list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    /// Display name from the line. A bare `url` line is named by its URL;
    /// `None` only for a `,url` line with an empty name.
    pub name: Option<String>,
    pub url: String,
}

/// A configured feed with its resolved presentation data.
///
/// `display_name` and `resolved_link` are never empty: both fall back to the
/// feed URL when nothing better is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub display_name: String,
    pub url: String,
    pub resolved_link: String,
}

/// Reads and parses a feed source list from disk.
///
/// # Errors
///
/// - [`SourceListError::Io`] if the file cannot be read
/// - any error from [`parse_source_lines`]
pub async fn load_source_list(path: &Path) -> Result<Vec<SourceSpec>, SourceListError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceListError::Io {
            path: path.display().to_string(),
            source,
        })?;

    parse_source_lines(&content)
}

/// Parses feed source lines of the form `name,url` or a bare `url`.
///
/// - Only the first comma separates the name from the URL; later commas are
///   part of the URL (query strings contain them).
/// - Name and URL are trimmed. An empty name counts as no name.
/// - A bare `url` line is named by the URL itself.
/// - Blank lines and lines starting with `#` are skipped.
/// - The same URL may appear on several lines; each line is its own source.
///
/// # Errors
///
/// - [`SourceListError::MissingUrl`] for a line whose URL part is empty
/// - [`SourceListError::Empty`] if no source remains
pub fn parse_source_lines(content: &str) -> Result<Vec<SourceSpec>, SourceListError> {
    let mut specs = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (name, url) = match line.split_once(',') {
            Some((name, url)) => (non_blank(Some(name)), url.trim()),
            None => (Some(line), line),
        };

        if url.is_empty() {
            return Err(SourceListError::MissingUrl { line: idx + 1 });
        }

        specs.push(SourceSpec {
            name: name.map(str::to_string),
            url: url.to_string(),
        });
    }

    if specs.is_empty() {
        return Err(SourceListError::Empty);
    }

    Ok(specs)
}

/// Resolves a source's display name and link.
///
/// `feed` is `None` when the fetch failed; the source still resolves using
/// the URL fallbacks so it keeps its place in the sidebar.
///
/// - `display_name`: explicit name, else the feed's title, else the URL
/// - `resolved_link`: the feed's link, else the URL
pub fn resolve_source(spec: &SourceSpec, feed: Option<&FetchedFeed>) -> FeedSource {
    let feed_title = feed.and_then(|f| non_blank(f.title.as_deref()));
    let feed_link = feed.and_then(|f| non_blank(f.link.as_deref()));

    let display_name = non_blank(spec.name.as_deref())
        .or(feed_title)
        .unwrap_or(spec.url.as_str())
        .to_string();
    let resolved_link = feed_link.unwrap_or(spec.url.as_str()).to_string();

    FeedSource {
        display_name,
        url: spec.url.clone(),
        resolved_link,
    }
}
