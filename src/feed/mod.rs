//! Feed sources, fetching, and parsing.
//!
//! - [`sources`] - the `name,url` source list and display name/link resolution
//! - [`fetcher`] - concurrent HTTP retrieval with per-source failure isolation
//! - [`parser`] - RSS/Atom to [`FetchedFeed`] via the `feed-rs` crate
//!
//! # Example
//!
//! ```ignore
//! use feedboard::feed::{build_client, fetch_all, load_source_list, resolve_source, FetchOptions};
//!
//! let specs = load_source_list(Path::new("feeds.txt")).await?;
//! let options = FetchOptions::default();
//! let client = build_client(&options)?;
//! let results = fetch_all(&client, &specs, &options).await;
//! let sources: Vec<_> = specs
//!     .iter()
//!     .zip(&results)
//!     .map(|(spec, r)| resolve_source(spec, r.as_ref().ok()))
//!     .collect();
//! ```

pub mod fetcher;
pub mod parser;
pub mod sources;

pub use fetcher::{
    build_client, fetch_all, fetch_one, FetchError, FetchOptions, DEFAULT_CONCURRENCY,
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
pub use parser::{parse_feed, FetchedFeed, RawEntry};
pub use sources::{
    load_source_list, parse_source_lines, resolve_source, FeedSource, SourceListError, SourceSpec,
};
