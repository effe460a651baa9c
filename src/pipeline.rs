//! One end-to-end build: source list in, static site out.
//!
//! [`run`] does the I/O (read the source list, fetch, write files).
//! [`assemble`] is the pure middle: given the fetch results and a clock
//! reading it always produces the same pages and feed.

use std::num::NonZeroUsize;
use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::feed::{
    build_client, fetch_all, load_source_list, resolve_source, FeedSource, FetchError,
    FetchedFeed, SourceListError, SourceSpec,
};
use crate::items::{
    combined_feed, merge_and_sort, normalize_entries, sidebar, CombinedFeed, EntryDefect,
    ItemLimits, SidebarEntry,
};
use crate::site::{
    copy_static, ensure_dir, page_file_name, paginate, render_rss, write_atomic, ChannelInfo,
    HtmlRenderer, OutputError, Page, RenderError, FEED_FILE_NAME, STATIC_SUBDIR,
};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load feed source list: {0}")]
    Sources(#[from] SourceListError),

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] FetchError),

    #[error("Failed to render site: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to write site: {0}")]
    Output(#[from] OutputError),
}

/// Limits applied while turning fetch results into a site.
#[derive(Debug, Clone, Copy)]
pub struct BuildSettings {
    pub limits: ItemLimits,
    pub page_size: NonZeroUsize,
    pub feed_item_limit: usize,
}

impl BuildSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            limits: config.item_limits(),
            page_size: config.page_size()?,
            feed_item_limit: config.feed_item_limit,
        })
    }
}

/// A source whose feed could not be used this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSource {
    pub display_name: String,
    pub url: String,
    pub error: String,
}

/// Everything needed to write the site, computed without I/O.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub sources: Vec<FeedSource>,
    pub sidebar: Vec<SidebarEntry>,
    pub pages: Vec<Page>,
    pub feed: CombinedFeed,
    pub failed: Vec<FailedSource>,
    pub defects: Vec<EntryDefect>,
}

/// Outcome of a [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub sources: usize,
    pub failed: Vec<FailedSource>,
    pub items: usize,
    pub pages: usize,
    pub feed_items: usize,
    pub defects: Vec<EntryDefect>,
}

/// Turns fetch results into sidebar, pages and combined feed.
///
/// `results` must line up with `specs`, one result per spec in the same
/// order. A failed source still gets a sidebar entry (named from the source
/// list, or its URL) and contributes no items.
pub fn assemble(
    specs: &[SourceSpec],
    results: &[Result<FetchedFeed, FetchError>],
    settings: &BuildSettings,
    now: DateTime<Utc>,
) -> Assembled {
    let mut sources = Vec::with_capacity(specs.len());
    let mut per_source = Vec::with_capacity(specs.len());
    let mut failed = Vec::new();
    let mut defects = Vec::new();

    for (spec, result) in specs.iter().zip(results) {
        let source = resolve_source(spec, result.as_ref().ok());
        match result {
            Ok(feed) => {
                let normalized = normalize_entries(&source, &feed.entries, settings.limits);
                per_source.push(normalized.items);
                defects.extend(normalized.defects);
            }
            Err(e) => failed.push(FailedSource {
                display_name: source.display_name.clone(),
                url: source.url.clone(),
                error: e.to_string(),
            }),
        }
        sources.push(source);
    }

    let items = merge_and_sort(per_source);
    let feed = combined_feed(&items, settings.feed_item_limit, now);
    let pages = paginate(&items, settings.page_size);
    let sidebar = sidebar(&sources);

    Assembled {
        sources,
        sidebar,
        pages,
        feed,
        failed,
        defects,
    }
}

/// Runs a full build with the given configuration.
///
/// Fails only on problems with the run itself (unreadable source list, a
/// template that exists but cannot be read, unwritable output). Individual
/// feeds failing is reported in the [`RunReport`], not as an error.
pub async fn run(config: &Config, now: DateTime<Utc>) -> Result<RunReport, BuildError> {
    config.validate()?;
    let settings = BuildSettings::from_config(config)?;

    let specs = load_source_list(&config.feeds_file).await?;
    tracing::info!(
        path = %config.feeds_file.display(),
        sources = specs.len(),
        "Loaded feed source list"
    );

    let options = config.fetch_options();
    let client = build_client(&options).map_err(BuildError::Client)?;
    let results = fetch_all(&client, &specs, &options).await;

    let assembled = assemble(&specs, &results, &settings, now);
    for failure in &assembled.failed {
        tracing::warn!(
            source = %failure.display_name,
            url = %failure.url,
            error = %failure.error,
            "Source omitted from this build"
        );
    }

    let renderer = HtmlRenderer::load(&config.templates_dir, &config.site.title).await?;
    let channel = ChannelInfo {
        title: &config.site.title,
        link: &config.site.link,
        description: &config.site.description,
    };
    write_site(&config.output_dir, &config.static_dir, &renderer, &channel, &assembled)?;

    let report = RunReport {
        sources: assembled.sources.len(),
        failed: assembled.failed,
        items: assembled.pages.iter().map(|p| p.items.len()).sum(),
        pages: assembled.pages.len(),
        feed_items: assembled.feed.items.len(),
        defects: assembled.defects,
    };
    tracing::info!(
        sources = report.sources,
        failed = report.failed.len(),
        items = report.items,
        pages = report.pages,
        output = %config.output_dir.display(),
        "Site build complete"
    );
    Ok(report)
}

/// Writes every page, the combined feed, and the static assets.
pub fn write_site(
    output_dir: &Path,
    static_dir: &Path,
    renderer: &HtmlRenderer,
    channel: &ChannelInfo<'_>,
    assembled: &Assembled,
) -> Result<(), BuildError> {
    ensure_dir(output_dir)?;

    for page in &assembled.pages {
        let html = renderer.render_page(page, &assembled.sidebar, &assembled.feed.last_build)?;
        let path = output_dir.join(page_file_name(&page.name()));
        write_atomic(&path, html.as_bytes())?;
        tracing::debug!(path = %path.display(), items = page.items.len(), "Wrote page");
    }

    let rss = render_rss(channel, &assembled.feed)?;
    write_atomic(&output_dir.join(FEED_FILE_NAME), rss.as_bytes())?;

    let copied = copy_static(static_dir, &output_dir.join(STATIC_SUBDIR))?;
    tracing::debug!(files = copied, "Copied static assets");
    Ok(())
}
