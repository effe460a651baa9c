//! Configuration file parser for `feedboard.toml`.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::feed::{FetchOptions, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::items::{
    ItemLimits, DEFAULT_FEED_ITEM_LIMIT, DEFAULT_ITEMS_PER_SOURCE, DEFAULT_SUMMARY_LENGTH,
};
use crate::site::DEFAULT_PAGE_SIZE;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A value that parses but cannot be used (e.g. a zero page size).
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level run configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`. Relative paths are taken
/// as-is, i.e. relative to the working directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feed source list, one `name,url` or `url` per line.
    pub feeds_file: PathBuf,

    /// Directory the site is written into.
    pub output_dir: PathBuf,

    /// Directory holding `index.html`. The built-in template is used when absent.
    pub templates_dir: PathBuf,

    /// Directory of static assets copied to `<output_dir>/static`.
    pub static_dir: PathBuf,

    /// Items per HTML page.
    pub page_size: usize,

    /// Summary budget in characters.
    pub summary_length: usize,

    /// Entries taken from the head of each feed.
    pub items_per_source: usize,

    /// Items in the combined `feed.xml`.
    pub feed_item_limit: usize,

    /// Feeds fetched concurrently.
    pub fetch_concurrency: usize,

    /// Per-feed timeout in seconds.
    pub fetch_timeout_secs: u64,

    /// `User-Agent` sent with feed requests.
    pub user_agent: String,

    /// Site metadata for page titles and the combined feed channel.
    pub site: SiteConfig,
}

/// `[site]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds_file: PathBuf::from("feeds.txt"),
            output_dir: PathBuf::from("public"),
            templates_dir: PathBuf::from("templates"),
            static_dir: PathBuf::from("static"),
            page_size: DEFAULT_PAGE_SIZE.get(),
            summary_length: DEFAULT_SUMMARY_LENGTH,
            items_per_source: DEFAULT_ITEMS_PER_SOURCE,
            feed_item_limit: DEFAULT_FEED_ITEM_LIMIT,
            fetch_concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            site: SiteConfig::default(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Feedboard".to_string(),
            link: String::new(),
            description: "Latest posts from all sources".to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 12] = [
        "feeds_file",
        "output_dir",
        "templates_dir",
        "static_dir",
        "page_size",
        "summary_length",
        "items_per_source",
        "feed_item_limit",
        "fetch_concurrency",
        "fetch_timeout_secs",
        "user_agent",
        "site",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    ///
    /// Values are not range-checked here so command-line overrides can still
    /// replace them; call [`Config::validate`] once overrides are applied.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to avoid slurping something huge
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            feeds_file = %config.feeds_file.display(),
            output_dir = %config.output_dir.display(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Rejects values the pipeline cannot run with.
    ///
    /// Call after applying overrides; [`Config::load`] does not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("page_size", self.page_size as u64),
            ("summary_length", self.summary_length as u64),
            ("items_per_source", self.items_per_source as u64),
            ("feed_item_limit", self.feed_item_limit as u64),
            ("fetch_concurrency", self.fetch_concurrency as u64),
            ("fetch_timeout_secs", self.fetch_timeout_secs),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{key} must be greater than 0")));
            }
        }
        Ok(())
    }

    /// Page size as a non-zero count.
    pub fn page_size(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.page_size)
            .ok_or_else(|| ConfigError::Invalid("page_size must be greater than 0".to_string()))
    }

    pub fn item_limits(&self) -> ItemLimits {
        ItemLimits {
            per_source: self.items_per_source,
            summary_chars: self.summary_length,
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            concurrency: self.fetch_concurrency,
            timeout: Duration::from_secs(self.fetch_timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
