//! Static site generation.
//!
//! Splits the sorted item list into pages, renders each page to HTML,
//! renders the combined RSS feed, and writes everything to the output
//! directory.

pub mod html;
pub mod output;
pub mod paginate;
pub mod rss;

use thiserror::Error;

pub use html::{page_file_name, HtmlRenderer, BUILTIN_TEMPLATE};
pub use output::{copy_static, ensure_dir, write_atomic, OutputError};
pub use paginate::{page_name, paginate, Page, DEFAULT_PAGE_SIZE, FIRST_PAGE_NAME};
pub use rss::{render_rss, ChannelInfo};

/// File name of the combined feed inside the output directory.
pub const FEED_FILE_NAME: &str = "feed.xml";

/// Directory under the output directory that static assets are copied to.
pub const STATIC_SUBDIR: &str = "static";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to read template '{path}': {source}")]
    Template {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Engine(#[from] minijinja::Error),

    #[error("XML error: {0}")]
    Xml(String),
}
