//! Utility functions for common operations.
//!
//! - **URL validation**: scheme checks for configured feed URLs
//! - **Text processing**: hard character truncation and blank-field handling
//!
//! # Examples
//!
//! ```
//! use feedboard::util::{truncate_chars, validate_feed_url};
//!
//! let url = validate_feed_url("https://example.com/feed.xml").unwrap();
//! let summary = truncate_chars("A long article summary", 6);
//! assert_eq!(summary, "A long");
//! ```

mod text;
mod url_validator;

pub use text::{non_blank, truncate_chars};
pub use url_validator::{validate_feed_url, UrlValidationError};
