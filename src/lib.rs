//! feedboard: aggregates RSS/Atom feeds into a paginated static site and a
//! combined RSS feed.
//!
//! The binary in `main.rs` wires these modules together through
//! [`pipeline::run`]; they are exposed here for the integration tests.

pub mod config;
pub mod feed;
pub mod items;
pub mod pipeline;
pub mod site;
pub mod util;
