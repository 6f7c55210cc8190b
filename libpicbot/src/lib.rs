//! fedi-picbot - post a random image from a catalog to the fediverse
//!
//! The catalog is a plain text file with one image per line:
//!
//! ```text
//! <reference>\t<sensitive>\t<attribution>
//! ```
//!
//! `reference` is an `http://`/`https://` URL or a path relative to the
//! images directory, `sensitive` is `true` or `false`, and `attribution` is
//! everything after the second tab. Each run picks one line uniformly at
//! random without loading the file into memory, opens the image, and posts
//! it with the caption `Source: <attribution>`.

pub mod config;
pub mod error;
pub mod logging;
pub mod picker;
pub mod platforms;
pub mod poster;
pub mod record;
pub mod registration;
pub mod resolver;
pub mod selector;
pub mod types;

/// Name the bot registers under and reports in its user agent.
pub const APP_NAME: &str = "fedi-picbot";

// Re-export commonly used types
pub use config::{Config, PostPaths};
pub use error::{PicbotError, Result};
pub use types::{CatalogRecord, ResolvedResource};
