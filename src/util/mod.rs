//! Shared helpers.

mod urlcheck;

pub use urlcheck::{validate_feed_url, UrlError};
