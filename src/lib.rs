//! # preen
//!
//! A feed acquisition and normalization pipeline.
//!
//! Given a URL, preen fetches the remote content, determines its wire
//! format, extracts a normalized article collection, and reconciles it
//! with previously stored state so read/starred flags survive refreshes.
//!
//! ```text
//! FeedStore -> Fetcher -> extract -> entities -> Source -> reconcile -> FeedStore
//! ```
//!
//! - [`model`]: the core data model ([`Source`], [`Article`])
//! - [`feed`]: fetching, format dispatch, extraction, reconciliation
//! - [`store`]: the published state container and fetch orchestrator
//! - [`config`]: optional TOML configuration
//! - [`util`]: feed-URL validation
//!
//! The UI shell that consumes this crate lives elsewhere; everything
//! here is framework-free. See `src/main.rs` for a minimal CLI
//! collaborator.

pub mod config;
pub mod feed;
pub mod model;
pub mod store;
pub mod util;

pub use config::Config;
pub use feed::entities::decode_entities;
pub use feed::extract::ParseError;
pub use feed::fetcher::{FetchError, Fetcher};
pub use model::{Article, Source};
pub use store::{AddError, FeedStore, StoreError, StoreEvent};
