//! Feed acquisition and normalization.
//!
//! The pipeline turns a URL into a normalized article collection:
//!
//! - [`fetcher`] - HTTP retrieval and wire-format dispatch
//! - [`extract`] - per-format extraction strategies (RSS 2.0 implemented;
//!   Atom, JSON Feed, and HTML scraping are declared stubs)
//! - [`entities`] - HTML entity decoding and CDATA unwrapping
//! - [`reconcile`] - merging a fresh fetch with previously stored state
//!   so read/starred flags survive refreshes

pub mod entities;
pub mod extract;
pub mod fetcher;
pub mod reconcile;

pub use entities::decode_entities;
pub use extract::ParseError;
pub use fetcher::{FetchError, Fetcher};
pub use reconcile::merge;
