//! Core data model: a [`Source`] (a subscribed feed) and its [`Article`]s.
//!
//! Equality and hashing for both types are identifier-based, not
//! structural: two values with the same id are the same logical entity
//! even when every other field differs. This is what lets a refresh
//! replace an article's content in place while lookups keep working.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// A subscribed feed and its articles.
///
/// The `id` is assigned once at creation and never reassigned. It is the
/// join key used by reconciliation and by every status mutation, and it
/// survives re-fetches (see [`crate::feed::reconcile::merge`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: Uuid,
    /// The URL this feed was actually fetched from, never a URL found
    /// inside the document body.
    pub url: Url,
    pub title: String,
    pub description: String,
    /// User classification. Survives refresh.
    pub category: Option<String>,
    /// Raw icon bytes, if the caller stored any.
    #[serde(default)]
    pub icon: Option<Vec<u8>>,
    pub articles: Vec<Article>,
    pub last_refreshed: DateTime<Utc>,
}

impl Source {
    pub fn unread_count(&self) -> usize {
        self.articles.iter().filter(|a| !a.read).count()
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Source {}

impl std::hash::Hash for Source {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// One entry belonging to exactly one [`Source`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    /// Owning source (foreign key).
    pub source_id: Uuid,
    /// Denormalized owning-source title, so display never needs a join.
    pub source_title: String,
    pub title: String,
    pub description: String,
    /// Normalized content body: `content:encoded` when the feed carries
    /// it, the description otherwise. Entity-decoded.
    pub content: String,
    pub link: Option<Url>,
    pub author: Option<String>,
    pub published: DateTime<Utc>,
    pub thumbnail: Option<Url>,
    pub image: Option<Url>,
    /// Owned by the reconciler and the status mutations; a plain
    /// re-fetch never overwrites these.
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub starred: bool,
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Article {}

impl std::hash::Hash for Article {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
