//! The published state container: the source collection, its mutation
//! API, change notifications, and the persistence contract.
//!
//! `FeedStore` is the single piece of shared mutable state in the
//! pipeline. Mutations go through `&mut self`, so add/remove are
//! caller-serialized by construction; a bulk refresh fans its fetches
//! out concurrently but applies each source's merge after the join, so
//! every article collection updates atomically as a unit and the
//! collection itself needs no lock.

use std::path::Path;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::sync::broadcast;
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::feed::fetcher::{FetchError, Fetcher};
use crate::feed::reconcile;
use crate::model::{Article, Source};
use crate::util::{validate_feed_url, UrlError};

/// Capacity of the change-notification channel. Slow observers drop
/// events (broadcast lag), they never block mutations.
const EVENT_CAPACITY: usize = 64;

/// Change notifications emitted by [`FeedStore`] mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added(Uuid),
    Removed(Uuid),
    Refreshed(Uuid),
    /// Read/starred state changed on an article of the given source.
    Updated(Uuid),
    RefreshCompleted { refreshed: usize, failed: usize },
}

/// Errors surfaced by [`FeedStore::add_source`], the one operation that
/// reports failure synchronously.
#[derive(Debug, Error)]
pub enum AddError {
    #[error(transparent)]
    InvalidUrl(#[from] UrlError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read or write state file: {0}")]
    Io(#[from] std::io::Error),
    #[error("state file is not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct FeedStore {
    sources: Vec<Source>,
    fetcher: Fetcher,
    max_concurrent_fetches: usize,
    allow_private_hosts: bool,
    events: broadcast::Sender<StoreEvent>,
}

impl FeedStore {
    pub fn new(config: &Config) -> Self {
        Self::with_sources(config, Vec::new())
    }

    pub fn with_sources(config: &Config, sources: Vec<Source>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            sources,
            fetcher: Fetcher::new(config),
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
            allow_private_hosts: config.allow_private_hosts,
            events,
        }
    }

    /// Subscribes to change notifications. Any number of observers may
    /// listen; none is required.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: StoreEvent) {
        // No receivers is fine; notifications are best-effort.
        let _ = self.events.send(event);
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn source(&self, id: Uuid) -> Option<&Source> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Sorted, de-duplicated category labels across all sources.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .sources
            .iter()
            .filter_map(|s| s.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Subscribes to a new feed: fetch, extract, append.
    ///
    /// This is the non-reconciled path; a first fetch always yields
    /// articles in their default state. It is also the only operation
    /// that surfaces fetch/extract errors to the caller.
    pub async fn add_source(&mut self, url: &str) -> Result<&Source, AddError> {
        let url = validate_feed_url(url, self.allow_private_hosts)?;
        let source = self.fetcher.fetch_source(&url).await?;
        let id = source.id;
        tracing::info!(
            source = %url,
            title = %source.title,
            articles = source.articles.len(),
            "Subscribed"
        );

        self.sources.push(source);
        self.emit(StoreEvent::Added(id));
        let added = self.sources.len() - 1;
        Ok(&self.sources[added])
    }

    /// Removes a subscription; its articles go with it.
    pub fn remove_source(&mut self, id: Uuid) -> Option<Source> {
        let index = self.sources.iter().position(|s| s.id == id)?;
        let source = self.sources.remove(index);
        self.emit(StoreEvent::Removed(id));
        Some(source)
    }

    /// Refreshes one source, preserving read/starred flags through
    /// reconciliation. Never fails visibly: any error is logged and the
    /// source is left unchanged. Returns the current (possibly
    /// untouched) state, or `None` for an unknown id.
    pub async fn refresh_source(&mut self, id: Uuid) -> Option<&Source> {
        let index = self.sources.iter().position(|s| s.id == id)?;
        let url = self.sources[index].url.clone();

        match self.fetcher.fetch_source(&url).await {
            Ok(fresh) => {
                let merged = reconcile::merge(&self.sources[index], fresh);
                self.sources[index] = merged;
                self.emit(StoreEvent::Refreshed(id));
            }
            Err(e) => {
                tracing::warn!(source = %url, error = %e, "Refresh failed, keeping previous state");
            }
        }

        Some(&self.sources[index])
    }

    /// Refreshes every source, fanning fetches out concurrently and
    /// joining them all before returning. Each source's merge is applied
    /// as a unit; a failure on one source is logged and never affects
    /// its siblings.
    pub async fn refresh_all(&mut self) {
        if self.sources.is_empty() {
            return;
        }

        let jobs: Vec<(Uuid, Url)> = self
            .sources
            .iter()
            .map(|s| (s.id, s.url.clone()))
            .collect();

        let fetcher = &self.fetcher;
        let results: Vec<(Uuid, Result<Source, FetchError>)> = stream::iter(jobs)
            .map(|(id, url)| async move { (id, fetcher.fetch_source(&url).await) })
            .buffer_unordered(self.max_concurrent_fetches)
            .collect()
            .await;

        let mut refreshed = 0usize;
        let mut failed = 0usize;
        for (id, result) in results {
            match result {
                Ok(fresh) => {
                    if let Some(index) = self.sources.iter().position(|s| s.id == id) {
                        let merged = reconcile::merge(&self.sources[index], fresh);
                        self.sources[index] = merged;
                        self.emit(StoreEvent::Refreshed(id));
                        refreshed += 1;
                    }
                }
                Err(e) => {
                    failed += 1;
                    if let Some(source) = self.source(id) {
                        tracing::warn!(
                            source = %source.url,
                            error = %e,
                            "Refresh failed, keeping previous state"
                        );
                    }
                }
            }
        }

        tracing::debug!(refreshed, failed, "Bulk refresh complete");
        self.emit(StoreEvent::RefreshCompleted { refreshed, failed });
    }

    pub fn mark_read(&mut self, source_id: Uuid, article_id: Uuid) -> bool {
        self.set_read(source_id, article_id, true)
    }

    pub fn mark_unread(&mut self, source_id: Uuid, article_id: Uuid) -> bool {
        self.set_read(source_id, article_id, false)
    }

    fn set_read(&mut self, source_id: Uuid, article_id: Uuid, read: bool) -> bool {
        match self.article_mut(source_id, article_id) {
            Some(article) => article.read = read,
            None => return false,
        }
        self.emit(StoreEvent::Updated(source_id));
        true
    }

    /// Flips the starred flag, returning the new value, or `None` when
    /// the source/article pair is unknown.
    pub fn toggle_starred(&mut self, source_id: Uuid, article_id: Uuid) -> Option<bool> {
        let starred = match self.article_mut(source_id, article_id) {
            Some(article) => {
                article.starred = !article.starred;
                article.starred
            }
            None => return None,
        };
        self.emit(StoreEvent::Updated(source_id));
        Some(starred)
    }

    /// Sets or clears a source's category label.
    pub fn set_category(&mut self, source_id: Uuid, category: Option<String>) -> bool {
        match self.sources.iter_mut().find(|s| s.id == source_id) {
            Some(source) => source.category = category,
            None => return false,
        }
        self.emit(StoreEvent::Updated(source_id));
        true
    }

    pub fn mark_all_read(&mut self, source_id: Uuid) -> bool {
        match self.sources.iter_mut().find(|s| s.id == source_id) {
            Some(source) => {
                for article in &mut source.articles {
                    article.read = true;
                }
            }
            None => return false,
        }
        self.emit(StoreEvent::Updated(source_id));
        true
    }

    fn article_mut(&mut self, source_id: Uuid, article_id: Uuid) -> Option<&mut Article> {
        self.sources
            .iter_mut()
            .find(|s| s.id == source_id)?
            .articles
            .iter_mut()
            .find(|a| a.id == article_id)
    }

    /// Writes the full source collection as JSON, through a temp file
    /// and rename so the state file is never left partial.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&self.sources)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Loads a previously saved collection. A missing file yields an
    /// empty store.
    pub fn load(path: &Path, config: &Config) -> Result<Self, StoreError> {
        let sources = match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };
        Ok(Self::with_sources(config, sources))
    }
}
