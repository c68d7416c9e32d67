//! Refresh reconciliation: carrying user state across re-fetches.
//!
//! Identifiers are regenerated on every fetch, so freshly extracted
//! articles cannot be paired with stored ones by id. Matching is a
//! heuristic: exact link equality first, then exact title equality,
//! first match wins. Duplicate titles within one feed therefore all
//! resolve against the first stored article with that title; callers
//! should not assume a stronger key.

use crate::model::{Article, Source};

/// Merges a freshly fetched source against the previously stored one.
/// Never fails.
///
/// The result keeps `previous`'s identity and category, takes `fresh`'s
/// title, description, articles, and timestamps, and copies read/starred
/// flags onto every fresh article with a stored match. Unmatched fresh
/// articles keep their defaults (unread, unstarred). Every merged
/// article's `source_id` is rewritten to the surviving identifier.
pub fn merge(previous: &Source, mut fresh: Source) -> Source {
    for article in &mut fresh.articles {
        article.source_id = previous.id;
        if let Some(prior) = find_prior(previous, article) {
            article.read = prior.read;
            article.starred = prior.starred;
        }
    }

    fresh.id = previous.id;
    fresh.category = previous.category.clone();
    fresh
}

/// Link equality applies only when the fresh article has a link; two
/// absent links are not a match (the title rule covers those).
fn find_prior<'a>(previous: &'a Source, fresh: &Article) -> Option<&'a Article> {
    if fresh.link.is_some() {
        if let Some(found) = previous.articles.iter().find(|p| p.link == fresh.link) {
            return Some(found);
        }
    }
    previous.articles.iter().find(|p| p.title == fresh.title)
}
