//! Per-wire-format extraction strategies.
//!
//! The RSS 2.0 strategy extracts per field with compiled patterns rather
//! than running a structural XML parse. Real-world feeds are routinely
//! malformed, and independent per-field extraction lets one bad item be
//! skipped without invalidating the rest of the feed. Atom, JSON Feed,
//! and HTML scraping are declared but report themselves unsupported.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::feed::entities::{decode_entities, strip_cdata};
use crate::model::{Article, Source};

/// Substituted when a feed or item carries no description.
const NO_DESCRIPTION: &str = "No description available";

/// Extraction-time failures.
///
/// Only a missing channel title or an undecodable body aborts a feed;
/// malformed individual items are skipped, not escalated.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document has no `<title>` element. A feed with no title is
    /// considered unparseable.
    #[error("feed has no title")]
    MissingTitle,

    /// The response body is not valid UTF-8.
    #[error("feed is not valid UTF-8: {0}")]
    Decoding(#[from] std::str::Utf8Error),

    /// The format was recognized but no extraction strategy implements it.
    #[error("unsupported feed format")]
    UnsupportedFormat,

    /// The document was recognized but too damaged to extract.
    #[error("malformed feed: {0}")]
    Malformed(String),
}

struct Patterns {
    /// First `<title>` wins, both at channel level and inside an item.
    title: Regex,
    /// Channel-level description. Single line, like the title.
    description: Regex,
    item: Regex,
    /// Item descriptions routinely span lines.
    item_description: Regex,
    content_encoded: Regex,
    link: Regex,
    /// Self-closing/attribute link form some feeds emit instead.
    link_href: Regex,
    pub_date: Regex,
    author: Regex,
    img_src: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |pattern: &str| Regex::new(pattern).expect("extraction pattern compiles");
        Patterns {
            title: re(r"<title>(.*?)</title>"),
            description: re(r"<description>(.*?)</description>"),
            item: re(r"(?s)<item>(.*?)</item>"),
            item_description: re(r"(?s)<description>(.*?)</description>"),
            content_encoded: re(r"(?s)<content:encoded>(.*?)</content:encoded>"),
            link: re(r"<link>(.*?)</link>"),
            link_href: re(r#"<link [^>]*href="([^"]+)""#),
            pub_date: re(r"<pubDate>(.*?)</pubDate>"),
            author: re(r"<author>(.*?)</author>"),
            img_src: re(r#"<img[^>]+src="([^"]+)""#),
        }
    })
}

/// Extracts an RSS 2.0 document into a [`Source`].
///
/// The returned source carries a freshly generated id, shared by every
/// article's `source_id`; its `url` is the URL actually fetched, never a
/// URL found inside the document.
pub fn rss(bytes: &[u8], origin: &Url) -> Result<Source, ParseError> {
    let text = std::str::from_utf8(bytes)?;
    let p = patterns();

    let channel_title = p
        .title
        .captures(text)
        .map(|c| c[1].to_string())
        .ok_or(ParseError::MissingTitle)?;

    let channel_description = p
        .description
        .captures(text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let source_id = Uuid::new_v4();
    let articles = p
        .item
        .captures_iter(text)
        .filter_map(|item| extract_item(&item[1], source_id, &channel_title))
        .collect();

    Ok(Source {
        id: source_id,
        url: origin.clone(),
        title: channel_title,
        description: channel_description,
        category: None,
        icon: None,
        articles,
        last_refreshed: Utc::now(),
    })
}

/// Extracts one `<item>` block. Returns `None` when the item has no
/// title; a titleless item is dropped without affecting its siblings.
fn extract_item(body: &str, source_id: Uuid, source_title: &str) -> Option<Article> {
    let p = patterns();

    let title = p.title.captures(body).map(|c| c[1].to_string())?;

    let description = p
        .item_description
        .captures(body)
        .map(|c| strip_cdata(&c[1]).into_owned())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    // content:encoded wins over the description when present.
    let content = p
        .content_encoded
        .captures(body)
        .map(|c| strip_cdata(&c[1]).into_owned())
        .unwrap_or_else(|| description.clone());

    let link = p
        .link
        .captures(body)
        .and_then(|c| Url::parse(&c[1]).ok())
        .or_else(|| {
            p.link_href
                .captures(body)
                .and_then(|c| Url::parse(&c[1]).ok())
        });

    let published = p
        .pub_date
        .captures(body)
        .map(|c| parse_pub_date(&c[1]))
        .unwrap_or_else(Utc::now);

    let author = p.author.captures(body).map(|c| c[1].to_string());

    // Images are looked for in the description markup only, not the
    // whole item.
    let image = p
        .img_src
        .captures(&description)
        .and_then(|c| Url::parse(&c[1]).ok());

    Some(Article {
        id: Uuid::new_v4(),
        source_id,
        source_title: source_title.to_string(),
        title: decode_entities(&title),
        description: decode_entities(&description),
        content: decode_entities(&content),
        link,
        author,
        published,
        thumbnail: None,
        image,
        read: false,
        starred: false,
    })
}

/// RSS dates are RFC 822-style; some feeds emit ISO 8601 instead. A date
/// that parses as neither falls back to the current time rather than
/// blocking extraction.
fn parse_pub_date(raw: &str) -> DateTime<Utc> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Atom extraction is not implemented yet.
pub fn atom(_bytes: &[u8], _origin: &Url) -> Result<Source, ParseError> {
    Err(ParseError::UnsupportedFormat)
}

/// JSON Feed extraction is not implemented yet.
pub fn json(_bytes: &[u8], _origin: &Url) -> Result<Source, ParseError> {
    Err(ParseError::UnsupportedFormat)
}

/// Raw HTML scraping is not implemented yet.
pub fn html(_bytes: &[u8], _origin: &Url) -> Result<Source, ParseError> {
    Err(ParseError::UnsupportedFormat)
}
