//! HTTP fetching and wire-format dispatch.
//!
//! One GET per fetch. The response's declared `Content-Type` picks the
//! extraction strategy when it can; otherwise the dispatcher sniffs by
//! trying each strategy in a fixed order. A matched hint commits: if it
//! points at an unimplemented format the fetch fails fast rather than
//! falling back, so a correctly-labelled Atom feed reports "unsupported"
//! instead of producing garbage through the RSS patterns.

use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::feed::extract::{self, ParseError};
use crate::model::Source;

/// Errors crossing the network boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP response with a non-2xx status code.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// Request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Response body exceeded the configured size limit.
    #[error("response too large")]
    ResponseTooLarge,

    /// The body arrived but could not be extracted.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Rss,
    Atom,
    Json,
}

/// Maps a declared Content-Type to a strategy. Substring matching
/// tolerates charset parameters and vendor suffixes.
fn declared_format(content_type: &str) -> Option<Format> {
    if content_type.contains("application/rss+xml")
        || content_type.contains("application/xml")
        || content_type.contains("text/xml")
    {
        Some(Format::Rss)
    } else if content_type.contains("application/atom+xml") {
        Some(Format::Atom)
    } else if content_type.contains("application/json") {
        Some(Format::Json)
    } else {
        None
    }
}

/// Hintless path: try each strategy in a fixed order, stopping at the
/// first success and keeping the last error when none succeeds.
fn sniff(bytes: &[u8], url: &Url) -> Result<Source, ParseError> {
    extract::rss(bytes, url)
        .or_else(|_| extract::atom(bytes, url))
        .or_else(|_| extract::json(bytes, url))
        .or_else(|_| extract::html(bytes, url))
}

/// HTTP client wrapper that turns a feed URL into a normalized [`Source`].
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_response_bytes: usize,
}

impl Fetcher {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            timeout: Duration::from_secs(config.fetch_timeout_secs),
            max_response_bytes: config.max_response_bytes,
        }
    }

    /// Fetches `url` and extracts it into a [`Source`].
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`] / [`FetchError::Timeout`] for transport
    ///   failures
    /// - [`FetchError::HttpStatus`] for non-2xx responses
    /// - [`FetchError::ResponseTooLarge`] past the configured body cap
    /// - [`FetchError::Parse`] when no strategy can extract the body
    pub async fn fetch_source(&self, url: &Url) -> Result<Source, FetchError> {
        let response = tokio::time::timeout(self.timeout, self.client.get(url.clone()).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let bytes = self.read_limited(response).await?;

        match content_type.as_deref().and_then(declared_format) {
            Some(Format::Rss) => Ok(extract::rss(&bytes, url)?),
            Some(Format::Atom) => Ok(extract::atom(&bytes, url)?),
            Some(Format::Json) => Ok(extract::json(&bytes, url)?),
            None => Ok(sniff(&bytes, url)?),
        }
    }

    /// Streams the body with a running size check so an oversized or
    /// lying Content-Length can't exhaust memory.
    async fn read_limited(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        if let Some(len) = response.content_length() {
            if len as usize > self.max_response_bytes {
                return Err(FetchError::ResponseTooLarge);
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(FetchError::Network)?;
            if bytes.len().saturating_add(chunk.len()) > self.max_response_bytes {
                return Err(FetchError::ResponseTooLarge);
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}
