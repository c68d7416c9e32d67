use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Why a candidate feed URL was rejected.
#[derive(Debug, Error)]
pub enum UrlError {
    /// The string could not be parsed as a URL.
    #[error("invalid URL: {0}")]
    Invalid(#[from] url::ParseError),

    /// Only http and https are fetchable.
    #[error("unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),

    /// Localhost, loopback, private, or link-local target.
    #[error("refusing to fetch from {0}")]
    ForbiddenHost(String),
}

/// Validates a string for use as a feed source URL.
///
/// Only http(s) URLs are accepted. Unless `allow_private_hosts` is set,
/// localhost and private/link-local addresses are rejected so a feed
/// list can never be pointed at internal services.
pub fn validate_feed_url(raw: &str, allow_private_hosts: bool) -> Result<Url, UrlError> {
    let url = Url::parse(raw)?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::UnsupportedScheme(other.to_owned())),
    }

    if allow_private_hosts {
        return Ok(url);
    }

    if let Some(host) = url.host_str() {
        if host.eq_ignore_ascii_case("localhost") {
            return Err(UrlError::ForbiddenHost(host.to_owned()));
        }

        // IPv6 hosts arrive bracketed
        let bare = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if let Ok(ip) = bare.parse::<IpAddr>() {
            if !is_public(&ip) {
                return Err(UrlError::ForbiddenHost(ip.to_string()));
            }
        }
    }

    Ok(url)
}

fn is_public(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified())
        }
        IpAddr::V6(v6) => {
            if v6.is_loopback() || v6.is_unspecified() {
                return false;
            }
            let head = v6.segments()[0];
            let unique_local = (head & 0xfe00) == 0xfc00;
            let link_local = (head & 0xffc0) == 0xfe80;
            !(unique_local || link_local)
        }
    }
}
