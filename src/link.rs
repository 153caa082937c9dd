//! Spotify share link parsing
//!
//! Accepts the forms users paste from the Spotify apps:
//!
//! - `https://open.spotify.com/track/<id>?si=...` (scheme optional)
//! - `https://open.spotify.com/intl-de/album/<id>` (locale segment)
//! - `https://open.spotify.com/embed/playlist/<id>`
//! - `https://open.spotify.com/user/<uid>/playlist/<id>` (legacy)
//! - `spotify:artist:<id>`
//! - `https://spotify.link/<code>` short links, which only resolve over HTTP

use crate::error::{KeychainError, Result};
use crate::types::{EntityKind, SpotifyLink};
use reqwest::Url;

/// Hosts serving the Spotify web player
const WEB_HOSTS: &[&str] = &["open.spotify.com", "play.spotify.com"];

/// Hosts issuing redirecting short links
const SHORT_HOSTS: &[&str] = &["spotify.link", "spotify.app.link"];

/// Length of a base62 catalog id
pub const CATALOG_ID_LEN: usize = 22;

/// Outcome of parsing user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// The input named an entity directly
    Direct(SpotifyLink),
    /// A short link that must be resolved by following redirects
    Short(String),
}

/// Parse a pasted share link or URI
pub fn parse_link(input: &str) -> Result<LinkTarget> {
    let input = input.trim();
    if input.is_empty() {
        return Err(KeychainError::InvalidLink("empty input".to_string()));
    }

    if input
        .get(..8)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("spotify:"))
    {
        return parse_uri(input).map(LinkTarget::Direct);
    }

    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| KeychainError::InvalidLink(format!("{}: {}", input, e)))?;
    let host = url
        .host_str()
        .map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
        .ok_or_else(|| KeychainError::InvalidLink(format!("{}: missing host", input)))?;

    if SHORT_HOSTS.contains(&host.as_str()) {
        return Ok(LinkTarget::Short(url.to_string()));
    }

    if !WEB_HOSTS.contains(&host.as_str()) {
        return Err(KeychainError::InvalidLink(format!(
            "{} is not a Spotify host",
            host
        )));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segs| segs.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    parse_segments(&segments)
        .map(LinkTarget::Direct)
        .ok_or_else(|| KeychainError::InvalidLink(input.to_string()))
}

/// Parse a link and insist that it names an entity directly
pub fn parse_direct(input: &str) -> Result<SpotifyLink> {
    match parse_link(input)? {
        LinkTarget::Direct(link) => Ok(link),
        LinkTarget::Short(url) => Err(KeychainError::InvalidLink(format!(
            "{} did not resolve to a Spotify entity",
            url
        ))),
    }
}

fn parse_uri(input: &str) -> Result<SpotifyLink> {
    let parts: Vec<&str> = input.split(':').collect();
    let link = match parts.as_slice() {
        [_, "user", _, "playlist", id] => build_link("playlist", id),
        [_, kind, id] => build_link(kind, id),
        _ => None,
    };
    link.ok_or_else(|| KeychainError::InvalidLink(input.to_string()))
}

fn parse_segments(segments: &[&str]) -> Option<SpotifyLink> {
    let mut rest = segments;
    if rest.first().is_some_and(|s| s.starts_with("intl-")) {
        rest = &rest[1..];
    }
    if rest.first() == Some(&"embed") {
        rest = &rest[1..];
    }

    match rest {
        ["user", _, "playlist", id, ..] => build_link("playlist", id),
        [kind, id, ..] => build_link(kind, id),
        _ => None,
    }
}

fn build_link(kind: &str, id: &str) -> Option<SpotifyLink> {
    let kind: EntityKind = kind.parse().ok()?;
    is_valid_id(kind, id).then(|| SpotifyLink::new(kind, id))
}

/// Check an id against the rules Spotify uses for the given kind
pub fn is_valid_id(kind: EntityKind, id: &str) -> bool {
    if kind.has_catalog_id() {
        id.len() == CATALOG_ID_LEN && id.chars().all(|c| c.is_ascii_alphanumeric())
    } else {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    }
}
