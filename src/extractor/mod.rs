//! Candidate URL extraction from raw search result HTML.
//!
//! The page is scanned as text rather than parsed: image URLs on result pages
//! mostly live inside inline script data, not in `<img>` tags.

pub mod model;
pub mod reject;

#[cfg(test)]
mod tests;

pub use model::CandidateUrl;

use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::trace;

use crate::config::Config;

/// URLs wrapped in double quotes.
static QUOTED_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(https?://[^"]*?\.(?:jpg|jpeg|png))""#).unwrap());

/// Any URL with an image extension.
static BARE_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(https?://[^"]*?\.(?:jpg|jpeg|png))"#).unwrap());

/// Pulls candidate image URLs out of search HTML.
#[derive(Debug, Clone)]
pub struct UrlExtractor {
    blocked_domains: Vec<String>,
}

impl UrlExtractor {
    pub fn new<I, S>(blocked_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocked_domains: blocked_domains.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.blocked_domains().iter().cloned())
    }

    /// Candidates in first-seen order, quoted matches before bare ones.
    ///
    /// Never fails; a page without matches gives an empty list.
    pub fn extract(&self, html: &str) -> Vec<CandidateUrl> {
        let text = unescape_slashes(html);

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        let quoted = QUOTED_URL_REGEX.captures_iter(&text).filter_map(|c| c.get(1));
        let bare = BARE_URL_REGEX.captures_iter(&text).filter_map(|c| c.get(1));

        for raw in quoted.chain(bare).map(|m| m.as_str()) {
            if seen.contains(raw) {
                continue;
            }
            if let Some(reason) = reject::rejection(raw, &self.blocked_domains) {
                trace!(url = raw, ?reason, "skipping match");
                continue;
            }
            seen.insert(raw.to_string());
            candidates.push(CandidateUrl::new(raw));
        }

        candidates
    }
}

/// Script payloads escape slashes as `\/`.
fn unescape_slashes(html: &str) -> Cow<'_, str> {
    if html.contains("\\/") {
        Cow::Owned(html.replace("\\/", "/"))
    } else {
        Cow::Borrowed(html)
    }
}
