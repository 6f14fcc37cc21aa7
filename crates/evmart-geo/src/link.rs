//! Coordinate extraction from free-text map links.
//!
//! Inventory records carry whatever the operator pasted into the "map link"
//! field: full Google Maps URLs, shortened share links, or text wrapped in
//! stray quotes and backticks. Extraction never fails loudly; anything that
//! cannot be turned into a valid coordinate yields `None`.

use std::sync::LazyLock;
use std::time::Duration;

use evmart_core::GeoCoordinate;
use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::GeoError;

/// Hosts whose links must be expanded through a redirect before parsing.
pub const DEFAULT_SHORT_LINK_HOSTS: &[&str] = &["maps.app.goo.gl", "goo.gl"];

const MAX_REDIRECTS: usize = 5;

const NOISE_CHARS: &[char] = &['`', '´', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '"', '\''];

// Tried in order; the first pattern yielding an in-range pair wins.
static COORDINATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["@", "q=", "ll=", "center="]
        .iter()
        .map(|prefix| {
            Regex::new(&format!(
                r"{prefix}(-?\d+(?:\.\d+)?),\s*(-?\d+(?:\.\d+)?)"
            ))
            .expect("valid coordinate regex")
        })
        .collect()
});

/// Strips quoting noise and surrounding whitespace from a raw map link.
fn clean_link(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !NOISE_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Parses a coordinate out of map-link text without any network access.
///
/// Recognises `@lat,lng`, `q=lat,lng`, `ll=lat,lng` and `center=lat,lng`
/// (in that order of preference), after removing quote characters and
/// percent-decoding. Out-of-range pairs are rejected.
#[must_use]
pub fn parse_coordinate(text: &str) -> Option<GeoCoordinate> {
    let cleaned = clean_link(text);
    if cleaned.is_empty() {
        return None;
    }
    let decoded = percent_decode_str(&cleaned).decode_utf8_lossy();

    COORDINATE_PATTERNS.iter().find_map(|re| {
        let caps = re.captures(&decoded)?;
        let lat = caps.get(1)?.as_str().parse::<f64>().ok()?;
        let lng = caps.get(2)?.as_str().parse::<f64>().ok()?;
        GeoCoordinate::new(lat, lng)
    })
}

/// Resolves map links to coordinates, following one redirect chain for
/// shortened share links.
#[derive(Debug, Clone)]
pub struct GeoLinkParser {
    client: reqwest::Client,
    short_link_hosts: Vec<String>,
}

impl GeoLinkParser {
    /// Creates a parser whose redirect requests time out after
    /// `timeout_secs` and follow at most five hops.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, GeoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(5)))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            short_link_hosts: DEFAULT_SHORT_LINK_HOSTS
                .iter()
                .map(|h| (*h).to_owned())
                .collect(),
        })
    }

    /// Replaces the set of hosts treated as shortened redirect links.
    #[must_use]
    pub fn with_short_link_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.short_link_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Extracts a coordinate from `link`, expanding shortened links first.
    ///
    /// Returns `None` when the link is empty, the redirect cannot be
    /// followed, or no recognised pattern is present.
    pub async fn extract(&self, link: &str) -> Option<GeoCoordinate> {
        let cleaned = clean_link(link);
        if cleaned.is_empty() {
            return None;
        }

        if !self.is_short_link(&cleaned) {
            return parse_coordinate(&cleaned);
        }

        match self.expand(&cleaned).await {
            Ok(expanded) => {
                tracing::debug!(link = %cleaned, expanded = %expanded, "expanded short map link");
                parse_coordinate(&expanded)
            }
            Err(e) => {
                tracing::warn!(link = %cleaned, error = %e, "short map link could not be expanded");
                None
            }
        }
    }

    fn is_short_link(&self, link: &str) -> bool {
        reqwest::Url::parse(link).ok().is_some_and(|url| {
            url.host_str().is_some_and(|host| {
                self.short_link_hosts
                    .iter()
                    .any(|h| host.eq_ignore_ascii_case(h))
            })
        })
    }

    /// Follows the redirect chain with a single `HEAD` and returns the final URL.
    async fn expand(&self, link: &str) -> Result<String, GeoError> {
        let response = self.client.head(link).send().await?;
        Ok(response.url().to_string())
    }
}
