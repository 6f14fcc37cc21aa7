//! Media reference resolution.
//!
//! Listings store images as bare filenames, upload-relative paths or full
//! URLs, with stray quotes and separators left over from comma-joined
//! galleries. [`MediaResolver::resolve`] turns one of those into a URL that
//! is known to serve an image, trying in order:
//!
//! 1. the object-storage CDN (`EVMART_MEDIA_STORAGE_BASE_URL`, if set);
//! 2. the origin API's upload directory;
//! 3. the per-kind placeholder image.
//!
//! Each candidate must answer `HEAD` with `200` and an `image/*` content
//! type. An empty string means "no image; render text only". Outcomes are
//! memoized, including failures.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use evmart_core::{AppConfig, CatalogKind};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, StatusCode};

use crate::cache::CacheStore;
use crate::error::CatalogError;
use crate::single_flight::SingleFlight;

/// Characters escaped when a reference is appended to a base URL. `%` and
/// `/` pass through so pre-encoded and nested paths survive.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const QUOTES: [char; 3] = ['"', '\'', '`'];

/// Shortest absolute URL accepted without probing.
const MIN_ABSOLUTE_URL_LEN: usize = 11;

#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub storage_base_url: Option<String>,
    pub uploads_base_url: String,
    pub placeholder_urls: BTreeMap<CatalogKind, String>,
    pub probe_timeout_secs: u64,
    pub memo_ttl: Duration,
    pub user_agent: String,
}

impl MediaConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            storage_base_url: config.media_storage_base_url.clone(),
            uploads_base_url: config.media_uploads_base_url.clone(),
            placeholder_urls: config.placeholder_urls.clone(),
            probe_timeout_secs: config.probe_timeout_secs,
            memo_ttl: Duration::from_secs(config.media_ttl_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Resolves raw media references to probed, servable URLs.
#[derive(Debug, Clone)]
pub struct MediaResolver {
    http: Client,
    config: Arc<MediaConfig>,
    memo: Arc<CacheStore<String>>,
    flights: Arc<SingleFlight<String>>,
}

impl MediaResolver {
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the probe client cannot be built.
    pub fn new(config: MediaConfig) -> Result<Self, CatalogError> {
        let memo = Arc::new(CacheStore::new(config.memo_ttl));
        Self::with_memo(config, memo)
    }

    /// Creates a resolver that memoizes into an existing cache.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the probe client cannot be built.
    pub fn with_memo(
        config: MediaConfig,
        memo: Arc<CacheStore<String>>,
    ) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.probe_timeout_secs))
            .connect_timeout(Duration::from_secs(config.probe_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
            memo,
            flights: Arc::new(SingleFlight::new()),
        })
    }

    /// Resolves one raw reference for a record of `kind`.
    ///
    /// Returns `""` when nothing servable was found. Never fails.
    pub async fn resolve(&self, kind: CatalogKind, raw: &str) -> String {
        let reference = normalize_reference(raw);
        if reference.is_empty() {
            return String::new();
        }
        if is_absolute(reference) {
            return accept_absolute(reference);
        }

        let key = format!("{kind}:{reference}");
        if let Some(url) = self.memo.get_fresh(&key) {
            tracing::debug!(kind = %kind, reference, url = %url, "media memo hit");
            return url;
        }

        let this = self.clone();
        let reference = reference.to_owned();
        let memo_key = key.clone();
        self.flights
            .run(&key, move || async move {
                let url = this.resolve_uncached(kind, &reference).await;
                this.memo.put(&memo_key, url.clone());
                url
            })
            .await
    }

    /// Resolves every entry of a gallery, in order, dropping entries that
    /// resolve to nothing. Entries may themselves be comma-separated lists.
    pub async fn resolve_gallery<S: AsRef<str>>(
        &self,
        kind: CatalogKind,
        gallery: &[S],
    ) -> Vec<String> {
        let references: Vec<&str> = gallery
            .iter()
            .flat_map(|entry| entry.as_ref().split(','))
            .map(normalize_reference)
            .filter(|r| !r.is_empty())
            .collect();

        futures::future::join_all(references.into_iter().map(|r| self.resolve(kind, r)))
            .await
            .into_iter()
            .filter(|url| !url.is_empty())
            .collect()
    }

    async fn resolve_uncached(&self, kind: CatalogKind, reference: &str) -> String {
        for candidate in self.candidates(kind, reference) {
            if self.probe(&candidate).await {
                tracing::debug!(kind = %kind, reference, url = %candidate, "media resolved");
                return candidate;
            }
        }
        tracing::debug!(kind = %kind, reference, "no media candidate served an image");
        String::new()
    }

    fn candidates(&self, kind: CatalogKind, reference: &str) -> Vec<String> {
        self.config
            .storage_base_url
            .iter()
            .chain(std::iter::once(&self.config.uploads_base_url))
            .map(|base| join_url(base, reference))
            .chain(self.config.placeholder_urls.get(&kind).cloned())
            .collect()
    }

    /// `true` when `url` answers `HEAD` with 200 and an image content type.
    async fn probe(&self, url: &str) -> bool {
        match self.http.head(url).send().await {
            Ok(resp) if resp.status() == StatusCode::OK => {
                let is_image = resp
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"));
                if !is_image {
                    tracing::debug!(url, "media probe returned non-image content");
                }
                is_image
            }
            Ok(resp) => {
                tracing::debug!(url, status = resp.status().as_u16(), "media probe rejected");
                false
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "media probe failed");
                false
            }
        }
    }
}

/// Strips surrounding whitespace and quotes, plus trailing `,`/`;` left
/// over from joined lists.
pub(crate) fn normalize_reference(raw: &str) -> &str {
    raw.trim_start_matches(|c: char| c.is_whitespace() || QUOTES.contains(&c))
        .trim_end_matches(|c: char| {
            c.is_whitespace() || QUOTES.contains(&c) || c == ',' || c == ';'
        })
}

fn is_absolute(reference: &str) -> bool {
    let lower = reference.get(..8).unwrap_or(reference).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn accept_absolute(reference: &str) -> String {
    if reference.contains('.') && reference.len() >= MIN_ABSOLUTE_URL_LEN {
        reference.to_owned()
    } else {
        String::new()
    }
}

/// Joins `base` and `reference` with exactly one `/`, escaping characters
/// that are not valid in a URL path.
pub(crate) fn join_url(base: &str, reference: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        utf8_percent_encode(reference.trim_start_matches('/'), PATH_ENCODE_SET)
    )
}
