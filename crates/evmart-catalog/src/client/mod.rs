//! HTTP client for the inventory API's catalog collections.

mod fetch_all;
mod lookup;

use std::sync::Arc;
use std::time::Duration;

use evmart_core::{AppConfig, CatalogKind, CatalogRecord};
use reqwest::{Client, StatusCode, Url};

use crate::cache::CacheStore;
use crate::error::CatalogError;
use crate::normalize::Lookups;
use crate::retry::retry_with_backoff;
use crate::single_flight::SingleFlight;
use crate::types::CollectionPayload;

/// Snapshot cache shared by every catalog kind, keyed by [`CatalogKind::slug`].
pub type CatalogCache = CacheStore<Arc<Vec<CatalogRecord>>>;

/// Seconds to assume when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Visible outcome of [`CatalogClient::fetch_all`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// Served from a snapshot within its TTL, or just refreshed.
    Fresh(Arc<Vec<CatalogRecord>>),
    /// The refresh failed; this is the last good snapshot.
    Stale(Arc<Vec<CatalogRecord>>),
    /// The refresh failed and nothing was cached yet.
    Empty,
}

impl FetchResult {
    #[must_use]
    pub fn records(&self) -> &[CatalogRecord] {
        match self {
            FetchResult::Fresh(records) | FetchResult::Stale(records) => records,
            FetchResult::Empty => &[],
        }
    }

    #[must_use]
    pub fn into_records(self) -> Arc<Vec<CatalogRecord>> {
        match self {
            FetchResult::Fresh(records) | FetchResult::Stale(records) => records,
            FetchResult::Empty => Arc::default(),
        }
    }

    #[must_use]
    pub fn is_fresh(&self) -> bool {
        matches!(self, FetchResult::Fresh(_))
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, FetchResult::Stale(_))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, FetchResult::Empty)
    }
}

#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    pub api_base_url: String,
    /// Whole-request timeout for catalog calls.
    pub timeout_secs: u64,
    pub user_agent: String,
    pub initial_page_size: u32,
    /// Cap on the `pageSize` of the follow-up "fetch everything" request.
    pub max_page_size: u32,
    /// Additional attempts after the first failure on transient errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub cache_ttl: Duration,
}

impl CatalogClientConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_base_url: config.api_base_url.clone(),
            timeout_secs: config.catalog_timeout_secs,
            user_agent: config.user_agent.clone(),
            initial_page_size: config.catalog_initial_page_size,
            max_page_size: config.catalog_max_page_size,
            max_retries: config.catalog_max_retries,
            backoff_base_ms: config.catalog_backoff_base_ms,
            cache_ttl: Duration::from_secs(config.catalog_ttl_secs),
        }
    }
}

/// Cached, coalesced access to the four catalog collections.
///
/// Cloning is cheap: the HTTP client, snapshot cache and in-flight map are
/// shared between clones.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    pub(super) http: Client,
    pub(super) base_url: Url,
    pub(super) cache: Arc<CatalogCache>,
    pub(super) lookups: Arc<CacheStore<Arc<Lookups>>>,
    pub(super) flights: Arc<SingleFlight<FetchResult>>,
    pub(super) config: CatalogClientConfig,
}

impl CatalogClient {
    /// Creates a client with its own snapshot cache.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidBaseUrl`] if `api_base_url` is not an
    ///   absolute http(s) URL.
    /// - [`CatalogError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogError> {
        let cache = Arc::new(CacheStore::new(config.cache_ttl));
        Self::with_cache(config, cache)
    }

    /// Creates a client that stores snapshots in an existing cache.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn with_cache(
        config: CatalogClientConfig,
        cache: Arc<CatalogCache>,
    ) -> Result<Self, CatalogError> {
        let base_url = parse_base_url(&config.api_base_url)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
            .user_agent(config.user_agent.as_str())
            .build()?;
        let lookups = Arc::new(CacheStore::new(config.cache_ttl));
        Ok(Self {
            http,
            base_url,
            cache,
            lookups,
            flights: Arc::new(SingleFlight::new()),
            config,
        })
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<CatalogCache> {
        &self.cache
    }

    #[must_use]
    pub fn config(&self) -> &CatalogClientConfig {
        &self.config
    }

    /// `{base}/{path}?page=1&pageSize={page_size}`.
    pub(crate) fn collection_url(
        &self,
        kind: CatalogKind,
        page_size: u32,
    ) -> Result<Url, CatalogError> {
        let mut url = self.endpoint_url(kind.api_path())?;
        url.query_pairs_mut()
            .append_pair("page", "1")
            .append_pair("pageSize", &page_size.to_string());
        Ok(url)
    }

    /// `{base}/{path}/{id}`.
    pub(crate) fn item_url(&self, kind: CatalogKind, id: i64) -> Result<Url, CatalogError> {
        self.endpoint_url(&format!("{}/{id}", kind.api_path()))
    }

    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url, CatalogError> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// GETs `url` and parses any of the accepted payload shapes, retrying
    /// transient failures.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::RateLimited`] on HTTP 429 after all retries.
    /// - [`CatalogError::NotFound`] on HTTP 404 (not retried).
    /// - [`CatalogError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`CatalogError::Http`] on network or timeout failure after all retries.
    /// - [`CatalogError::Deserialize`] if the body is not JSON.
    pub(crate) async fn get_payload(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<CollectionPayload, CatalogError> {
        retry_with_backoff(self.config.max_retries, self.config.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.http.get(url.clone()).send().await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                    return Err(CatalogError::RateLimited {
                        url: url.to_string(),
                        retry_after_secs,
                    });
                }

                if status == StatusCode::NOT_FOUND {
                    return Err(CatalogError::NotFound {
                        url: url.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(CatalogError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<CollectionPayload>(&body).map_err(|source| {
                    CatalogError::Deserialize {
                        context: context.to_owned(),
                        source,
                    }
                })
            }
        })
        .await
    }
}

/// Parses the API base into a URL whose path ends in exactly one `/`, so
/// that [`Url::join`] appends rather than replaces the last segment.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, CatalogError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(&format!("{trimmed}/")).map_err(|e| CatalogError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CatalogError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme \"{}\"", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
