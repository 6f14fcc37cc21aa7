//! The operations the chat front-end calls.
//!
//! [`Marketplace`] composes the catalog client, media resolver and map-link
//! parser with the pure filtering and ranking functions. Every method is
//! infallible from the caller's point of view: failures surface as empty
//! results, `None` or `""`.

use evmart_core::{AppConfig, CatalogKind, CatalogRecord, GeoCoordinate};
use evmart_geo::{GeoLinkParser, ProximityResult};
use evmart_search::{FilterSpec, Page};

use crate::client::{CatalogClient, CatalogClientConfig, FetchResult};
use crate::error::CatalogError;
use crate::media::{MediaConfig, MediaResolver};

#[derive(Debug, Clone)]
pub struct Marketplace {
    catalog: CatalogClient,
    media: MediaResolver,
    geo: GeoLinkParser,
}

impl Marketplace {
    /// Builds every collaborator from one configuration.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidBaseUrl`] if the API base URL is unusable.
    /// - [`CatalogError::Http`] / [`CatalogError::Geo`] if an HTTP client
    ///   cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, CatalogError> {
        let catalog = CatalogClient::new(CatalogClientConfig::from_app_config(config))?;
        let media = MediaResolver::new(MediaConfig::from_app_config(config))?;
        let geo = GeoLinkParser::new(config.redirect_timeout_secs, &config.user_agent)?;
        Ok(Self::new(catalog, media, geo))
    }

    #[must_use]
    pub fn new(catalog: CatalogClient, media: MediaResolver, geo: GeoLinkParser) -> Self {
        Self {
            catalog,
            media,
            geo,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub async fn fetch_all(&self, kind: CatalogKind) -> FetchResult {
        self.catalog.fetch_all(kind).await
    }

    pub async fn fetch_unique(&self, kind: CatalogKind, field: &str) -> Vec<String> {
        self.catalog.fetch_unique(kind, field).await
    }

    pub async fn fetch_by_id(&self, kind: CatalogKind, id: i64) -> Option<CatalogRecord> {
        self.catalog.fetch_by_id(kind, id).await
    }

    /// Filters the `kind` collection and returns one page of matches.
    pub async fn apply_filters(
        &self,
        kind: CatalogKind,
        spec: &FilterSpec,
        offset: usize,
        page_size: usize,
    ) -> Page<CatalogRecord> {
        let snapshot = self.catalog.fetch_all(kind).await;
        let matches = evmart_search::apply(snapshot.records(), spec);
        tracing::debug!(
            kind = %kind,
            total = snapshot.records().len(),
            matched = matches.len(),
            offset,
            "filters applied"
        );
        evmart_search::paginate(&matches, offset, page_size)
    }

    /// Nearest `limit` records of `kind` to `origin`, optionally restricted
    /// to those matching `spec` first.
    pub async fn rank_nearest(
        &self,
        kind: CatalogKind,
        origin: GeoCoordinate,
        limit: usize,
        spec: Option<&FilterSpec>,
    ) -> Vec<ProximityResult<CatalogRecord>> {
        let snapshot = self.catalog.fetch_all(kind).await;
        match spec {
            Some(spec) => {
                let subset = evmart_search::apply(snapshot.records(), spec);
                evmart_geo::rank_nearest(&subset, origin, limit, &self.geo).await
            }
            None => evmart_geo::rank_nearest(snapshot.records(), origin, limit, &self.geo).await,
        }
    }

    pub async fn resolve_image(&self, kind: CatalogKind, reference: &str) -> String {
        self.media.resolve(kind, reference).await
    }

    pub async fn resolve_gallery<S: AsRef<str>>(
        &self,
        kind: CatalogKind,
        gallery: &[S],
    ) -> Vec<String> {
        self.media.resolve_gallery(kind, gallery).await
    }

    pub async fn extract_coordinate(&self, link: &str) -> Option<GeoCoordinate> {
        self.geo.extract(link).await
    }
}
