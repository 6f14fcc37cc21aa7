//! Cached whole-collection fetches for `CatalogClient`.

use std::sync::Arc;

use evmart_core::{CatalogKind, CatalogRecord};
use reqwest::Url;
use serde_json::Value;

use crate::error::CatalogError;
use crate::normalize::normalize_items;

use super::{CatalogClient, FetchResult};

impl CatalogClient {
    /// Returns every record of `kind`.
    ///
    /// A snapshot within its TTL is served without a request. Otherwise one
    /// refresh runs per kind no matter how many callers arrive concurrently;
    /// they all receive its outcome. A failed refresh yields the previous
    /// snapshot as [`FetchResult::Stale`], or [`FetchResult::Empty`] if there
    /// is none. Never fails.
    pub async fn fetch_all(&self, kind: CatalogKind) -> FetchResult {
        if let Some(records) = self.cache.get_fresh(kind.slug()) {
            tracing::debug!(kind = %kind, records = records.len(), "catalog cache hit");
            return FetchResult::Fresh(records);
        }

        let this = self.clone();
        self.flights
            .run(kind.slug(), move || async move {
                // A flight that finished just before this one started may
                // already have stored a fresh snapshot.
                if let Some(records) = this.cache.get_fresh(kind.slug()) {
                    return FetchResult::Fresh(records);
                }
                this.refresh(kind).await
            })
            .await
    }

    /// Sorted distinct values of `field` across the `kind` collection.
    ///
    /// List fields contribute each element. Served from the same snapshot
    /// as [`Self::fetch_all`]; there is no dedicated endpoint.
    pub async fn fetch_unique(&self, kind: CatalogKind, field: &str) -> Vec<String> {
        evmart_search::unique_values(self.fetch_all(kind).await.records(), field)
    }

    async fn refresh(&self, kind: CatalogKind) -> FetchResult {
        match self.fetch_collection(kind).await {
            Ok(records) => {
                let records = Arc::new(records);
                self.cache.put(kind.slug(), Arc::clone(&records));
                tracing::info!(kind = %kind, records = records.len(), "catalog snapshot refreshed");
                FetchResult::Fresh(records)
            }
            Err(e) => {
                if let Some(previous) = self.cache.get(kind.slug()) {
                    tracing::warn!(
                        kind = %kind,
                        error = %e,
                        records = previous.len(),
                        "catalog refresh failed; serving stale snapshot"
                    );
                    FetchResult::Stale(previous)
                } else {
                    tracing::warn!(kind = %kind, error = %e, "catalog refresh failed; no snapshot cached");
                    FetchResult::Empty
                }
            }
        }
    }

    /// Downloads and normalizes the full `kind` collection.
    ///
    /// The first request asks for `initial_page_size` items. When the
    /// envelope advertises more via `totalItems`, a single follow-up request
    /// asks for all of them at once (capped at `max_page_size`). Partial
    /// results are never returned: either every request succeeds or the
    /// error propagates.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::get_payload`]. A body that is not a
    /// list shape is [`CatalogError::Deserialize`]; a non-empty list in which
    /// no item normalizes is [`CatalogError::Normalization`].
    pub(crate) async fn fetch_collection(
        &self,
        kind: CatalogKind,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        let lookups = if kind == CatalogKind::Vehicles {
            self.lookups().await
        } else {
            Arc::default()
        };

        let context = format!("{kind} collection");
        let url = self.collection_url(kind, self.config.initial_page_size)?;
        let (mut items, total) = self.get_collection(&url, &context).await?;

        if let Some(total) = total.filter(|t| *t > items.len() as u64) {
            let page_size = u32::try_from(total)
                .unwrap_or(u32::MAX)
                .min(self.config.max_page_size);
            if u64::from(page_size) < total {
                tracing::warn!(
                    kind = %kind,
                    total,
                    max_page_size = self.config.max_page_size,
                    "collection larger than max page size; snapshot will be truncated"
                );
            }
            tracing::debug!(kind = %kind, received = items.len(), total, "fetching full collection");
            let url = self.collection_url(kind, page_size)?;
            items = self.get_collection(&url, &context).await?.0;
        }

        let received = items.len();
        let records = normalize_items(kind, items, &lookups);
        if records.is_empty() && received > 0 {
            return Err(CatalogError::Normalization {
                kind: kind.to_string(),
                reason: format!("none of {received} items could be normalized"),
            });
        }
        Ok(records)
    }

    /// [`Self::get_payload`] narrowed to list responses.
    pub(crate) async fn get_collection(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<(Vec<Value>, Option<u64>), CatalogError> {
        self.get_payload(url, context)
            .await?
            .into_collection()
            .map_err(|source| CatalogError::Deserialize {
                context: context.to_owned(),
                source,
            })
    }
}
