//! Single-record lookups and the brand/category id tables.

use std::collections::HashMap;
use std::sync::Arc;

use evmart_core::{CatalogKind, CatalogRecord};

use crate::error::CatalogError;
use crate::normalize::{normalize_item, Lookups};
use crate::types::RawLookupEntry;

use super::CatalogClient;

const LOOKUPS_KEY: &str = "lookups";
const BRAND_PATH: &str = "Brand";
const CATEGORY_PATH: &str = "Category";

impl CatalogClient {
    /// Returns the record of `kind` with the given id.
    ///
    /// Tries `GET {base}/{path}/{id}` first. When that fails, or its payload
    /// does not normalize to a record with the requested id, falls back to a
    /// scan of [`Self::fetch_all`].
    pub async fn fetch_by_id(&self, kind: CatalogKind, id: i64) -> Option<CatalogRecord> {
        match self.fetch_one(kind, id).await {
            Ok(Some(record)) => return Some(record),
            Ok(None) => {
                tracing::debug!(kind = %kind, id, "item payload unusable; scanning collection");
            }
            Err(e) => {
                tracing::debug!(kind = %kind, id, error = %e, "item lookup failed; scanning collection");
            }
        }

        self.fetch_all(kind)
            .await
            .records()
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }

    async fn fetch_one(
        &self,
        kind: CatalogKind,
        id: i64,
    ) -> Result<Option<CatalogRecord>, CatalogError> {
        let url = self.item_url(kind, id)?;
        let (items, _) = self
            .get_payload(&url, &format!("{kind} item {id}"))
            .await?
            .into_parts();

        // Only already-cached tables; a single lookup is not worth two more
        // requests.
        let lookups = self.lookups.get(LOOKUPS_KEY).unwrap_or_default();
        Ok(items
            .into_iter()
            .filter_map(|item| normalize_item(kind, item, &lookups).ok())
            .find(|record| record.id() == id))
    }

    /// Brand and category tables for vehicle normalization, fetched
    /// best-effort.
    ///
    /// A table that fails to load is taken from the previous successful
    /// load if there is one, else left empty; vehicles then rely on the
    /// names in their own payload.
    pub(crate) async fn lookups(&self) -> Arc<Lookups> {
        if let Some(lookups) = self.lookups.get_fresh(LOOKUPS_KEY) {
            return lookups;
        }

        let (brands, categories) = tokio::join!(
            self.fetch_lookup_table(BRAND_PATH),
            self.fetch_lookup_table(CATEGORY_PATH)
        );
        let previous = self.lookups.get(LOOKUPS_KEY);
        let complete = brands.is_ok() && categories.is_ok();

        let brands = brands.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "brand lookup unavailable");
            previous
                .as_ref()
                .map(|p| p.brands.clone())
                .unwrap_or_default()
        });
        let categories = categories.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "category lookup unavailable");
            previous
                .as_ref()
                .map(|p| p.categories.clone())
                .unwrap_or_default()
        });

        let lookups = Arc::new(Lookups { brands, categories });
        if lookups.is_empty() {
            tracing::debug!("no brand or category names loaded; vehicles use payload names");
        }
        if complete {
            self.lookups.put(LOOKUPS_KEY, Arc::clone(&lookups));
        }
        lookups
    }

    async fn fetch_lookup_table(&self, path: &str) -> Result<HashMap<i64, String>, CatalogError> {
        let url = self.endpoint_url(path)?;
        let (items, _) = self.get_collection(&url, path).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<RawLookupEntry>(item).ok())
            .filter_map(|entry| Some((entry.id?, entry.name?)))
            .collect())
    }
}
