//! Normalization from raw inventory API items to [`CatalogRecord`]s.
//!
//! Field-level leniency (numeric strings, comma lists) lives in
//! [`crate::types`]; this module applies the defaults and derivations each
//! record kind needs.

use std::collections::HashMap;
use std::sync::LazyLock;

use evmart_core::{Accessory, CatalogKind, CatalogRecord, ChargingStation, Garage, Vehicle};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CatalogError;
use crate::types::{RawAccessory, RawChargingStation, RawGarage, RawProduct};

const UNKNOWN: &str = "Unknown";
const UNKNOWN_MODEL: &str = "Unknown Model";
const DEFAULT_CURRENCY: &str = "USD";

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid regex"));

/// Id → name tables from `/Brand` and `/Category`, used to fill vehicle
/// fields the product payload omits.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    pub brands: HashMap<i64, String>,
    pub categories: HashMap<i64, String>,
}

impl Lookups {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty() && self.categories.is_empty()
    }
}

/// First four-digit `19xx`/`20xx` token in `text`.
#[must_use]
pub fn extract_year(text: &str) -> Option<i32> {
    YEAR_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Normalizes every item of a collection payload, preserving order.
///
/// Items that fail to normalize are logged and skipped; one bad listing
/// never sinks the whole snapshot.
#[must_use]
pub fn normalize_items(kind: CatalogKind, items: Vec<Value>, lookups: &Lookups) -> Vec<CatalogRecord> {
    let total = items.len();
    let records: Vec<CatalogRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match normalize_item(kind, item, lookups) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(kind = %kind, index, error = %e, "skipping malformed catalog item");
                None
            }
        })
        .collect();
    if records.len() < total {
        tracing::warn!(
            kind = %kind,
            kept = records.len(),
            skipped = total - records.len(),
            "catalog payload contained malformed items"
        );
    }
    records
}

/// Normalizes one raw item into a [`CatalogRecord`] of the given kind.
///
/// # Errors
///
/// - [`CatalogError::Deserialize`] if the item is not a JSON object of the
///   expected shape.
/// - [`CatalogError::Normalization`] if the item carries no usable `id`.
pub fn normalize_item(
    kind: CatalogKind,
    item: Value,
    lookups: &Lookups,
) -> Result<CatalogRecord, CatalogError> {
    match kind {
        CatalogKind::Vehicles => normalize_vehicle(decode(kind, item)?, lookups),
        CatalogKind::Accessories => normalize_accessory(decode(kind, item)?),
        CatalogKind::ChargingStations => normalize_station(decode(kind, item)?),
        CatalogKind::Garages => normalize_garage(decode(kind, item)?),
    }
}

fn decode<T: DeserializeOwned>(kind: CatalogKind, item: Value) -> Result<T, CatalogError> {
    serde_json::from_value(item).map_err(|source| CatalogError::Deserialize {
        context: format!("{kind} item"),
        source,
    })
}

fn require_id(kind: CatalogKind, id: Option<i64>) -> Result<i64, CatalogError> {
    id.ok_or_else(|| CatalogError::Normalization {
        kind: kind.slug().to_owned(),
        reason: "item has no id".into(),
    })
}

fn normalize_vehicle(raw: RawProduct, lookups: &Lookups) -> Result<CatalogRecord, CatalogError> {
    let id = require_id(CatalogKind::Vehicles, raw.id)?;

    let brand = raw
        .brand
        .or_else(|| raw.brand_id.and_then(|b| lookups.brands.get(&b).cloned()))
        .unwrap_or_else(|| UNKNOWN.to_owned());
    let category = raw
        .category
        .or_else(|| raw.category_id.and_then(|c| lookups.categories.get(&c).cloned()));
    let model = raw
        .model
        .or(raw.title)
        .unwrap_or_else(|| UNKNOWN_MODEL.to_owned());

    // An explicit year wins when plausible; otherwise mine the model text.
    let year = raw
        .year
        .filter(|y| (1900..=2100).contains(y))
        .and_then(|y| i32::try_from(y).ok())
        .or_else(|| extract_year(&model));

    Ok(CatalogRecord::Vehicle(Vehicle {
        id,
        brand,
        model,
        year,
        price: raw.price.unwrap_or(0.0),
        currency: raw
            .e_currency_type
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned()),
        description: raw.description,
        image: raw.image,
        gallery: raw.gallery,
        location: raw.location.unwrap_or_default(),
        color: raw.color,
        condition: raw.condition,
        phone: raw.phone_number,
        category,
        featured: raw.is_featured.unwrap_or(false),
        sku: raw.sku,
        map_link: raw.map_link,
        rating: raw.rating,
    }))
}

fn normalize_accessory(raw: RawAccessory) -> Result<CatalogRecord, CatalogError> {
    let id = require_id(CatalogKind::Accessories, raw.id)?;
    Ok(CatalogRecord::Accessory(Accessory {
        id,
        name: raw.name.unwrap_or_else(|| UNKNOWN.to_owned()),
        description: raw.description,
        image: raw.image,
        price: raw.price.unwrap_or(0.0),
        phone: raw.phone_number,
        rating: raw.rating,
        review_count: raw
            .review_count
            .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX)),
        weight: raw.weight,
        color: raw.color,
        category: raw.category,
        brand: raw.brand,
        location: raw.location.unwrap_or_default(),
        sku: raw.sku,
        compatible_models: raw.compatible_models,
    }))
}

fn normalize_station(raw: RawChargingStation) -> Result<CatalogRecord, CatalogError> {
    let id = require_id(CatalogKind::ChargingStations, raw.id)?;
    Ok(CatalogRecord::ChargingStation(ChargingStation {
        id,
        name: raw.name.unwrap_or_else(|| UNKNOWN.to_owned()),
        station_type: raw.station_type.unwrap_or_default(),
        capacity: raw.capacity,
        power_kw: raw.power_value.unwrap_or(0.0),
        price_per_kwh: raw.price_per_kwh.unwrap_or(0.0),
        phone: raw.phone_number,
        rating: raw.rating,
        // Stations are listed as available unless the API says otherwise.
        available: raw.availability.unwrap_or(true),
        location: raw.location.unwrap_or_default(),
        map_link: raw.map_link,
        connector_types: raw.connector_types,
        image: raw.image_url,
    }))
}

fn normalize_garage(raw: RawGarage) -> Result<CatalogRecord, CatalogError> {
    let id = require_id(CatalogKind::Garages, raw.id)?;
    Ok(CatalogRecord::Garage(Garage {
        id,
        name: raw.garage_name.unwrap_or_else(|| UNKNOWN.to_owned()),
        location: raw.location.unwrap_or_default(),
        rating: raw.rating,
        phone: raw.phone_number,
        service: raw.garage_service,
        image: raw.image_url,
        price_range: raw.price_range,
        contact_info: raw.contact_info,
        operating_hours: raw.operating_hours,
        latitude: raw.latitude,
        longitude: raw.longitude,
        map_link: raw.map_link,
    }))
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
