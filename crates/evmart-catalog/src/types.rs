//! Wire types for the inventory API.
//!
//! ## Observed shapes
//!
//! ### Collections
//! `GET /{Product|Accessory|ChargingStation|Garage}` answers with an envelope
//! `{ "data": [...], "totalItems": n }`, but older deployments return a bare
//! array, and single-record endpoints return either the object itself or
//! `{ "data": { ... } }`. [`CollectionPayload`] accepts all of them;
//! [`CollectionPayload::into_collection`] narrows to the list shapes.
//!
//! ### Numbers
//! Prices, ratings and coordinates arrive as JSON numbers or as numeric
//! strings (`"25000"`, `"4.5"`). Empty strings and `null` mean absent.
//!
//! ### Lists
//! `gallery`, `connectorTypes` and `compatibleModels` are usually arrays of
//! strings, but some records store one comma-separated string instead (and
//! array elements may themselves contain commas). Both are flattened.
//!
//! Field names are camelCase; a few snake_case aliases seen in older data are
//! accepted too.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Any response body the collection or single-record endpoints return.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CollectionPayload {
    List(Vec<Value>),
    Envelope {
        data: EnvelopeData,
        #[serde(rename = "totalItems", default, deserialize_with = "lenient::opt_u64")]
        total_items: Option<u64>,
    },
    Single(serde_json::Map<String, Value>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EnvelopeData {
    Many(Vec<Value>),
    One(serde_json::Map<String, Value>),
    /// `"data": null`
    Nothing,
}

impl CollectionPayload {
    /// Splits the payload into its items and the advertised total, if any.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Value>, Option<u64>) {
        match self {
            CollectionPayload::List(items) => (items, None),
            CollectionPayload::Envelope { data, total_items } => {
                let items = match data {
                    EnvelopeData::Many(items) => items,
                    EnvelopeData::One(item) => vec![Value::Object(item)],
                    EnvelopeData::Nothing => Vec::new(),
                };
                (items, total_items)
            }
            CollectionPayload::Single(item) => (vec![Value::Object(item)], None),
        }
    }

    /// Like [`Self::into_parts`], but only for list responses: a bare array
    /// or an envelope whose `data` is an array or `null`.
    ///
    /// # Errors
    ///
    /// Returns an error for a bare object or an envelope wrapping one object.
    pub fn into_collection(self) -> Result<(Vec<Value>, Option<u64>), serde_json::Error> {
        match self {
            CollectionPayload::List(items) => Ok((items, None)),
            CollectionPayload::Envelope {
                data: EnvelopeData::Many(items),
                total_items,
            } => Ok((items, total_items)),
            CollectionPayload::Envelope {
                data: EnvelopeData::Nothing,
                total_items,
            } => Ok((Vec::new(), total_items)),
            CollectionPayload::Envelope {
                data: EnvelopeData::One(_),
                ..
            } => Err(serde::de::Error::custom(
                "expected `data` to be an array, found an object",
            )),
            CollectionPayload::Single(_) => Err(serde::de::Error::custom(
                "expected an array or a `data` envelope, found an object",
            )),
        }
    }
}

/// `/Product` item (a vehicle listing).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub brand: Option<String>,
    #[serde(default, alias = "brand_id", deserialize_with = "lenient::opt_i64")]
    pub brand_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub year: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price: Option<f64>,
    /// Currency code; the API names this `eCurrencyType`.
    #[serde(default, alias = "currency", deserialize_with = "lenient::opt_string")]
    pub e_currency_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub gallery: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,
    #[serde(default, alias = "category_id", deserialize_with = "lenient::opt_i64")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub is_featured: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub map_link: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAccessory {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub review_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub compatible_models: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChargingStation {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient::opt_string")]
    pub station_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub capacity: Option<String>,
    /// Rated output in kW.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub power_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price_per_kwh: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub availability: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub map_link: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub connector_types: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGarage {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub garage_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub garage_service: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub price_range: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub contact_info: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub operating_hours: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub map_link: Option<String>,
}

/// `/Brand` or `/Category` item.
#[derive(Debug, Deserialize)]
pub struct RawLookupEntry {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
}

/// Deserializers that accept the loosely-typed values the API emits.
pub(crate) mod lenient {
    use super::{Deserialize, Deserializer, Value};

    fn number_from(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
            _ => None,
        }
        .filter(|n| n.is_finite())
    }

    pub(crate) fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(number_from(&value))
    }

    pub(crate) fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match &value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
    }

    pub(crate) fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match &value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        })
    }

    pub(crate) fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match &value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|n| n != 0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }

    /// Trimmed text; numbers are stringified, blanks become `None`.
    pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => Some(s.trim().to_owned()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
        .filter(|s| !s.is_empty()))
    }

    /// Array of strings or a comma-separated string, flattened and trimmed.
    pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let pieces: Vec<String> = match value {
            Value::String(s) => vec![s],
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(pieces
            .iter()
            .flat_map(|piece| piece.split(','))
            .map(|s| s.trim().trim_matches(|c| c == '"' || c == '\'').trim())
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect())
    }
}
