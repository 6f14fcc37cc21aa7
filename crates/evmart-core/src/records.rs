//! Normalized catalog records for the four marketplace domains.
//!
//! Records are produced by normalization during a catalog fetch and are
//! immutable afterwards; a refresh replaces the whole snapshot.

use serde::{Deserialize, Serialize};

use crate::{CoreError, GeoCoordinate};

/// One of the listing domains served by the inventory API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogKind {
    Vehicles,
    Accessories,
    ChargingStations,
    Garages,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 4] = [
        CatalogKind::Vehicles,
        CatalogKind::Accessories,
        CatalogKind::ChargingStations,
        CatalogKind::Garages,
    ];

    /// Collection path on the inventory API, e.g. `"ChargingStation"`.
    #[must_use]
    pub fn api_path(self) -> &'static str {
        match self {
            CatalogKind::Vehicles => "Product",
            CatalogKind::Accessories => "Accessory",
            CatalogKind::ChargingStations => "ChargingStation",
            CatalogKind::Garages => "Garage",
        }
    }

    /// Stable lowercase identifier used in cache keys and on the CLI.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            CatalogKind::Vehicles => "vehicles",
            CatalogKind::Accessories => "accessories",
            CatalogKind::ChargingStations => "charging-stations",
            CatalogKind::Garages => "garages",
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for CatalogKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "vehicles" | "vehicle" | "cars" | "car" => Ok(CatalogKind::Vehicles),
            "accessories" | "accessory" => Ok(CatalogKind::Accessories),
            "charging-stations" | "charging-station" | "stations" => {
                Ok(CatalogKind::ChargingStations)
            }
            "garages" | "garage" => Ok(CatalogKind::Garages),
            _ => Err(CoreError::UnknownCatalogKind(s.to_owned())),
        }
    }
}

/// A vehicle listing (`/Product` on the inventory API).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub brand: String,
    pub model: String,
    /// Model year parsed from the model text, when one is present.
    pub year: Option<i32>,
    pub price: f64,
    pub currency: String,
    pub description: Option<String>,
    /// Raw image reference as stored upstream (filename or absolute URL).
    pub image: Option<String>,
    pub gallery: Vec<String>,
    pub location: String,
    pub color: Option<String>,
    pub condition: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub featured: bool,
    pub sku: Option<String>,
    pub map_link: Option<String>,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: f64,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub review_count: u32,
    /// Weight in kilograms.
    pub weight: Option<f64>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub location: String,
    pub sku: Option<String>,
    pub compatible_models: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingStation {
    pub id: i64,
    pub name: String,
    /// Charger class as reported upstream, e.g. `"DC Fast"`.
    pub station_type: String,
    pub capacity: Option<String>,
    /// Rated output in kW.
    pub power_kw: f64,
    pub price_per_kwh: f64,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub available: bool,
    pub location: String,
    pub map_link: Option<String>,
    pub connector_types: Vec<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garage {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub rating: Option<f64>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub image: Option<String>,
    /// Free-text price band, e.g. `"$20 - $50"`.
    pub price_range: Option<String>,
    pub contact_info: Option<String>,
    pub operating_hours: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub map_link: Option<String>,
}

/// A normalized record from any of the four catalog domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogRecord {
    Vehicle(Vehicle),
    Accessory(Accessory),
    ChargingStation(ChargingStation),
    Garage(Garage),
}

impl CatalogRecord {
    #[must_use]
    pub fn kind(&self) -> CatalogKind {
        match self {
            CatalogRecord::Vehicle(_) => CatalogKind::Vehicles,
            CatalogRecord::Accessory(_) => CatalogKind::Accessories,
            CatalogRecord::ChargingStation(_) => CatalogKind::ChargingStations,
            CatalogRecord::Garage(_) => CatalogKind::Garages,
        }
    }

    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            CatalogRecord::Vehicle(v) => v.id,
            CatalogRecord::Accessory(a) => a.id,
            CatalogRecord::ChargingStation(s) => s.id,
            CatalogRecord::Garage(g) => g.id,
        }
    }

    /// Human-facing title. Vehicles combine brand and model.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            CatalogRecord::Vehicle(v) => {
                if v.brand.is_empty() {
                    v.model.clone()
                } else {
                    format!("{} {}", v.brand, v.model)
                }
            }
            CatalogRecord::Accessory(a) => a.name.clone(),
            CatalogRecord::ChargingStation(s) => s.name.clone(),
            CatalogRecord::Garage(g) => g.name.clone(),
        }
    }

    /// Primary numeric price: listing price, or price per kWh for stations.
    /// Garages only publish a free-text price band.
    #[must_use]
    pub fn price(&self) -> Option<f64> {
        match self {
            CatalogRecord::Vehicle(v) => Some(v.price),
            CatalogRecord::Accessory(a) => Some(a.price),
            CatalogRecord::ChargingStation(s) => Some(s.price_per_kwh),
            CatalogRecord::Garage(_) => None,
        }
    }

    #[must_use]
    pub fn location(&self) -> &str {
        match self {
            CatalogRecord::Vehicle(v) => &v.location,
            CatalogRecord::Accessory(a) => &a.location,
            CatalogRecord::ChargingStation(s) => &s.location,
            CatalogRecord::Garage(g) => &g.location,
        }
    }

    #[must_use]
    pub fn rating(&self) -> Option<f64> {
        match self {
            CatalogRecord::Vehicle(v) => v.rating,
            CatalogRecord::Accessory(a) => a.rating,
            CatalogRecord::ChargingStation(s) => s.rating,
            CatalogRecord::Garage(g) => g.rating,
        }
    }

    #[must_use]
    pub fn image_ref(&self) -> Option<&str> {
        match self {
            CatalogRecord::Vehicle(v) => v.image.as_deref(),
            CatalogRecord::Accessory(a) => a.image.as_deref(),
            CatalogRecord::ChargingStation(s) => s.image.as_deref(),
            CatalogRecord::Garage(g) => g.image.as_deref(),
        }
    }

    /// Raw map-link text as stored upstream. Accessories carry none.
    #[must_use]
    pub fn map_link(&self) -> Option<&str> {
        match self {
            CatalogRecord::Vehicle(v) => v.map_link.as_deref(),
            CatalogRecord::Accessory(_) => None,
            CatalogRecord::ChargingStation(s) => s.map_link.as_deref(),
            CatalogRecord::Garage(g) => g.map_link.as_deref(),
        }
    }

    /// Coordinates published directly by the API (garages only), validated.
    #[must_use]
    pub fn explicit_coordinate(&self) -> Option<GeoCoordinate> {
        match self {
            CatalogRecord::Garage(Garage {
                latitude: Some(lat),
                longitude: Some(lng),
                ..
            }) => GeoCoordinate::new(*lat, *lng),
            _ => None,
        }
    }
}
