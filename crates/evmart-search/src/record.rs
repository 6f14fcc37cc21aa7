//! Field projection for the four catalog record kinds.

use evmart_core::{Accessory, CatalogRecord, ChargingStation, Garage, Vehicle};

use crate::field::{FieldValue, Filterable};

const VEHICLE_KEYWORDS: &[&str] = &[
    "name",
    "brand",
    "model",
    "category",
    "color",
    "location",
    "description",
];
const ACCESSORY_KEYWORDS: &[&str] = &[
    "name",
    "brand",
    "category",
    "location",
    "description",
    "compatible_models",
];
const STATION_KEYWORDS: &[&str] = &["name", "type", "location", "connector_types"];
const GARAGE_KEYWORDS: &[&str] = &["name", "service", "location"];

impl Filterable for CatalogRecord {
    fn field(&self, name: &str) -> Option<FieldValue> {
        if name == "id" {
            #[allow(clippy::cast_precision_loss)]
            return Some(FieldValue::Number(self.id() as f64));
        }
        match self {
            CatalogRecord::Vehicle(v) => vehicle_field(v, name, self),
            CatalogRecord::Accessory(a) => accessory_field(a, name),
            CatalogRecord::ChargingStation(s) => station_field(s, name),
            CatalogRecord::Garage(g) => garage_field(g, name),
        }
    }

    fn keyword_fields(&self) -> &'static [&'static str] {
        match self {
            CatalogRecord::Vehicle(_) => VEHICLE_KEYWORDS,
            CatalogRecord::Accessory(_) => ACCESSORY_KEYWORDS,
            CatalogRecord::ChargingStation(_) => STATION_KEYWORDS,
            CatalogRecord::Garage(_) => GARAGE_KEYWORDS,
        }
    }
}

fn vehicle_field(v: &Vehicle, name: &str, record: &CatalogRecord) -> Option<FieldValue> {
    match name {
        "name" => FieldValue::text(Some(record.display_name().as_str())),
        "brand" => FieldValue::text(Some(v.brand.as_str())),
        "model" => FieldValue::text(Some(v.model.as_str())),
        "category" => FieldValue::text(v.category.as_deref()),
        "color" => FieldValue::text(v.color.as_deref()),
        "condition" => FieldValue::text(v.condition.as_deref()),
        "location" => FieldValue::text(Some(v.location.as_str())),
        "currency" => FieldValue::text(Some(v.currency.as_str())),
        "description" => FieldValue::text(v.description.as_deref()),
        "sku" => FieldValue::text(v.sku.as_deref()),
        "price" => FieldValue::number(Some(v.price)),
        "year" => FieldValue::number(v.year.map(f64::from)),
        "rating" => FieldValue::number(v.rating),
        "featured" => Some(FieldValue::Flag(v.featured)),
        _ => None,
    }
}

fn accessory_field(a: &Accessory, name: &str) -> Option<FieldValue> {
    match name {
        "name" => FieldValue::text(Some(a.name.as_str())),
        "brand" => FieldValue::text(a.brand.as_deref()),
        "category" => FieldValue::text(a.category.as_deref()),
        "color" => FieldValue::text(a.color.as_deref()),
        "location" => FieldValue::text(Some(a.location.as_str())),
        "description" => FieldValue::text(a.description.as_deref()),
        "sku" => FieldValue::text(a.sku.as_deref()),
        "price" => FieldValue::number(Some(a.price)),
        "rating" => FieldValue::number(a.rating),
        "review_count" => Some(FieldValue::Number(f64::from(a.review_count))),
        "weight" => FieldValue::number(a.weight),
        "compatible_models" => list(&a.compatible_models),
        _ => None,
    }
}

fn station_field(s: &ChargingStation, name: &str) -> Option<FieldValue> {
    match name {
        "name" => FieldValue::text(Some(s.name.as_str())),
        "type" => FieldValue::text(Some(s.station_type.as_str())),
        "location" => FieldValue::text(Some(s.location.as_str())),
        "capacity" => FieldValue::text(s.capacity.as_deref()),
        "power" => FieldValue::number(Some(s.power_kw)),
        "price" => FieldValue::number(Some(s.price_per_kwh)),
        "rating" => FieldValue::number(s.rating),
        "availability" => Some(FieldValue::Flag(s.available)),
        "connector_types" => list(&s.connector_types),
        _ => None,
    }
}

fn garage_field(g: &Garage, name: &str) -> Option<FieldValue> {
    match name {
        "name" => FieldValue::text(Some(g.name.as_str())),
        "service" => FieldValue::text(g.service.as_deref()),
        "location" => FieldValue::text(Some(g.location.as_str())),
        "price_range" => FieldValue::text(g.price_range.as_deref()),
        "operating_hours" => FieldValue::text(g.operating_hours.as_deref()),
        "contact_info" => FieldValue::text(g.contact_info.as_deref()),
        "rating" => FieldValue::number(g.rating),
        _ => None,
    }
}

fn list(items: &[String]) -> Option<FieldValue> {
    let items: Vec<String> = items
        .iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect();
    (!items.is_empty()).then_some(FieldValue::List(items))
}
