use evmart_core::{Accessory, CatalogRecord, Vehicle};

use super::*;
use crate::spec::Predicate;

fn vehicle(id: i64, brand: &str, model: &str, price: f64, location: &str) -> CatalogRecord {
    CatalogRecord::Vehicle(Vehicle {
        id,
        brand: brand.to_owned(),
        model: model.to_owned(),
        year: Some(2023),
        price,
        currency: "USD".to_owned(),
        description: Some(format!("{brand} {model} in great condition")),
        image: None,
        gallery: Vec::new(),
        location: location.to_owned(),
        color: Some("White".to_owned()),
        condition: Some("Used".to_owned()),
        phone: None,
        category: Some("SUV".to_owned()),
        featured: id % 2 == 0,
        sku: None,
        map_link: None,
        rating: None,
    })
}

fn accessory(id: i64, name: &str, models: &[&str]) -> CatalogRecord {
    CatalogRecord::Accessory(Accessory {
        id,
        name: name.to_owned(),
        description: None,
        image: None,
        price: 49.0,
        phone: None,
        rating: Some(4.0),
        review_count: 12,
        weight: Some(1.2),
        color: None,
        category: Some("Charging".to_owned()),
        brand: None,
        location: "Phnom Penh".to_owned(),
        sku: None,
        compatible_models: models.iter().map(|m| (*m).to_owned()).collect(),
    })
}

fn fleet() -> Vec<CatalogRecord> {
    vec![
        vehicle(1, "BYD", "Atto 3", 20_000.0, "Phnom Penh"),
        vehicle(2, "Tesla", "Model Y", 90_000.0, "Siem Reap"),
        vehicle(3, "BYD", "Seal", 45_000.0, "Phnom Penh"),
        vehicle(4, "Hyundai", "Ioniq 5", 52_000.0, "Battambang"),
    ]
}

fn ids(records: &[CatalogRecord]) -> Vec<i64> {
    records.iter().map(CatalogRecord::id).collect()
}

#[test]
fn default_spec_returns_input_unchanged() {
    let records = fleet();
    let spec = FilterSpec::new()
        .with("price", Predicate::any_range())
        .with("brand", Predicate::Exact(String::new()));
    assert_eq!(apply(&records, &spec), records);
}

#[test]
fn price_range_keeps_only_records_in_bounds() {
    let records = fleet();
    let spec = FilterSpec::new().with(
        "price",
        Predicate::Range {
            min: 0.0,
            max: 50_000.0,
        },
    );
    let kept = apply(&records, &spec);
    assert_eq!(ids(&kept), vec![1, 3]);

    for rec in &records {
        let price = rec.price().unwrap();
        let included = kept.contains(rec);
        assert_eq!(included, (0.0..=50_000.0).contains(&price));
    }
}

#[test]
fn predicates_combine_with_and() {
    let mut spec = FilterSpec::new();
    spec.select("brand", "byd").unwrap();
    spec.select("location", "phnom").unwrap();
    spec.select("price", "30000-60000").unwrap();
    assert_eq!(ids(&apply(&fleet(), &spec)), vec![3]);
}

#[test]
fn flag_filter_on_featured() {
    let mut spec = FilterSpec::new();
    spec.select("featured", "true").unwrap();
    assert_eq!(ids(&apply(&fleet(), &spec)), vec![2, 4]);
}

#[test]
fn missing_field_fails_active_predicate() {
    let spec = FilterSpec::new().with("service", Predicate::Exact("Battery".to_owned()));
    assert!(apply(&fleet(), &spec).is_empty());
}

#[test]
fn keyword_searches_free_text_fields() {
    let spec = FilterSpec::new().with_keyword("ioniq");
    assert_eq!(ids(&apply(&fleet(), &spec)), vec![4]);

    let spec = FilterSpec::new().with_keyword("great condition");
    assert_eq!(apply(&fleet(), &spec).len(), 4);
}

#[test]
fn includes_matches_compatible_models() {
    let records = vec![
        accessory(10, "Wall charger", &["Atto 3", "Seal"]),
        accessory(11, "Floor mats", &["Model Y"]),
    ];
    let mut spec = FilterSpec::new();
    spec.select("compatible_models", "seal").unwrap();
    assert_eq!(ids(&apply(&records, &spec)), vec![10]);
}

#[test]
fn unique_values_are_sorted_and_distinct() {
    assert_eq!(
        unique_values(&fleet(), "brand"),
        vec!["BYD", "Hyundai", "Tesla"]
    );
    assert_eq!(
        unique_values(&fleet(), "location"),
        vec!["Battambang", "Phnom Penh", "Siem Reap"]
    );
}

#[test]
fn unique_values_flattens_lists() {
    let records = vec![
        accessory(10, "Wall charger", &["Seal", "Atto 3"]),
        accessory(11, "Floor mats", &["Seal", "Model Y"]),
    ];
    assert_eq!(
        unique_values(&records, "compatible_models"),
        vec!["Atto 3", "Model Y", "Seal"]
    );
}

#[test]
fn unique_values_for_unknown_field_is_empty() {
    assert!(unique_values(&fleet(), "horsepower").is_empty());
}
