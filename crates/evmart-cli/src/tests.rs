use std::sync::Arc;

use evmart_catalog::FetchResult;
use evmart_search::Predicate;

use super::*;
use crate::commands::{build_spec, fetch_status};

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["evmart"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn help_is_a_parse_outcome() {
    let err = Cli::try_parse_from(["evmart", "--help"]).expect_err("help short-circuits parsing");
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
}

#[test]
fn parses_list_with_paging() {
    let cli = Cli::try_parse_from(["evmart", "list", "garages", "--offset", "20", "--limit", "5"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::List {
            kind: CatalogKind::Garages,
            offset: 20,
            limit: 5
        })
    ));
}

#[test]
fn parses_kind_aliases() {
    let cli = Cli::try_parse_from(["evmart", "get", "charging_station", "7"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Get {
            kind: CatalogKind::ChargingStations,
            id: 7
        })
    ));
}

#[test]
fn rejects_unknown_kind() {
    assert!(Cli::try_parse_from(["evmart", "list", "boats"]).is_err());
}

#[test]
fn parses_repeated_filters() {
    let cli = Cli::try_parse_from([
        "evmart",
        "search",
        "vehicles",
        "--filter",
        "price=0-50000",
        "--filter",
        "brand = BYD",
        "--keyword",
        "atto",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Search {
        filters, keyword, ..
    }) = cli.command
    else {
        panic!("expected search command");
    };
    assert_eq!(
        filters,
        vec![
            ("price".to_owned(), "0-50000".to_owned()),
            ("brand".to_owned(), "BYD".to_owned()),
        ]
    );
    assert_eq!(keyword.as_deref(), Some("atto"));
}

#[test]
fn rejects_filter_without_equals() {
    assert!(Cli::try_parse_from(["evmart", "search", "vehicles", "--filter", "price"]).is_err());
    assert!(parse_selection("=BYD").is_err());
}

#[test]
fn parses_nearest_with_negative_longitude() {
    let cli = Cli::try_parse_from([
        "evmart",
        "nearest",
        "garages",
        "--lat",
        "40.7128",
        "--lng",
        "-74.0060",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Nearest { lat, lng, limit, .. }) = cli.command else {
        panic!("expected nearest command");
    };
    assert!((lat - 40.7128).abs() < 1e-9);
    assert!((lng + 74.006).abs() < 1e-9);
    assert_eq!(limit, 5);
}

#[test]
fn build_spec_classifies_selections() {
    let filters = vec![
        ("price".to_owned(), "0-50000".to_owned()),
        ("brand".to_owned(), "BYD".to_owned()),
    ];
    let spec = build_spec(&filters, Some("atto")).expect("valid spec");

    assert_eq!(
        spec.predicates.get("price"),
        Some(&Predicate::Range {
            min: 0.0,
            max: 50_000.0
        })
    );
    assert_eq!(
        spec.predicates.get("brand"),
        Some(&Predicate::Exact("BYD".to_owned()))
    );
    assert_eq!(spec.keyword.as_deref(), Some("atto"));
}

#[test]
fn build_spec_rejects_bad_range() {
    let filters = vec![("price".to_owned(), "cheap".to_owned())];
    assert!(build_spec(&filters, None).is_err());
}

#[test]
fn fetch_status_labels() {
    assert_eq!(fetch_status(&FetchResult::Empty), "empty");
    assert_eq!(fetch_status(&FetchResult::Stale(Arc::default())), "stale");
    assert_eq!(fetch_status(&FetchResult::Fresh(Arc::default())), "fresh");
}
