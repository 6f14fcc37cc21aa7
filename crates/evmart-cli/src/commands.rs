//! Subcommand handlers. Each prints pretty JSON on stdout.

use anyhow::Context;
use evmart_catalog::{FetchResult, Marketplace};
use evmart_core::GeoCoordinate;
use evmart_search::FilterSpec;
use serde::Serialize;
use serde_json::json;

use crate::Commands;

pub(crate) async fn run(market: &Marketplace, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List {
            kind,
            offset,
            limit,
        } => {
            let snapshot = market.fetch_all(kind).await;
            let page = evmart_search::paginate(snapshot.records(), offset, limit);
            print_json(&json!({ "status": fetch_status(&snapshot), "page": page }))
        }
        Commands::Get { kind, id } => match market.fetch_by_id(kind, id).await {
            Some(record) => print_json(&record),
            None => anyhow::bail!("no {kind} record with id {id}"),
        },
        Commands::Unique { kind, field } => print_json(&market.fetch_unique(kind, &field).await),
        Commands::Search {
            kind,
            filters,
            keyword,
            offset,
            limit,
        } => {
            let spec = build_spec(&filters, keyword.as_deref())?;
            let page = market.apply_filters(kind, &spec, offset, limit).await;
            print_json(&page)
        }
        Commands::Nearest {
            kind,
            lat,
            lng,
            limit,
            filters,
        } => {
            let origin = GeoCoordinate::new(lat, lng)
                .with_context(|| format!("invalid position {lat},{lng}"))?;
            let spec = build_spec(&filters, None)?;
            let spec = (!spec.is_default()).then_some(&spec);
            print_json(&market.rank_nearest(kind, origin, limit, spec).await)
        }
        Commands::Image { kind, reference } => {
            if reference.contains(',') {
                print_json(&market.resolve_gallery(kind, &[reference]).await)
            } else {
                print_json(&market.resolve_image(kind, &reference).await)
            }
        }
        Commands::Coord { link } => print_json(&market.extract_coordinate(&link).await),
    }
}

/// Builds a spec from raw `field=value` selections.
pub(crate) fn build_spec(
    filters: &[(String, String)],
    keyword: Option<&str>,
) -> anyhow::Result<FilterSpec> {
    let mut spec = FilterSpec::new();
    for (field, value) in filters {
        spec.select(field, value)?;
    }
    if let Some(keyword) = keyword {
        spec = spec.with_keyword(keyword);
    }
    Ok(spec)
}

/// Freshness label for a whole-catalog fetch.
pub(crate) fn fetch_status(result: &FetchResult) -> &'static str {
    match result {
        FetchResult::Fresh(_) => "fresh",
        FetchResult::Stale(_) => "stale",
        FetchResult::Empty => "empty",
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
