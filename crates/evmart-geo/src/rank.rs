use evmart_core::{CatalogRecord, GeoCoordinate};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::distance::haversine_km;
use crate::link::GeoLinkParser;

/// Upper bound on concurrent coordinate resolutions (redirect lookups) per
/// ranking call.
const RESOLVE_CONCURRENCY: usize = 8;

/// Anything that can be placed on a map.
pub trait Locatable {
    /// Coordinates published directly by the source, if any.
    fn explicit_coordinate(&self) -> Option<GeoCoordinate>;

    /// Raw map-link text to parse when no explicit coordinate is present.
    fn map_link(&self) -> Option<&str>;
}

impl Locatable for CatalogRecord {
    fn explicit_coordinate(&self) -> Option<GeoCoordinate> {
        CatalogRecord::explicit_coordinate(self)
    }

    fn map_link(&self) -> Option<&str> {
        CatalogRecord::map_link(self)
    }
}

/// A record annotated with where it is and how far away it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityResult<T> {
    pub record: T,
    pub coordinate: GeoCoordinate,
    pub distance_km: f64,
}

async fn resolve<T: Locatable>(record: &T, parser: &GeoLinkParser) -> Option<GeoCoordinate> {
    if let Some(coordinate) = record.explicit_coordinate() {
        return Some(coordinate);
    }
    parser.extract(record.map_link()?).await
}

/// Ranks `records` by distance from `origin`, nearest first, keeping at most
/// `limit` results.
///
/// Records whose position cannot be resolved are skipped. Ties keep their
/// input order.
pub async fn rank_nearest<T>(
    records: &[T],
    origin: GeoCoordinate,
    limit: usize,
    parser: &GeoLinkParser,
) -> Vec<ProximityResult<T>>
where
    T: Locatable + Clone,
{
    let coordinates: Vec<Option<GeoCoordinate>> = stream::iter(records.iter())
        .map(|record| resolve(record, parser))
        .buffered(RESOLVE_CONCURRENCY)
        .collect()
        .await;

    let mut ranked: Vec<ProximityResult<T>> = records
        .iter()
        .zip(coordinates)
        .filter_map(|(record, coordinate)| {
            let coordinate = coordinate?;
            Some(ProximityResult {
                record: record.clone(),
                coordinate,
                distance_km: haversine_km(origin, coordinate),
            })
        })
        .collect();

    let resolvable = ranked.len();
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(limit);

    tracing::debug!(
        input = records.len(),
        resolvable,
        returned = ranked.len(),
        "ranked records by distance"
    );
    ranked
}
