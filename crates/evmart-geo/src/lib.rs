//! Coordinate extraction from map links and distance ranking.

pub mod distance;
pub mod link;
pub mod rank;

use thiserror::Error;

pub use distance::haversine_km;
pub use link::{parse_coordinate, GeoLinkParser, DEFAULT_SHORT_LINK_HOSTS};
pub use rank::{rank_nearest, Locatable, ProximityResult};

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}
