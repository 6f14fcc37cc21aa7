//! Remote catalog access for the EV marketplace: cached collection fetches,
//! media URL resolution, and the [`Marketplace`] facade that ties them to
//! filtering and proximity ranking.

pub mod cache;
pub mod client;
pub mod error;
pub mod media;
pub mod normalize;
pub(crate) mod retry;
pub mod service;
pub mod single_flight;
pub mod types;

pub use cache::{CacheEntry, CacheStore};
pub use client::{CatalogCache, CatalogClient, CatalogClientConfig, FetchResult};
pub use error::CatalogError;
pub use media::{MediaConfig, MediaResolver};
pub use normalize::{normalize_item, normalize_items, Lookups};
pub use service::Marketplace;
pub use single_flight::SingleFlight;
