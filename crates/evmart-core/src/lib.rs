pub mod app_config;
pub mod config;
pub mod coordinate;
pub mod records;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use coordinate::GeoCoordinate;
pub use records::{Accessory, CatalogKind, CatalogRecord, ChargingStation, Garage, Vehicle};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown catalog kind: {0}")]
    UnknownCatalogKind(String),
}
