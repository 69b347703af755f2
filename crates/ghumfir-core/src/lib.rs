pub mod app_config;
pub mod config;
pub mod destinations;
pub mod geo;
pub mod popular;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use destinations::{
    derive_id, normalize_category_filter, placeholder_image, round_one_decimal, slugify, Category,
    Destination, SearchFilter, Weather,
};
pub use geo::{haversine_km, Coordinate, GeoError, EARTH_RADIUS_KM};
pub use popular::{load_popular, parse_popular, PopularCatalog, PopularDestination};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read popular destinations file {path}: {source}")]
    PopularFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse popular destinations file: {0}")]
    PopularFileParse(#[from] serde_yaml::Error),

    #[error("popular destinations validation failed: {0}")]
    Validation(String),
}
