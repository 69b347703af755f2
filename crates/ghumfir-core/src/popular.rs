//! Popular-destination catalog shown whenever a nearby search cannot run.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::destinations::{
    derive_id, placeholder_image, round_one_decimal, slugify, Category, Destination,
};
use crate::geo::Coordinate;
use crate::ConfigError;

const DEFAULT_POPULAR_RATING: f64 = 4.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularDestination {
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: Option<String>,
    pub tagline: Option<String>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PopularDestination {
    #[must_use]
    pub fn slug(&self) -> String {
        self.id.clone().unwrap_or_else(|| {
            Coordinate::new(self.latitude, self.longitude)
                .map_or_else(|_| slugify(&self.name), |c| derive_id(&self.name, &c))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PopularCatalog {
    pub destinations: Vec<PopularDestination>,
}

impl PopularCatalog {
    /// Convert the catalog into [`Destination`] records.
    ///
    /// With an `origin`, each record carries its haversine distance and the
    /// list is sorted nearest-first; without one, distances are `0.0` and
    /// catalog order is kept.
    #[must_use]
    pub fn destinations_from(&self, origin: Option<&Coordinate>) -> Vec<Destination> {
        let mut out: Vec<Destination> = self
            .destinations
            .iter()
            .filter_map(|p| {
                let coordinate = Coordinate::new(p.latitude, p.longitude).ok()?;
                let distance_km =
                    origin.map_or(0.0, |o| round_one_decimal(o.distance_km(&coordinate)));
                let category = if p.category.trim().is_empty() {
                    Category::infer(&p.name).as_str().to_string()
                } else {
                    p.category.trim().to_string()
                };
                let tags = if p.tags.is_empty() {
                    vec![category.clone(), "Popular".to_string()]
                } else {
                    p.tags.clone()
                };
                Some(Destination {
                    id: p.slug(),
                    name: p.name.clone(),
                    image_url: p
                        .image_url
                        .clone()
                        .filter(|url| !url.trim().is_empty())
                        .unwrap_or_else(|| placeholder_image(&category)),
                    distance_km,
                    tagline: p
                        .tagline
                        .clone()
                        .unwrap_or_else(|| format!("A favourite {category} stop in Nepal")),
                    category,
                    rating: round_one_decimal(p.rating.unwrap_or(DEFAULT_POPULAR_RATING)),
                    tags,
                    coordinate,
                    weather: None,
                })
            })
            .collect();

        if origin.is_some() {
            out.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        }
        out
    }
}

/// Load and validate the popular-destination catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_popular(path: &Path) -> Result<PopularCatalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PopularFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_popular(&content)
}

/// Parse and validate catalog YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_popular(content: &str) -> Result<PopularCatalog, ConfigError> {
    let catalog: PopularCatalog = serde_yaml::from_str(content)?;
    validate_popular(&catalog)?;
    Ok(catalog)
}

fn validate_popular(catalog: &PopularCatalog) -> Result<(), ConfigError> {
    if catalog.destinations.is_empty() {
        return Err(ConfigError::Validation(
            "catalog must list at least one destination".to_string(),
        ));
    }

    let mut seen_slugs = HashSet::new();

    for dest in &catalog.destinations {
        if dest.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "destination name must be non-empty".to_string(),
            ));
        }

        if let Err(e) = Coordinate::new(dest.latitude, dest.longitude) {
            return Err(ConfigError::Validation(format!(
                "destination '{}' has an invalid coordinate: {e}",
                dest.name
            )));
        }

        if let Some(rating) = dest.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(ConfigError::Validation(format!(
                    "destination '{}' has rating {rating}; must be within [0, 5]",
                    dest.name
                )));
            }
        }

        let slug = dest.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate destination id: '{}' (from destination '{}')",
                slug, dest.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "popular_test.rs"]
mod tests;
