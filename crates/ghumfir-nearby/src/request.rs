//! Query and upstream request payload types.

use ghumfir_core::{normalize_category_filter, Coordinate, SearchFilter};
use serde::{Deserialize, Serialize};

use crate::error::NearbyError;

/// A resolver query as received from the caller, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub filter: SearchFilter,
    /// Maximum number of destinations returned.
    pub limit: usize,
}

impl NearbyQuery {
    #[must_use]
    pub fn new(coordinate: Coordinate, filter: SearchFilter, limit: usize) -> Self {
        Self {
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
            filter,
            limit,
        }
    }

    /// Validate the query and return its coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`NearbyError::InvalidInput`] for NaN/out-of-range coordinates,
    /// an out-of-bounds filter, or a zero limit.
    pub fn validate(&self) -> Result<Coordinate, NearbyError> {
        let coordinate = Coordinate::new(self.latitude, self.longitude)
            .map_err(|e| NearbyError::InvalidInput(e.to_string()))?;
        self.filter.validate().map_err(NearbyError::InvalidInput)?;
        if self.limit == 0 {
            return Err(NearbyError::InvalidInput(
                "limit must be at least 1".to_string(),
            ));
        }
        Ok(coordinate)
    }
}

/// JSON body POSTed to every candidate source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_in_km: f64,
    /// Empty string means "any category".
    pub category: String,
    pub min_rating: f64,
    pub max_distance: f64,
}

impl SearchRequest {
    #[must_use]
    pub fn build(coordinate: &Coordinate, filter: &SearchFilter) -> Self {
        Self {
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
            radius_in_km: filter.radius_km,
            category: normalize_category_filter(&filter.category),
            min_rating: filter.min_rating,
            max_distance: filter.max_distance_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pokhara() -> Coordinate {
        Coordinate::new(28.2096, 83.9856).unwrap()
    }

    #[test]
    fn payload_uses_upstream_field_names() {
        let request = SearchRequest::build(&pokhara(), &SearchFilter::default());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["latitude"], 28.2096);
        assert_eq!(json["longitude"], 83.9856);
        assert_eq!(json["radiusInKm"], 50.0);
        assert_eq!(json["category"], "");
        assert_eq!(json["minRating"], 0.0);
        assert_eq!(json["maxDistance"], 1000.0);
    }

    #[test]
    fn all_category_is_sent_as_empty_marker() {
        let filter = SearchFilter {
            category: "All".to_string(),
            ..SearchFilter::default()
        };
        let request = SearchRequest::build(&pokhara(), &filter);
        assert_eq!(request.category, "");
    }

    #[test]
    fn concrete_category_is_forwarded() {
        let filter = SearchFilter {
            category: " Temple ".to_string(),
            ..SearchFilter::default()
        };
        let request = SearchRequest::build(&pokhara(), &filter);
        assert_eq!(request.category, "Temple");
    }

    #[test]
    fn query_validation_rejects_nan_coordinates() {
        let query = NearbyQuery {
            latitude: f64::NAN,
            longitude: 83.9,
            filter: SearchFilter::default(),
            limit: 10,
        };
        assert!(matches!(query.validate(), Err(NearbyError::InvalidInput(_))));
    }

    #[test]
    fn query_validation_rejects_zero_limit() {
        let query = NearbyQuery::new(pokhara(), SearchFilter::default(), 0);
        assert!(matches!(query.validate(), Err(NearbyError::InvalidInput(_))));
    }

    #[test]
    fn query_validation_rejects_bad_filter() {
        let filter = SearchFilter {
            radius_km: -1.0,
            ..SearchFilter::default()
        };
        let query = NearbyQuery::new(pokhara(), filter, 5);
        assert!(matches!(query.validate(), Err(NearbyError::InvalidInput(ref m)) if m.contains("radiusKm")));
    }
}
