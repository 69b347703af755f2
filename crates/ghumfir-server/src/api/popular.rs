use axum::{
    extract::{Query, State},
    Extension, Json,
};
use ghumfir_core::{Coordinate, Destination};
use serde::Deserialize;

use super::{ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct PopularQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// The static catalog, nearest-first when the caller passes a position.
pub(super) async fn list_popular(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<PopularQuery>,
) -> Result<Json<ApiResponse<Vec<Destination>>>, ApiError> {
    let origin = match (params.latitude, params.longitude) {
        (Some(lat), Some(lng)) => Some(
            Coordinate::new(lat, lng).map_err(|e| ApiError::validation(&req_id, e.to_string()))?,
        ),
        (None, None) => None,
        _ => {
            return Err(ApiError::validation(
                &req_id,
                "latitude and longitude must be given together",
            ))
        }
    };

    Ok(ApiResponse::wrap(
        state.popular.destinations_from(origin.as_ref()),
        req_id,
    ))
}
