//! `POST /api/v1/nearby`.
//!
//! Never answers with an empty screen when something could be shown: a
//! location failure or an exhausted source chain falls back to the last
//! good result for the area, then to the popular catalog.

use axum::{extract::State, Extension, Json};
use ghumfir_core::{Coordinate, Destination, SearchFilter};
use ghumfir_nearby::{
    acquire, cache_key, closest_anyway, AcquireOptions, ManualPosition, NearbyError,
    NearbyQuery, ResolveOutcome,
};
use serde::{Deserialize, Serialize};

use super::{normalize_limit, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NearbyRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Raw error object from the client's position API, forwarded as-is.
    pub location_error: Option<serde_json::Value>,
    #[serde(flatten)]
    pub filter: SearchFilter,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(super) enum NearbyOutcome {
    Matched,
    ClosestAnyway,
    NoCandidates,
    Cached,
    Popular,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NearbyData {
    pub destinations: Vec<Destination>,
    pub source: Option<String>,
    pub outcome: NearbyOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl NearbyRequest {
    fn position_source(&self) -> ManualPosition {
        if let Some(payload) = &self.location_error {
            return ManualPosition::failing(payload.clone());
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => ManualPosition::new(lat, lng),
            _ => ManualPosition::unsupported(),
        }
    }
}

pub(super) async fn search_nearby(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NearbyRequest>,
) -> Result<Json<ApiResponse<NearbyData>>, ApiError> {
    let limit = normalize_limit(body.limit, state.config.result_limit);
    let options = AcquireOptions::from_config(&state.config);

    let origin = match acquire(&body.position_source(), &options).await {
        Ok(coordinate) => coordinate,
        Err(e) => {
            tracing::warn!(
                kind = %e.kind,
                error = %e.message,
                "location unavailable; serving popular destinations"
            );
            let data = popular_fallback(&state, None, limit, e.to_string());
            return Ok(ApiResponse::wrap(data, req_id));
        }
    };

    let key = cache_key(&origin, &body.filter);
    let query = NearbyQuery::new(origin, body.filter, limit);

    let data = match state.resolver.resolve(&query).await {
        Ok(resolution) => match resolution.outcome {
            ResolveOutcome::Matched => {
                state.cache.set(&key, resolution.destinations.clone());
                NearbyData {
                    destinations: resolution.destinations,
                    source: resolution.source,
                    outcome: NearbyOutcome::Matched,
                    fallback_reason: None,
                }
            }
            ResolveOutcome::NoneMatched { candidates } => {
                tracing::info!(
                    candidates,
                    "no candidate passed the filter; showing closest anyway"
                );
                NearbyData {
                    destinations: closest_anyway(
                        &resolution.unfiltered,
                        state.config.closest_anyway_count.min(limit),
                    ),
                    source: resolution.source,
                    outcome: NearbyOutcome::ClosestAnyway,
                    fallback_reason: Some("no destinations matched the filters".to_string()),
                }
            }
            ResolveOutcome::NoCandidates => NearbyData {
                destinations: Vec::new(),
                source: None,
                outcome: NearbyOutcome::NoCandidates,
                fallback_reason: None,
            },
        },
        Err(NearbyError::InvalidInput(message)) => {
            return Err(ApiError::validation(&req_id, message));
        }
        Err(e @ NearbyError::AllSourcesExhausted { .. }) => {
            let reason = e.to_string();
            if let Some(cached) = state.cache.get(&key) {
                tracing::warn!(
                    error = %reason,
                    stored_at = %cached.stored_at,
                    "serving cached destinations"
                );
                let mut destinations = cached.destinations;
                destinations.truncate(limit);
                NearbyData {
                    destinations,
                    source: Some("cache".to_string()),
                    outcome: NearbyOutcome::Cached,
                    fallback_reason: Some(reason),
                }
            } else {
                tracing::warn!(error = %reason, "serving popular destinations");
                popular_fallback(&state, Some(&origin), limit, reason)
            }
        }
    };

    Ok(ApiResponse::wrap(data, req_id))
}

fn popular_fallback(
    state: &AppState,
    origin: Option<&Coordinate>,
    limit: usize,
    reason: String,
) -> NearbyData {
    let mut destinations = state.popular.destinations_from(origin);
    destinations.truncate(limit);
    NearbyData {
        destinations,
        source: Some("popular".to_string()),
        outcome: NearbyOutcome::Popular,
        fallback_reason: Some(reason),
    }
}
