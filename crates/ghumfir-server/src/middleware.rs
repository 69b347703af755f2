use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use ghumfir_core::AppConfig;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::{ApiError, ErrorCode};

/// Request ID stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Windows older than this many window lengths are dropped on the next sweep.
const STALE_WINDOWS: u32 = 2;

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    opened: Instant,
    hits: usize,
}

/// Fixed-window limiter keyed by client address.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    budget: usize,
    window: Duration,
    clients: Arc<Mutex<HashMap<String, ClientWindow>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(budget: usize, window: Duration) -> Self {
        Self {
            budget,
            window,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.rate_limit_max_requests, config.rate_limit_window())
    }

    /// Count one hit for `client`. Returns the time left in the window when
    /// the budget is already spent.
    async fn admit(&self, client: &str) -> Result<(), Duration> {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;

        let stale_after = self.window * STALE_WINDOWS;
        clients.retain(|_, w| now.duration_since(w.opened) < stale_after);

        let entry = clients.entry(client.to_string()).or_insert(ClientWindow {
            opened: now,
            hits: 0,
        });
        if now.duration_since(entry.opened) >= self.window {
            *entry = ClientWindow {
                opened: now,
                hits: 0,
            };
        }

        if entry.hits >= self.budget {
            return Err(self.window.saturating_sub(now.duration_since(entry.opened)));
        }
        entry.hits += 1;
        Ok(())
    }
}

/// First hop of `x-forwarded-for`, then `x-real-ip`, then a shared bucket.
fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim);
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim);

    forwarded
        .filter(|v| !v.is_empty())
        .or(real_ip.filter(|v| !v.is_empty()))
        .unwrap_or("anonymous")
        .to_string()
}

/// Use the caller's `x-request-id` or mint a `UUIDv4`, expose it as
/// [`RequestId`] and echo it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

pub async fn enforce_rate_limit(
    State(limiter): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_key(req.headers());

    let Err(retry_in) = limiter.admit(&client).await else {
        return next.run(req).await;
    };

    let req_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    tracing::warn!(%client, budget = limiter.budget, "rate limit exceeded");

    let mut res = ApiError::new(req_id, ErrorCode::RateLimited, "too many requests, slow down")
        .into_response();
    let retry_secs = retry_in.as_secs().max(1);
    if let Ok(val) = HeaderValue::from_str(&retry_secs.to_string()) {
        res.headers_mut().insert(header::RETRY_AFTER, val);
    }
    res
}
