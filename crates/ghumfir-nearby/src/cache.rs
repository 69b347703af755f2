//! Last-good-result cache keyed by query.
//!
//! When every source fails, the server prefers the most recent successful
//! answer for the same area over the static popular list.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use ghumfir_core::{Coordinate, Destination, SearchFilter};

/// A cached result with the time it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResult {
    pub destinations: Vec<Destination>,
    pub stored_at: DateTime<Utc>,
}

pub trait ResultCache: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedResult>;
    fn set(&self, key: &str, destinations: Vec<Destination>);
}

/// Cache key for a coordinate and filter.
///
/// Coordinates are rounded to three decimals (~100 m) so small GPS jitter
/// maps to the same entry.
#[must_use]
pub fn cache_key(coordinate: &Coordinate, filter: &SearchFilter) -> String {
    format!(
        "{:.3}:{:.3}:{}:{}:{}",
        coordinate.latitude(),
        coordinate.longitude(),
        filter.radius_km,
        filter.effective_category().unwrap_or("").to_ascii_lowercase(),
        filter.min_rating,
    )
}

/// In-process cache. Unbounded; entries live for the process lifetime.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CachedResult>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CachedResult>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> Option<CachedResult> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, destinations: Vec<Destination>) {
        self.lock().insert(
            key.to_string(),
            CachedResult {
                destinations,
                stored_at: Utc::now(),
            },
        );
    }
}

/// Cache that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl ResultCache for NoCache {
    fn get(&self, _key: &str) -> Option<CachedResult> {
        None
    }

    fn set(&self, _key: &str, _destinations: Vec<Destination>) {}
}
