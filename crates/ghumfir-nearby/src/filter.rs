//! Post-normalization filtering and ordering.
//!
//! Everything here is deterministic: the same filter over the same input
//! always yields the same output.

use ghumfir_core::{Destination, SearchFilter};

/// Keep destinations inside the radius, at or above the minimum rating and
/// matching the category (case-insensitive) when one is set.
///
/// `max_distance_km` is forwarded to the upstream only; the local cut-off is
/// `radius_km`.
#[must_use]
pub fn apply_filter(destinations: &[Destination], filter: &SearchFilter) -> Vec<Destination> {
    let category = filter.effective_category();
    destinations
        .iter()
        .filter(|d| d.distance_km <= filter.radius_km)
        .filter(|d| d.rating >= filter.min_rating)
        .filter(|d| category.is_none_or(|c| d.category.trim().eq_ignore_ascii_case(c)))
        .cloned()
        .collect()
}

/// Stable ascending sort on `distance_km`.
pub fn sort_by_distance(destinations: &mut [Destination]) {
    destinations.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
}

/// The `count` nearest destinations regardless of filters.
///
/// Used when filtering leaves nothing so the caller still has something to
/// show.
#[must_use]
pub fn closest_anyway(destinations: &[Destination], count: usize) -> Vec<Destination> {
    let mut nearest = destinations.to_vec();
    sort_by_distance(&mut nearest);
    nearest.truncate(count);
    nearest
}
