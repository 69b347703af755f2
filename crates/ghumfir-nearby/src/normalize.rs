//! Normalization from heterogeneous upstream records to [`Destination`].
//!
//! Attribute lookup is delegated to [`crate::probe`]; this module decides
//! precedence between upstream values and synthesized fallbacks.

use ghumfir_core::{
    derive_id, placeholder_image, round_one_decimal, Category, Coordinate, Destination,
};
use rand::Rng;

use crate::probe::{
    probe_category, probe_coordinate, probe_description, probe_distance_km, probe_id, probe_image,
    probe_name, probe_paid_entry, probe_rating, probe_tagline, probe_tags, probe_weather,
    RawCandidate,
};

const TAGLINE_MAX_CHARS: usize = 120;
const HIGHLY_RATED_THRESHOLD: f64 = 4.5;

/// Normalize every candidate, skipping records without a usable name.
pub fn normalize_candidates<R: Rng + ?Sized>(
    candidates: &[RawCandidate],
    origin: &Coordinate,
    rng: &mut R,
) -> Vec<Destination> {
    candidates
        .iter()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let normalized = normalize_candidate(raw, origin, rng);
            if normalized.is_none() {
                tracing::debug!(index = idx, "skipping candidate without a name");
            }
            normalized
        })
        .collect()
}

/// Normalize one upstream record.
///
/// Returns `None` only when no name can be found. A record without any
/// recognisable coordinate takes the caller's `origin`, so its computed
/// distance is zero unless the source supplied one.
pub fn normalize_candidate<R: Rng + ?Sized>(
    raw: &RawCandidate,
    origin: &Coordinate,
    rng: &mut R,
) -> Option<Destination> {
    let name = probe_name(raw)?;
    let description = probe_description(raw);

    let coordinate = probe_coordinate(raw).unwrap_or(*origin);
    let distance_km = round_one_decimal(
        probe_distance_km(raw).unwrap_or_else(|| origin.distance_km(&coordinate)),
    );

    let category = probe_category(raw).unwrap_or_else(|| {
        let text = match &description {
            Some(d) => format!("{name} {d}"),
            None => name.clone(),
        };
        Category::infer(&text).as_str().to_string()
    });

    let rating = round_one_decimal(probe_rating(raw).unwrap_or_else(|| synthesize_rating(rng)));

    let tags = probe_tags(raw)
        .unwrap_or_else(|| synthesize_tags(&category, rating, probe_paid_entry(raw)));

    let image_url = probe_image(raw).unwrap_or_else(|| placeholder_image(&category));

    let tagline = probe_tagline(raw).map_or_else(
        || format!("{category} near you"),
        |t| truncate_chars(&t, TAGLINE_MAX_CHARS),
    );

    Some(Destination {
        id: probe_id(raw).unwrap_or_else(|| derive_id(&name, &coordinate)),
        name,
        image_url,
        distance_km,
        category,
        rating,
        tagline,
        tags,
        coordinate,
        weather: probe_weather(raw),
    })
}

/// Placeholder rating for sources that omit one. Not real data.
///
/// Drawn from `[4.0, 5.0)`; capped at 4.9 so one-decimal rounding stays
/// below 5.0.
fn synthesize_rating<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(4.0..5.0_f64).min(4.9)
}

fn synthesize_tags(category: &str, rating: f64, paid_entry: bool) -> Vec<String> {
    let mut tags = Vec::with_capacity(4);
    if !category.trim().is_empty() {
        tags.push(category.to_string());
    }
    if paid_entry {
        tags.push("Paid Entry".to_string());
    }
    if rating >= HIGHLY_RATED_THRESHOLD {
        tags.push("Highly Rated".to_string());
    }
    tags.push("Travel".to_string());
    tags
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
