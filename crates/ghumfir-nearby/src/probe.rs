//! Field-probe tables for upstream candidate records.
//!
//! Upstream sources do not agree on a schema, so every logical attribute is
//! read through an ordered list of accessors and the first hit wins. The
//! tables here are a compatibility shim over the sources seen so far, not a
//! contract; extend them rather than assuming one canonical shape.

use ghumfir_core::{Coordinate, Weather};
use serde_json::{Map, Value};

/// One upstream record before normalization.
pub type RawCandidate = Map<String, Value>;

/// Top-level keys that may hold the destinations array, in priority order.
pub const RESPONSE_ARRAY_KEYS: &[&str] = &[
    "nearbyAttractions",
    "results",
    "destinations",
    "data",
    "locations",
];

const ID_KEYS: &[&str] = &["id", "_id", "placeId", "place_id"];
const NAME_KEYS: &[&str] = &["name", "title", "placeName", "place_name"];
const DESCRIPTION_KEYS: &[&str] = &["description", "shortDescription", "summary", "about"];
const TAGLINE_KEYS: &[&str] = &["tagline", "shortDescription", "description", "summary"];
const CATEGORY_KEYS: &[&str] = &["category", "type", "categoryName", "kind"];
const RATING_KEYS: &[&str] = &["rating", "score", "averageRating", "avgRating", "stars"];
const TAG_KEYS: &[&str] = &["tags", "categories", "keywords"];
const DISTANCE_KM_KEYS: &[&str] = &[
    "distanceKm",
    "distance_km",
    "distanceInKm",
    "distance",
    "dist",
];
const DISTANCE_M_KEYS: &[&str] = &["distanceMeters", "distance_m", "distanceInMeters"];
const IMAGE_KEYS: &[&str] = &[
    "imageUrl",
    "image_url",
    "image",
    "thumbnail",
    "thumbnailUrl",
    "photo",
    "photoUrl",
    "photo_url",
    "coverImage",
];
const IMAGE_LIST_KEYS: &[&str] = &["images", "photos"];
const PAID_ENTRY_KEYS: &[&str] = &[
    "entryFee",
    "entry_fee",
    "ticketPrice",
    "paidEntry",
    "isPaid",
    "fee",
];

type CoordinateProbe = fn(&RawCandidate) -> Option<Coordinate>;

/// Coordinate probes in priority order.
const COORDINATE_PROBES: &[(&str, CoordinateProbe)] = &[
    ("latitude/longitude", flat_latitude_longitude),
    ("lat/lng", flat_lat_lng),
    ("coordinates.lat/lng", nested_coordinates),
    ("location.latitude/longitude", nested_location),
    ("geometry.coordinates", geojson_point),
];

/// Pull the candidate array out of a source response.
///
/// Accepts a bare array or an object holding the array under one of
/// [`RESPONSE_ARRAY_KEYS`]. An object under `data` is probed one level
/// deeper. Non-object array entries are skipped. Returns `None` when no
/// recognisable array exists, which callers treat as a malformed response.
#[must_use]
pub fn extract_candidates(body: &Value) -> Option<Vec<RawCandidate>> {
    extract_at_depth(body, 0)
}

fn extract_at_depth(body: &Value, depth: usize) -> Option<Vec<RawCandidate>> {
    match body {
        Value::Array(items) => Some(objects_only(items)),
        Value::Object(map) => RESPONSE_ARRAY_KEYS.iter().find_map(|key| match map.get(*key) {
            Some(Value::Array(items)) => Some(objects_only(items)),
            Some(nested @ Value::Object(_)) if *key == "data" && depth == 0 => {
                extract_at_depth(nested, depth + 1)
            }
            _ => None,
        }),
        _ => None,
    }
}

fn objects_only(items: &[Value]) -> Vec<RawCandidate> {
    items
        .iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
}

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Read a number, accepting numeric strings such as `"4.5"` or `"2.4 km"`.
fn as_number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(leading_number))
        .filter(|n| n.is_finite())
}

fn leading_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse::<f64>().ok()
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_str(candidate: &RawCandidate, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| candidate.get(*k).and_then(non_empty_str))
}

fn first_number(candidate: &RawCandidate, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| candidate.get(*k).and_then(as_number))
}

fn pair(lat: Option<&Value>, lng: Option<&Value>) -> Option<Coordinate> {
    let lat = as_number(lat?)?;
    let lng = as_number(lng?)?;
    Coordinate::new(lat, lng).ok()
}

// ---------------------------------------------------------------------------
// Coordinate probes
// ---------------------------------------------------------------------------

fn flat_latitude_longitude(c: &RawCandidate) -> Option<Coordinate> {
    pair(c.get("latitude"), c.get("longitude"))
}

fn flat_lat_lng(c: &RawCandidate) -> Option<Coordinate> {
    pair(c.get("lat"), c.get("lng").or_else(|| c.get("lon")))
}

fn nested_coordinates(c: &RawCandidate) -> Option<Coordinate> {
    let nested = c.get("coordinates")?.as_object()?;
    pair(
        nested.get("lat").or_else(|| nested.get("latitude")),
        nested.get("lng").or_else(|| nested.get("longitude")),
    )
}

fn nested_location(c: &RawCandidate) -> Option<Coordinate> {
    let nested = c.get("location")?.as_object()?;
    pair(
        nested.get("latitude").or_else(|| nested.get("lat")),
        nested.get("longitude").or_else(|| nested.get("lng")),
    )
}

/// GeoJSON points store `[lng, lat]`.
fn geojson_point(c: &RawCandidate) -> Option<Coordinate> {
    let coords = c.get("geometry")?.get("coordinates")?.as_array()?;
    pair(coords.get(1), coords.first())
}

// ---------------------------------------------------------------------------
// Attribute probes
// ---------------------------------------------------------------------------

#[must_use]
pub fn probe_coordinate(candidate: &RawCandidate) -> Option<Coordinate> {
    COORDINATE_PROBES.iter().find_map(|(label, probe)| {
        let hit = probe(candidate);
        if hit.is_some() {
            tracing::trace!(probe = *label, "coordinate probe matched");
        }
        hit
    })
}

#[must_use]
pub fn probe_id(candidate: &RawCandidate) -> Option<String> {
    ID_KEYS.iter().find_map(|k| match candidate.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[must_use]
pub fn probe_name(candidate: &RawCandidate) -> Option<String> {
    first_str(candidate, NAME_KEYS)
}

#[must_use]
pub fn probe_description(candidate: &RawCandidate) -> Option<String> {
    first_str(candidate, DESCRIPTION_KEYS)
}

#[must_use]
pub fn probe_tagline(candidate: &RawCandidate) -> Option<String> {
    first_str(candidate, TAGLINE_KEYS)
}

/// Explicit upstream category. A list-valued field yields its first entry.
#[must_use]
pub fn probe_category(candidate: &RawCandidate) -> Option<String> {
    CATEGORY_KEYS.iter().find_map(|k| match candidate.get(*k)? {
        Value::Array(items) => items.iter().find_map(non_empty_str),
        other => non_empty_str(other),
    })
}

/// Upstream distance in kilometres. Metre-valued fields are converted.
/// Negative values are ignored.
#[must_use]
pub fn probe_distance_km(candidate: &RawCandidate) -> Option<f64> {
    first_number(candidate, DISTANCE_KM_KEYS)
        .or_else(|| first_number(candidate, DISTANCE_M_KEYS).map(|m| m / 1000.0))
        .filter(|d| *d >= 0.0)
}

/// Upstream rating clamped into `[0, 5]`.
#[must_use]
pub fn probe_rating(candidate: &RawCandidate) -> Option<f64> {
    first_number(candidate, RATING_KEYS).map(|r| r.clamp(0.0, 5.0))
}

/// Upstream tags from an array (strings or `{name}` objects) or a
/// comma-separated string. Returns `None` when nothing usable is present.
#[must_use]
pub fn probe_tags(candidate: &RawCandidate) -> Option<Vec<String>> {
    TAG_KEYS.iter().find_map(|k| {
        let tags: Vec<String> = match candidate.get(*k)? {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| {
                    non_empty_str(item).or_else(|| item.get("name").and_then(non_empty_str))
                })
                .collect(),
            Value::String(s) => s
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        if tags.is_empty() {
            None
        } else {
            Some(tags)
        }
    })
}

/// First URL-like image among the prioritized image fields.
#[must_use]
pub fn probe_image(candidate: &RawCandidate) -> Option<String> {
    IMAGE_KEYS
        .iter()
        .find_map(|k| candidate.get(*k).and_then(image_value))
        .or_else(|| {
            IMAGE_LIST_KEYS.iter().find_map(|k| {
                candidate
                    .get(*k)?
                    .as_array()?
                    .iter()
                    .find_map(image_value)
            })
        })
}

fn image_value(value: &Value) -> Option<String> {
    let url = non_empty_str(value).or_else(|| value.get("url").and_then(non_empty_str))?;
    is_url_like(&url).then_some(url)
}

fn is_url_like(s: &str) -> bool {
    s.starts_with("https://")
        || s.starts_with("http://")
        || s.starts_with("//")
        || s.starts_with('/')
        || s.starts_with("data:image/")
}

/// Whether the candidate advertises a paid entry.
#[must_use]
pub fn probe_paid_entry(candidate: &RawCandidate) -> bool {
    PAID_ENTRY_KEYS
        .iter()
        .filter_map(|k| candidate.get(*k))
        .any(|v| match v {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f > 0.0),
            Value::String(s) => {
                let lowered = s.trim().to_ascii_lowercase();
                !lowered.is_empty()
                    && !matches!(lowered.as_str(), "0" | "free" | "no" | "false" | "none")
            }
            _ => false,
        })
}

/// Nested `weather` object, when the source enriches candidates with it.
#[must_use]
pub fn probe_weather(candidate: &RawCandidate) -> Option<Weather> {
    let weather = candidate.get("weather")?.as_object()?;
    let temperature = ["temperatureC", "temperature", "temp"]
        .iter()
        .find_map(|k| weather.get(*k).and_then(as_number))?;
    let condition = ["condition", "description", "main"]
        .iter()
        .find_map(|k| weather.get(*k).and_then(non_empty_str))
        .unwrap_or_default();
    let icon = weather
        .get("icon")
        .and_then(non_empty_str)
        .unwrap_or_default();

    #[allow(clippy::cast_possible_truncation)]
    let temperature_c = temperature.round() as i32;

    Some(Weather {
        temperature_c,
        condition,
        icon,
    })
}

#[cfg(test)]
#[path = "probe_test.rs"]
mod tests;
