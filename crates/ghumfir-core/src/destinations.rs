//! Canonical destination records and the search filter applied to them.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Category values that ask the upstream for an unfiltered search.
const ANY_CATEGORY_SENTINELS: &[&str] = &["", "all", "any", "all categories"];

/// Place categories the resolver can infer from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Temple,
    Lake,
    Viewpoint,
    Waterfall,
    Trekking,
    Heritage,
    Nature,
    Adventure,
}

/// Ordered keyword table used for inference. First matching row wins.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Temple, &["temple", "pagoda", "monastery"]),
    (Category::Lake, &["lake", "pond"]),
    (Category::Viewpoint, &["viewpoint", "view", "lookout"]),
    (Category::Waterfall, &["waterfall", "falls"]),
    (Category::Trekking, &["trek", "hiking", "trail"]),
    (Category::Heritage, &["museum", "heritage", "palace"]),
    (Category::Nature, &["park", "garden", "nature"]),
];

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Temple,
        Category::Lake,
        Category::Viewpoint,
        Category::Waterfall,
        Category::Trekking,
        Category::Heritage,
        Category::Nature,
        Category::Adventure,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Temple => "Temple",
            Category::Lake => "Lake",
            Category::Viewpoint => "Viewpoint",
            Category::Waterfall => "Waterfall",
            Category::Trekking => "Trekking",
            Category::Heritage => "Heritage",
            Category::Nature => "Nature",
            Category::Adventure => "Adventure",
        }
    }

    /// Classify free text (typically name + description) by keyword.
    ///
    /// Matching is case-insensitive substring search over the ordered
    /// keyword table; text matching nothing is [`Category::Adventure`].
    #[must_use]
    pub fn infer(text: &str) -> Category {
        let lowered = text.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
            .map_or(Category::Adventure, |(category, _)| *category)
    }

    /// Parse a known category name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Category> {
        let trimmed = name.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub temperature_c: i32,
    pub condition: String,
    pub icon: String,
}

/// A normalized place record ready for presentation.
///
/// `distance_km` and `rating` carry one decimal place. `tags` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub distance_km: f64,
    pub category: String,
    pub rating: f64,
    pub tagline: String,
    pub tags: Vec<String>,
    pub coordinate: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
}

/// Caller-supplied constraints for a nearby search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilter {
    pub radius_km: f64,
    /// Empty (or an "any" sentinel such as `All`) means unfiltered.
    pub category: String,
    pub min_rating: f64,
    pub max_distance_km: f64,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            radius_km: 50.0,
            category: String::new(),
            min_rating: 0.0,
            max_distance_km: 1000.0,
        }
    }
}

impl SearchFilter {
    /// Check numeric bounds.
    ///
    /// # Errors
    ///
    /// Returns `Err` with a human-readable reason when a bound is violated.
    pub fn validate(&self) -> Result<(), String> {
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(format!("radiusKm must be > 0 (got {})", self.radius_km));
        }
        if !self.max_distance_km.is_finite() || self.max_distance_km <= 0.0 {
            return Err(format!(
                "maxDistanceKm must be > 0 (got {})",
                self.max_distance_km
            ));
        }
        if !(0.0..=5.0).contains(&self.min_rating) {
            return Err(format!(
                "minRating must be within [0, 5] (got {})",
                self.min_rating
            ));
        }
        Ok(())
    }

    /// The category to match against, or `None` when the filter is "any".
    #[must_use]
    pub fn effective_category(&self) -> Option<&str> {
        let trimmed = self.category.trim();
        if normalize_category_filter(trimmed).is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

/// Map "any" sentinels (`""`, `All`, `any`) to the empty-category marker.
#[must_use]
pub fn normalize_category_filter(category: &str) -> String {
    let trimmed = category.trim();
    if ANY_CATEGORY_SENTINELS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(trimmed))
    {
        String::new()
    } else {
        trimmed.to_string()
    }
}

#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Deterministic per-category placeholder image path. Unknown categories
/// share the adventure image.
#[must_use]
pub fn placeholder_image(category: &str) -> String {
    let category = Category::from_name(category).unwrap_or(Category::Adventure);
    format!(
        "/images/placeholders/{}.jpg",
        category.as_str().to_ascii_lowercase()
    )
}

/// Devanagari vowel signs and viramas are combining marks, not alphanumerics,
/// but dropping them would mangle the word.
fn is_devanagari_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0900}'..='\u{0903}'
            | '\u{093A}'..='\u{094F}'
            | '\u{0951}'..='\u{0957}'
            | '\u{0962}'..='\u{0963}'
    )
}

/// Generate a slug from a display name. Letters from any script are kept.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || is_devanagari_mark(c) || c == '-' {
                Some(c)
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Stable id for a record without an upstream id: the name's slug, or a
/// coordinate key when the name has nothing sluggable in it.
#[must_use]
pub fn derive_id(name: &str, coordinate: &Coordinate) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        format!(
            "place-{:.4}-{:.4}",
            coordinate.latitude(),
            coordinate.longitude()
        )
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_categories_in_table_order() {
        assert_eq!(Category::infer("Sarangkot Viewpoint"), Category::Viewpoint);
        assert_eq!(Category::infer("Phewa Lake"), Category::Lake);
        assert_eq!(Category::infer("Davis Falls"), Category::Waterfall);
        assert_eq!(Category::infer("Bindhyabasini Temple"), Category::Temple);
        assert_eq!(Category::infer("Poon Hill Trek"), Category::Trekking);
        assert_eq!(Category::infer("International Mountain Museum"), Category::Heritage);
        assert_eq!(Category::infer("Garden of Dreams"), Category::Nature);
    }

    #[test]
    fn first_matching_rule_wins() {
        // "temple" outranks "lake" because Temple comes first in the table.
        assert_eq!(Category::infer("Tal Barahi Temple on Phewa Lake"), Category::Temple);
        assert_eq!(Category::infer("Lakeside falls"), Category::Lake);
    }

    #[test]
    fn unmatched_text_defaults_to_adventure() {
        assert_eq!(Category::infer("Paragliding Launch"), Category::Adventure);
        assert_eq!(Category::infer(""), Category::Adventure);
    }

    #[test]
    fn inference_is_case_insensitive() {
        assert_eq!(Category::infer("WORLD PEACE PAGODA"), Category::Temple);
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(Category::from_name(" lake "), Some(Category::Lake));
        assert_eq!(Category::from_name("museum"), None);
    }

    #[test]
    fn any_sentinels_normalize_to_empty() {
        assert_eq!(normalize_category_filter("All"), "");
        assert_eq!(normalize_category_filter(""), "");
        assert_eq!(normalize_category_filter("  any "), "");
        assert_eq!(normalize_category_filter("Lake"), "Lake");
    }

    #[test]
    fn effective_category_ignores_sentinel() {
        let mut filter = SearchFilter {
            category: "All".to_string(),
            ..SearchFilter::default()
        };
        assert_eq!(filter.effective_category(), None);
        filter.category = "Temple".to_string();
        assert_eq!(filter.effective_category(), Some("Temple"));
    }

    #[test]
    fn filter_validation_rejects_bad_bounds() {
        let base = SearchFilter::default();
        assert!(base.validate().is_ok());

        let zero_radius = SearchFilter {
            radius_km: 0.0,
            ..base.clone()
        };
        assert!(zero_radius.validate().is_err());

        let high_rating = SearchFilter {
            min_rating: 5.5,
            ..base.clone()
        };
        assert!(high_rating.validate().is_err());

        let nan_distance = SearchFilter {
            max_distance_km: f64::NAN,
            ..base
        };
        assert!(nan_distance.validate().is_err());
    }

    #[test]
    fn filter_deserializes_with_defaults() {
        let filter: SearchFilter = serde_json::from_str(r#"{"minRating": 4.5}"#).unwrap();
        assert!((filter.radius_km - 50.0).abs() < f64::EPSILON);
        assert!((filter.min_rating - 4.5).abs() < f64::EPSILON);
        assert!(filter.category.is_empty());
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert!((round_one_decimal(3.14159) - 3.1).abs() < 1e-9);
        assert!((round_one_decimal(2.25) - 2.3).abs() < 1e-9);
        assert!(round_one_decimal(0.0).abs() < 1e-9);
    }

    #[test]
    fn slugify_strips_punctuation() {
        assert_eq!(slugify("Sarangkot Viewpoint"), "sarangkot-viewpoint");
        assert_eq!(slugify("Devi's Falls"), "devis-falls");
        assert_eq!(slugify("  Bhaktapur  Durbar Square "), "bhaktapur-durbar-square");
    }

    #[test]
    fn slugify_keeps_devanagari_words_whole() {
        assert_eq!(slugify("पशुपतिनाथ मन्दिर"), "पशुपतिनाथ-मन्दिर");
        assert_eq!(slugify("फेवा ताल (पोखरा)"), "फेवा-ताल-पोखरा");
    }

    #[test]
    fn derive_id_falls_back_to_coordinate_key() {
        let coord = Coordinate::new(27.7105, 85.3487).unwrap();
        assert_eq!(derive_id("Boudhanath Stupa", &coord), "boudhanath-stupa");
        assert_eq!(derive_id("!!! ???", &coord), "place-27.7105-85.3487");
        assert_eq!(derive_id("बौद्धनाथ", &coord), "बौद्धनाथ");
    }

    #[test]
    fn placeholder_image_is_per_category() {
        assert_eq!(placeholder_image("Temple"), "/images/placeholders/temple.jpg");
        assert_eq!(placeholder_image(" lake "), "/images/placeholders/lake.jpg");
        assert_eq!(placeholder_image("Boating"), "/images/placeholders/adventure.jpg");
    }

    #[test]
    fn destination_serializes_camel_case() {
        let dest = Destination {
            id: "phewa-lake".to_string(),
            name: "Phewa Lake".to_string(),
            image_url: "https://example.com/phewa.jpg".to_string(),
            distance_km: 1.2,
            category: "Lake".to_string(),
            rating: 4.7,
            tagline: "Boating under Machhapuchhre".to_string(),
            tags: vec!["Lake".to_string()],
            coordinate: Coordinate::new(28.2153, 83.9456).unwrap(),
            weather: None,
        };
        let json = serde_json::to_value(&dest).unwrap();
        assert_eq!(json["imageUrl"], "https://example.com/phewa.jpg");
        assert_eq!(json["distanceKm"], 1.2);
        assert_eq!(json["coordinate"]["latitude"], 28.2153);
        assert!(json.get("weather").is_none(), "absent weather is omitted");
    }
}
