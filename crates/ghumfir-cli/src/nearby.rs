//! `nearby` command: acquire, resolve, then fall back the way the server does.

use ghumfir_core::{AppConfig, Destination, SearchFilter};
use ghumfir_nearby::{
    acquire, closest_anyway, AcquireOptions, HttpSource, ManualPosition, NearbyError,
    NearbyQuery, ResolveOutcome, Resolver,
};

use crate::NearbyArgs;

impl NearbyArgs {
    fn filter(&self) -> SearchFilter {
        SearchFilter {
            radius_km: self.radius_km,
            category: self.category.clone(),
            min_rating: self.min_rating,
            max_distance_km: self.max_distance_km,
        }
    }
}

/// Closest-anyway results never exceed the requested limit.
fn closest_anyway_limit(config: &AppConfig, limit: usize) -> usize {
    config.closest_anyway_count.min(limit)
}

/// # Errors
///
/// Returns an error for invalid input, an unreadable popular catalog, or a
/// source URL that cannot be parsed. Source failures are not errors.
pub(crate) async fn run_nearby(config: &AppConfig, args: &NearbyArgs) -> anyhow::Result<()> {
    let limit = args.limit.unwrap_or(config.result_limit);
    let options = AcquireOptions::from_config(config);

    let origin = match acquire(&ManualPosition::new(args.lat, args.lng), &options).await {
        Ok(origin) => origin,
        Err(e) => {
            eprintln!("location unavailable ({e}); showing popular destinations");
            return show_popular(config, None, limit);
        }
    };

    let mut resolver = Resolver::new(HttpSource::chain_from_config(config)?);
    if let Some(seed) = args.seed {
        resolver = resolver.with_rating_seed(seed);
    }

    tracing::debug!(%origin, sources = ?resolver.source_names(), "resolving nearby destinations");
    let query = NearbyQuery::new(origin, args.filter(), limit);
    match resolver.resolve(&query).await {
        Ok(resolution) => {
            let source = resolution.source.as_deref().unwrap_or("none");
            match resolution.outcome {
                ResolveOutcome::Matched => {
                    println!("{} destinations from {source}", resolution.destinations.len());
                    print_destinations(&resolution.destinations);
                }
                ResolveOutcome::NoneMatched { candidates } => {
                    println!(
                        "none of {candidates} candidates from {source} matched; closest anyway:"
                    );
                    print_destinations(&closest_anyway(
                        &resolution.unfiltered,
                        closest_anyway_limit(config, limit),
                    ));
                }
                ResolveOutcome::NoCandidates => println!("no destinations found nearby"),
            }
            Ok(())
        }
        Err(NearbyError::InvalidInput(message)) => anyhow::bail!("invalid input: {message}"),
        Err(e @ NearbyError::AllSourcesExhausted { .. }) => {
            eprintln!("{e}; showing popular destinations");
            show_popular(config, Some(&origin), limit)
        }
    }
}

fn show_popular(
    config: &AppConfig,
    origin: Option<&ghumfir_core::Coordinate>,
    limit: usize,
) -> anyhow::Result<()> {
    let catalog = ghumfir_core::load_popular(&config.popular_path)?;
    let mut destinations = catalog.destinations_from(origin);
    destinations.truncate(limit);
    print_destinations(&destinations);
    Ok(())
}

pub(crate) fn print_destinations(destinations: &[Destination]) {
    if destinations.is_empty() {
        println!("(none)");
        return;
    }
    println!(
        "{:<32}{:<12}{:>8}{:>8}  TAGS",
        "NAME", "CATEGORY", "KM", "RATING"
    );
    for d in destinations {
        println!(
            "{:<32}{:<12}{:>8.1}{:>8.1}  {}",
            truncate(&d.name, 31),
            truncate(&d.category, 11),
            d.distance_km,
            d.rating,
            d.tags.join(", ")
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
