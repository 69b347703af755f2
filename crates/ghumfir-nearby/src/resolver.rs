//! Source-fallback resolver.
//!
//! Queries candidate sources in priority order and stops at the first one
//! that yields usable destinations. A failing or empty source is logged and
//! skipped; only a chain in which no source answered at all is an error.

use ghumfir_core::{Coordinate, Destination};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{NearbyError, SourceFailure};
use crate::filter::{apply_filter, sort_by_distance};
use crate::normalize::normalize_candidates;
use crate::probe::RawCandidate;
use crate::request::{NearbyQuery, SearchRequest};
use crate::source::CandidateSource;

/// How a successful resolution came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// At least one candidate passed the filter.
    Matched,
    /// A source returned candidates but none passed the filter.
    NoneMatched { candidates: usize },
    /// Every source that answered returned an empty payload.
    NoCandidates,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Filtered, sorted and capped destinations.
    pub destinations: Vec<Destination>,
    /// Every normalized candidate from the winning source, sorted by
    /// distance but not filtered.
    pub unfiltered: Vec<Destination>,
    /// Name of the source that produced the candidates.
    pub source: Option<String>,
    pub outcome: ResolveOutcome,
    /// Soft failures encountered before the winning source.
    pub failures: Vec<SourceFailure>,
}

pub struct Resolver<S: CandidateSource> {
    sources: Vec<S>,
    rating_seed: Option<u64>,
}

impl<S: CandidateSource> Resolver<S> {
    /// Build a resolver over `sources`, highest priority first.
    #[must_use]
    pub fn new(sources: Vec<S>) -> Self {
        Self {
            sources,
            rating_seed: None,
        }
    }

    /// Seed the placeholder-rating generator so output is reproducible.
    #[must_use]
    pub fn with_rating_seed(mut self, seed: u64) -> Self {
        self.rating_seed = Some(seed);
        self
    }

    #[must_use]
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Resolve a query against the source chain.
    ///
    /// # Errors
    ///
    /// - [`NearbyError::InvalidInput`] when the coordinate, filter or limit
    ///   is invalid. No source is queried.
    /// - [`NearbyError::AllSourcesExhausted`] when no source produced a
    ///   well-formed response. The failure chain is preserved in order.
    pub async fn resolve(&self, query: &NearbyQuery) -> Result<Resolution, NearbyError> {
        let origin = query.validate()?;
        let request = SearchRequest::build(&origin, &query.filter);

        let mut failures = Vec::new();
        let mut answered = false;

        for source in &self.sources {
            let name = source.name();
            tracing::debug!(source = name, "querying nearby source");

            let raw = match source.fetch(&request).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(source = name, error = %e, "nearby source failed");
                    failures.push(SourceFailure {
                        source_name: name.to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            answered = true;

            let mut candidates = self.normalize(&raw, &origin);
            if candidates.is_empty() {
                tracing::info!(
                    source = name,
                    raw = raw.len(),
                    "nearby source returned no usable candidates"
                );
                failures.push(SourceFailure {
                    source_name: name.to_string(),
                    reason: "no candidates".to_string(),
                });
                continue;
            }

            sort_by_distance(&mut candidates);
            let mut destinations = apply_filter(&candidates, &query.filter);
            destinations.truncate(query.limit);

            let outcome = if destinations.is_empty() {
                ResolveOutcome::NoneMatched {
                    candidates: candidates.len(),
                }
            } else {
                ResolveOutcome::Matched
            };

            tracing::info!(
                source = name,
                candidates = candidates.len(),
                matched = destinations.len(),
                "nearby search resolved"
            );

            return Ok(Resolution {
                destinations,
                unfiltered: candidates,
                source: Some(name.to_string()),
                outcome,
                failures,
            });
        }

        if answered {
            tracing::info!("every answering nearby source was empty");
            return Ok(Resolution {
                destinations: Vec::new(),
                unfiltered: Vec::new(),
                source: None,
                outcome: ResolveOutcome::NoCandidates,
                failures,
            });
        }

        tracing::error!(failures = failures.len(), "all nearby sources exhausted");
        Err(NearbyError::AllSourcesExhausted { failures })
    }

    fn normalize(&self, raw: &[RawCandidate], origin: &Coordinate) -> Vec<Destination> {
        match self.rating_seed {
            Some(seed) => normalize_candidates(raw, origin, &mut StdRng::seed_from_u64(seed)),
            None => normalize_candidates(raw, origin, &mut rand::rng()),
        }
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
