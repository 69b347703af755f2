//! Nearby-destination pipeline.
//!
//! [`location`] turns a position source into a validated [`Coordinate`];
//! [`Resolver`] queries candidate sources in priority order, normalizes
//! whatever shape each returns into [`Destination`] records, then filters
//! and sorts them by distance.

pub mod cache;
pub mod error;
pub mod filter;
pub mod location;
pub mod normalize;
pub mod probe;
pub mod request;
pub mod resolver;
pub mod source;

pub use cache::{cache_key, CachedResult, MemoryCache, NoCache, ResultCache};
pub use error::{NearbyError, SourceError, SourceFailure};
pub use filter::{apply_filter, closest_anyway, sort_by_distance};
pub use location::{
    acquire, classify_error, AcquireOptions, LocationError, LocationErrorKind, ManualPosition,
    PositionReply, PositionSource, RawPosition, RequestHandle,
};
pub use normalize::{normalize_candidate, normalize_candidates};
pub use probe::{extract_candidates, RawCandidate};
pub use request::{NearbyQuery, SearchRequest};
pub use resolver::{Resolution, ResolveOutcome, Resolver};
pub use source::{CandidateSource, HttpSource};

pub use ghumfir_core::{Coordinate, Destination, SearchFilter};
