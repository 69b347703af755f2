use thiserror::Error;

/// Failure of a single candidate source. Never fatal on its own.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{source_name} timed out after {timeout_secs}s")]
    Timeout {
        source_name: String,
        timeout_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("malformed response from {source_name}: {reason}")]
    Malformed { source_name: String, reason: String },

    #[error("invalid source URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// One entry in the failure chain reported with
/// [`NearbyError::AllSourcesExhausted`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source_name: String,
    pub reason: String,
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source_name, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum NearbyError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No source produced a well-formed answer. Distinct from a search that
    /// ran and matched nothing.
    #[error("all nearby sources exhausted ({})", format_failures(.failures))]
    AllSourcesExhausted { failures: Vec<SourceFailure> },
}

fn format_failures(failures: &[SourceFailure]) -> String {
    if failures.is_empty() {
        return "no sources configured".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
