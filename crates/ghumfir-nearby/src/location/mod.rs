//! Coordinate acquisition.
//!
//! [`acquire`] asks a [`PositionSource`] for one fix, waits at most
//! `timeout + hard_stop_margin`, and validates the result. There is no retry
//! here; callers decide whether to ask again.

mod error;
mod source;

use std::time::Duration;

use ghumfir_core::Coordinate;
use tokio::sync::oneshot;

pub use error::{classify_error, LocationError, LocationErrorKind};
pub use source::{ManualPosition, PositionReply, PositionSource, RawPosition, RequestHandle};

#[derive(Debug, Clone, PartialEq)]
pub struct AcquireOptions {
    /// Timeout the source itself is asked to honour.
    pub timeout: Duration,
    /// Extra time granted before [`acquire`] gives up on a silent source.
    pub hard_stop_margin: Duration,
    pub high_accuracy: bool,
    /// Oldest cached fix the source may return.
    pub maximum_age: Duration,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            hard_stop_margin: Duration::from_secs(5),
            high_accuracy: true,
            maximum_age: Duration::ZERO,
        }
    }
}

impl AcquireOptions {
    #[must_use]
    pub fn from_config(config: &ghumfir_core::AppConfig) -> Self {
        Self {
            timeout: config.location_timeout(),
            hard_stop_margin: config
                .location_hard_stop()
                .saturating_sub(config.location_timeout()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn hard_stop(&self) -> Duration {
        self.timeout.saturating_add(self.hard_stop_margin)
    }
}

/// Unregisters the request with its source unless a reply was received.
///
/// Dropping the `acquire` future mid-flight runs this too, so a cancelled
/// caller never leaves a completion handler behind.
struct PendingRequest<'a, P: PositionSource + ?Sized> {
    source: &'a P,
    handle: RequestHandle,
    armed: bool,
}

impl<P: PositionSource + ?Sized> PendingRequest<'_, P> {
    fn settle(&mut self) {
        self.armed = false;
    }
}

impl<P: PositionSource + ?Sized> Drop for PendingRequest<'_, P> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!(handle = self.handle.0, "cancelling position request");
            self.source.cancel(self.handle);
        }
    }
}

/// Acquire one validated coordinate from `source`.
///
/// # Errors
///
/// Returns a [`LocationError`] whose kind tells the caller what went wrong:
/// `Unsupported` when the source is unavailable, `Timeout` when nothing came
/// back before the hard stop, `InvalidCoordinates` for NaN or out-of-range
/// fixes, and the classified source error otherwise.
pub async fn acquire<P: PositionSource + ?Sized>(
    source: &P,
    options: &AcquireOptions,
) -> Result<Coordinate, LocationError> {
    if !source.is_supported() {
        return Err(LocationError::new(
            LocationErrorKind::Unsupported,
            "no position source available",
        ));
    }

    let (tx, rx) = oneshot::channel();
    let handle = source.request_position(options, tx);
    let mut pending = PendingRequest {
        source,
        handle,
        armed: true,
    };

    let hard_stop = options.hard_stop();
    let reply = match tokio::time::timeout(hard_stop, rx).await {
        Ok(reply) => reply,
        Err(_) => {
            tracing::warn!(
                hard_stop_ms = u64::try_from(hard_stop.as_millis()).unwrap_or(u64::MAX),
                "position source did not reply before hard stop"
            );
            return Err(LocationError::new(
                LocationErrorKind::Timeout,
                format!("no position within {hard_stop:?}"),
            ));
        }
    };
    pending.settle();

    match reply {
        Ok(Ok(position)) => validate_position(&position),
        Ok(Err(payload)) => {
            let err = classify_error(&payload);
            tracing::warn!(
                kind = %err.kind,
                message = %err.message,
                "position source reported an error"
            );
            Err(err)
        }
        Err(_) => Err(LocationError::new(
            LocationErrorKind::Unknown,
            "position source dropped the request without replying",
        )),
    }
}

fn validate_position(position: &RawPosition) -> Result<Coordinate, LocationError> {
    tracing::debug!(
        latitude = position.latitude,
        longitude = position.longitude,
        accuracy_m = ?position.accuracy_m,
        timestamp = ?position.timestamp,
        "position acquired"
    );
    Coordinate::new(position.latitude, position.longitude)
        .map_err(|e| LocationError::new(LocationErrorKind::InvalidCoordinates, e.to_string()))
}

#[cfg(test)]
#[path = "location_test.rs"]
mod tests;
