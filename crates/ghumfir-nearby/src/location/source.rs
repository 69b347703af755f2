//! Position sources and the reply protocol they use.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::oneshot;

use super::AcquireOptions;

/// A raw fix as reported by the sensor. `accuracy_m` and `timestamp` are
/// logged but never reach the [`ghumfir_core::Coordinate`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawPosition {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: None,
            timestamp: None,
        }
    }
}

/// Completion channel handed to a source. The error side carries the
/// source's own error payload, which may be empty or malformed.
pub type PositionReply = oneshot::Sender<Result<RawPosition, Value>>;

/// Identifies an in-flight position request so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestHandle(pub u64);

/// A device or platform position provider.
///
/// `request_position` must reply at most once through `reply`. After
/// `cancel` the source must drop the sender without replying.
pub trait PositionSource: Send + Sync {
    fn is_supported(&self) -> bool;

    fn request_position(&self, options: &AcquireOptions, reply: PositionReply) -> RequestHandle;

    fn cancel(&self, handle: RequestHandle);
}

#[derive(Debug, Clone)]
enum ManualReply {
    Position(RawPosition),
    Error(Value),
    Unsupported,
}

/// Source that answers immediately with a fixed position or error.
///
/// Used when coordinates arrive from a client request or the command line.
#[derive(Debug)]
pub struct ManualPosition {
    reply: ManualReply,
    next_handle: AtomicU64,
}

impl ManualPosition {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::with_reply(ManualReply::Position(RawPosition {
            latitude,
            longitude,
            accuracy_m: None,
            timestamp: Some(Utc::now()),
        }))
    }

    /// A source that always fails with `payload`.
    #[must_use]
    pub fn failing(payload: Value) -> Self {
        Self::with_reply(ManualReply::Error(payload))
    }

    #[must_use]
    pub fn unsupported() -> Self {
        Self::with_reply(ManualReply::Unsupported)
    }

    fn with_reply(reply: ManualReply) -> Self {
        Self {
            reply,
            next_handle: AtomicU64::new(1),
        }
    }
}

impl PositionSource for ManualPosition {
    fn is_supported(&self) -> bool {
        !matches!(self.reply, ManualReply::Unsupported)
    }

    fn request_position(&self, _options: &AcquireOptions, reply: PositionReply) -> RequestHandle {
        let handle = RequestHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let message = match &self.reply {
            ManualReply::Position(position) => Ok(position.clone()),
            ManualReply::Error(payload) => Err(payload.clone()),
            ManualReply::Unsupported => Err(Value::Null),
        };
        // The receiver may already be gone; nothing to do then.
        let _ = reply.send(message);
        handle
    }

    fn cancel(&self, _handle: RequestHandle) {}
}
