use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    InvalidCoordinates,
    /// The position source is absent on this platform.
    Unsupported,
    /// The source reported an error but the payload was empty or unreadable.
    Unknown,
}

impl LocationErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::PositionUnavailable => "position_unavailable",
            Self::Timeout => "timeout",
            Self::InvalidCoordinates => "invalid_coordinates",
            Self::Unsupported => "unsupported",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for LocationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("location error ({kind}): {message}")]
pub struct LocationError {
    pub kind: LocationErrorKind,
    pub message: String,
}

impl LocationError {
    pub fn new(kind: LocationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Classify an error payload reported by a position source.
///
/// Understands numeric codes (1 denied, 2 unavailable, 3 timeout), the
/// matching upper-case string codes, and falls back to keywords in
/// `message`. `null`, `{}`, `""` and `[]` map to
/// [`LocationErrorKind::Unknown`].
#[must_use]
pub fn classify_error(payload: &Value) -> LocationError {
    if is_empty_payload(payload) {
        return LocationError::new(
            LocationErrorKind::Unknown,
            "position source reported an empty error",
        );
    }

    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| payload.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    let kind = payload
        .get("code")
        .and_then(kind_from_code)
        .or_else(|| message.as_deref().and_then(kind_from_message))
        .unwrap_or(LocationErrorKind::Unknown);

    let message = message.unwrap_or_else(|| format!("position source error: {payload}"));
    LocationError::new(kind, message)
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn kind_from_code(code: &Value) -> Option<LocationErrorKind> {
    if let Some(n) = code.as_i64() {
        return match n {
            1 => Some(LocationErrorKind::PermissionDenied),
            2 => Some(LocationErrorKind::PositionUnavailable),
            3 => Some(LocationErrorKind::Timeout),
            _ => None,
        };
    }
    match code.as_str()?.trim().to_ascii_uppercase().as_str() {
        "PERMISSION_DENIED" | "1" => Some(LocationErrorKind::PermissionDenied),
        "POSITION_UNAVAILABLE" | "2" => Some(LocationErrorKind::PositionUnavailable),
        "TIMEOUT" | "3" => Some(LocationErrorKind::Timeout),
        _ => None,
    }
}

fn kind_from_message(message: &str) -> Option<LocationErrorKind> {
    let lowered = message.to_lowercase();
    if lowered.contains("denied") || lowered.contains("permission") {
        Some(LocationErrorKind::PermissionDenied)
    } else if lowered.contains("timeout") || lowered.contains("timed out") {
        Some(LocationErrorKind::Timeout)
    } else if lowered.contains("unavailable") {
        Some(LocationErrorKind::PositionUnavailable)
    } else {
        None
    }
}
