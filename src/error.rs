//! Relay error types.
//!
//! [`TransportError`] covers failures of a single peer's connection and is
//! always recovered locally by ending the affected task. [`RelayError`] is
//! the service-level error; it maps to an HTTP status code and a structured
//! JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// ```json
/// {
///   "error": {
///     "code": 3001,
///     "message": "hub unavailable",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Failure of a read or write on a peer connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed locally; no further frames flow.
    #[error("connection closed")]
    Closed,

    /// The remote end went away without a close handshake.
    #[error("connection dropped without close frame")]
    Disconnected,

    /// A read or write did not complete within its deadline.
    #[error("deadline elapsed")]
    TimedOut,

    /// The transport reported a protocol violation or I/O failure.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    /// Returns `true` for failures that are a normal way for a session to
    /// end and should not be reported as errors.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(self, Self::Closed | Self::Disconnected | Self::TimedOut)
    }
}

/// WebSocket close status sent by the remote end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseCode(pub u16);

impl CloseCode {
    /// 1000: normal closure.
    pub const NORMAL: Self = Self(1000);
    /// 1001: endpoint going away (tab closed, server restart).
    pub const GOING_AWAY: Self = Self(1001);
    /// 1005: close frame carried no status code.
    pub const NO_STATUS: Self = Self(1005);
    /// 1006: connection lost without a close frame.
    pub const ABNORMAL: Self = Self(1006);

    /// Returns `true` if a session ending with this code is routine.
    ///
    /// Going-away and abnormal closure are the usual ways a browser tab
    /// leaves. Normal closure and a bare close frame are accepted as well,
    /// since both mean the client ended the session on purpose.
    #[must_use]
    pub const fn is_expected(self) -> bool {
        matches!(self.0, 1000 | 1001 | 1005 | 1006)
    }
}

/// Service-level error with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category  | HTTP Status                 |
/// |-----------|-----------|-----------------------------|
/// | 1000–1999 | Config    | 500 Internal Server Error   |
/// | 3000–3999 | Server    | 503 Service Unavailable     |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The coordinator loop is no longer accepting requests.
    #[error("hub unavailable")]
    HubUnavailable,

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Config(_) => 1001,
            Self::HubUnavailable => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::HubUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routine_close_codes_are_expected() {
        assert!(CloseCode::NORMAL.is_expected());
        assert!(CloseCode::GOING_AWAY.is_expected());
        assert!(CloseCode::NO_STATUS.is_expected());
        assert!(CloseCode::ABNORMAL.is_expected());
        assert!(!CloseCode(1002).is_expected());
        assert!(!CloseCode(4000).is_expected());
    }

    #[test]
    fn protocol_errors_are_unexpected() {
        assert!(TransportError::Closed.is_expected());
        assert!(TransportError::Disconnected.is_expected());
        assert!(!TransportError::Protocol("bad frame".to_string()).is_expected());
    }

    #[test]
    fn hub_unavailable_maps_to_503() {
        let err = RelayError::HubUnavailable;
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), 3001);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
