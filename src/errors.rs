use std::{collections::HashMap, fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rate_limit::{time_until_daily_reset, RateLimitInfo};

/// Per-field validation messages returned with a 400 response.
pub type FieldErrors = HashMap<String, Vec<String>>;

/// Classified HTTP failure returned by the Emailit API.
///
/// Produced exactly once per failed call by the request executor. 403 is not a
/// distinguished case: it surfaces as [`ApiError::Other`] with status 403.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// 400: the request was rejected, optionally with per-field messages.
    #[error("validation failed (400): {message}")]
    Validation {
        message: String,
        field_errors: Option<FieldErrors>,
    },

    /// 401: missing or invalid API key.
    #[error("authentication failed (401): {message}")]
    Authentication { message: String },

    /// 404: the addressed resource does not exist.
    #[error("not found (404): {message}")]
    NotFound { message: String },

    /// 413: the message exceeds the maximum allowed size.
    #[error("payload too large (413): {message}")]
    PayloadTooLarge { message: String },

    /// 429 while the daily quota still has room: too many requests per second.
    #[error("rate limit exceeded (429): too many requests per second")]
    RateLimited { rate_limit: RateLimitInfo },

    /// 429 with the daily quota exhausted.
    #[error("daily sending limit exceeded (429)")]
    DailyLimitExceeded { rate_limit: RateLimitInfo },

    /// Any 5xx. The message carries the [`SERVER_ERROR_PREFIX`] marker.
    #[error("{message} ({status})")]
    Server { status: u16, message: String },

    /// Any other status, including 403.
    #[error("{message} ({status})")]
    Other { status: u16, message: String },
}

/// Marker prepended to the message of every [`ApiError::Server`].
pub const SERVER_ERROR_PREFIX: &str = "Server error: ";

impl ApiError {
    /// HTTP status that produced this error.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation { .. } => 400,
            ApiError::Authentication { .. } => 401,
            ApiError::NotFound { .. } => 404,
            ApiError::PayloadTooLarge { .. } => 413,
            ApiError::RateLimited { .. } | ApiError::DailyLimitExceeded { .. } => 429,
            ApiError::Server { status, .. } | ApiError::Other { status, .. } => *status,
        }
    }

    /// Human-readable message resolved from the error body.
    pub fn message(&self) -> String {
        match self {
            ApiError::Validation { message, .. }
            | ApiError::Authentication { message }
            | ApiError::NotFound { message }
            | ApiError::PayloadTooLarge { message }
            | ApiError::Server { message, .. }
            | ApiError::Other { message, .. } => message.clone(),
            ApiError::RateLimited { .. } => {
                "Rate limit exceeded. Too many requests per second.".to_string()
            }
            ApiError::DailyLimitExceeded { .. } => "Daily sending limit exceeded.".to_string(),
        }
    }

    /// Rate-limit snapshot attached to 429 errors.
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        match self {
            ApiError::RateLimited { rate_limit } | ApiError::DailyLimitExceeded { rate_limit } => {
                Some(rate_limit)
            }
            _ => None,
        }
    }

    /// Per-field validation messages, when the 400 body carried them.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::Validation { field_errors, .. } => field_errors.as_ref(),
            _ => None,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, ApiError::Other { status: 403, .. })
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Server { .. })
    }

    /// How long to back off before retrying.
    ///
    /// Per-second limits use the server's `Retry-After` hint; the daily limit
    /// waits until the next midnight UTC. Other kinds return `None`.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ApiError::RateLimited { rate_limit } => rate_limit.retry_after(),
            ApiError::DailyLimitExceeded { .. } => Some(time_until_daily_reset()),
            _ => None,
        }
    }

    /// Time until the daily quota resets (next midnight UTC), for
    /// [`ApiError::DailyLimitExceeded`] only.
    pub fn time_until_reset(&self) -> Option<Duration> {
        match self {
            ApiError::DailyLimitExceeded { .. } => Some(time_until_daily_reset()),
            _ => None,
        }
    }
}

/// Transport-level error (timeouts, DNS/TLS/connectivity).
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    #[source]
    pub source: Option<reqwest::Error>,
}

/// Broad transport error kinds for classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Request,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Request => "request",
            TransportErrorKind::Other => "transport",
        };
        write!(f, "{label}")
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_request() {
            TransportErrorKind::Request
        } else {
            TransportErrorKind::Other
        };
        TransportError {
            kind,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Convenience alias for fallible SDK results.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type surfaced by the SDK.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("failed to deserialize response: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("failed to serialize request: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// The classified API error, if this failure came from an HTTP response.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status of a classified API error.
    pub fn status(&self) -> Option<u16> {
        self.as_api().map(ApiError::status)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
