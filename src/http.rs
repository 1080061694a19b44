use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    errors::{ApiError, Error, FieldErrors, Result, SERVER_ERROR_PREFIX},
    rate_limit::RateLimitInfo,
    API_VERSION_SEGMENT,
};

/// Error body returned by the API. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(
        default,
        rename = "errors",
        skip_serializing_if = "Option::is_none"
    )]
    pub field_errors: Option<FieldErrors>,
}

impl ErrorEnvelope {
    /// Best available message: `message`, `error`, `code`, `details`, then a fallback.
    pub fn resolved_message(&self) -> String {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .or(self.code.as_deref())
            .or(self.details.as_deref())
            .unwrap_or("Unknown error")
            .to_string()
    }
}

/// Maps a failed response to its [`ApiError`] kind. Never fails.
///
/// A body that does not parse as an [`ErrorEnvelope`] is treated as absent and
/// the message falls back to a description of the status line.
pub fn classify_error(status: u16, body: &str, rate_limit: Option<RateLimitInfo>) -> ApiError {
    let envelope = decode_json::<Option<ErrorEnvelope>>(body.as_bytes())
        .ok()
        .flatten();
    let message = envelope
        .as_ref()
        .map(ErrorEnvelope::resolved_message)
        .unwrap_or_else(|| status_fallback_message(status));

    match status {
        400 => ApiError::Validation {
            message,
            field_errors: envelope.and_then(|e| e.field_errors),
        },
        401 => ApiError::Authentication { message },
        404 => ApiError::NotFound { message },
        413 => ApiError::PayloadTooLarge {
            message: envelope.and_then(|e| e.details).unwrap_or(message),
        },
        429 => {
            let rate_limit = rate_limit.unwrap_or_default();
            if rate_limit.is_daily_limit_reached() {
                ApiError::DailyLimitExceeded { rate_limit }
            } else {
                ApiError::RateLimited { rate_limit }
            }
        }
        s if s >= 500 => ApiError::Server {
            status,
            message: format!("{SERVER_ERROR_PREFIX}{message}"),
        },
        _ => ApiError::Other { status, message },
    }
}

fn status_fallback_message(status: u16) -> String {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status");
    format!("request failed with status code {status} ({reason})")
}

/// Decodes a response body, matching object keys case-insensitively.
///
/// Keys are folded to ASCII lowercase before field mapping. When a body holds
/// both an exact lowercase key and a differently cased twin, the lowercase one wins.
pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> serde_json::Result<T> {
    let value = serde_json::from_slice::<Value>(body)?;
    serde_json::from_value(lowercase_keys(value))
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut folded = Map::with_capacity(map.len());
            for (key, value) in map {
                let value = lowercase_keys(value);
                if key.bytes().any(|b| b.is_ascii_uppercase()) {
                    folded.entry(key.to_ascii_lowercase()).or_insert(value);
                } else {
                    folded.insert(key, value);
                }
            }
            Value::Object(folded)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

/// Query string pairs. Optional filters are only attached when non-empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    pub(crate) fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn push(&mut self, key: &'static str, value: impl ToString) {
        self.0.push((key, value.to_string()));
    }

    pub(crate) fn push_non_empty(&mut self, key: &'static str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.push(key, value);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// A single call into the request executor: verb, path, query, body, idempotency key.
#[derive(Clone, Debug)]
pub(crate) struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) segments: Vec<String>,
    pub(crate) query: QueryParams,
    pub(crate) body: Option<Vec<u8>>,
    pub(crate) idempotency_key: Option<String>,
}

impl ApiRequest {
    /// Starts a request against `/v2/<segments...>`.
    pub(crate) fn new<S: AsRef<str>>(method: Method, segments: &[S]) -> Self {
        let mut path = Vec::with_capacity(segments.len() + 1);
        path.push(API_VERSION_SEGMENT.to_string());
        path.extend(segments.iter().map(|s| s.as_ref().to_string()));
        Self {
            method,
            segments: path,
            query: QueryParams::new(),
            body: None,
            idempotency_key: None,
        }
    }

    pub(crate) fn get<S: AsRef<str>>(segments: &[S]) -> Self {
        Self::new(Method::GET, segments)
    }

    pub(crate) fn post<S: AsRef<str>>(segments: &[S]) -> Self {
        Self::new(Method::POST, segments)
    }

    pub(crate) fn delete<S: AsRef<str>>(segments: &[S]) -> Self {
        Self::new(Method::DELETE, segments)
    }

    /// Serializes `body` as the JSON payload.
    pub(crate) fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body).map_err(Error::Serialization)?);
        Ok(self)
    }

    pub(crate) fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Attaches an `Idempotency-Key`; blank keys are ignored.
    pub(crate) fn idempotency_key(mut self, key: Option<&str>) -> Self {
        self.idempotency_key = key.filter(|k| !k.is_empty()).map(str::to_string);
        self
    }

    /// `/v2/...` path, for logging.
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Rejects blank resource identifiers before any network activity.
pub(crate) fn require_id<'a>(name: &str, id: &'a str) -> Result<&'a str> {
    if id.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{name} is required")));
    }
    Ok(id)
}
