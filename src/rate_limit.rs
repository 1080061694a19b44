//! Rate-limit telemetry carried in Emailit response headers.
//!
//! Every response (success or failure) reports the per-second and per-day quota
//! counters. Parsing never fails: missing or malformed headers resolve to `0`
//! (counters) or `None` (retry hint).

use std::time::Duration;

use chrono::{DateTime, Days, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::{
    RATE_LIMIT_DAILY_LIMIT_HEADER, RATE_LIMIT_DAILY_REMAINING_HEADER, RATE_LIMIT_LIMIT_HEADER,
    RATE_LIMIT_REMAINING_HEADER, RETRY_AFTER_HEADER,
};

/// Snapshot of the quota counters observed on a single response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    /// Maximum requests per second.
    pub limit: i64,
    /// Remaining requests in the current second window.
    pub remaining: i64,
    /// Maximum requests per day.
    pub daily_limit: i64,
    /// Remaining requests for today.
    pub daily_remaining: i64,
    /// Seconds to wait before retrying, from `Retry-After`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<i64>,
}

impl RateLimitInfo {
    /// Parses the snapshot from a response header map.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_header_pairs(
            headers
                .iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v))),
        )
    }

    /// Parses the snapshot from raw `(name, value)` pairs.
    ///
    /// Names are matched exactly first, then case-insensitively.
    pub fn from_header_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
        Self {
            limit: int_header(&pairs, RATE_LIMIT_LIMIT_HEADER).unwrap_or(0),
            remaining: int_header(&pairs, RATE_LIMIT_REMAINING_HEADER).unwrap_or(0),
            daily_limit: int_header(&pairs, RATE_LIMIT_DAILY_LIMIT_HEADER).unwrap_or(0),
            daily_remaining: int_header(&pairs, RATE_LIMIT_DAILY_REMAINING_HEADER).unwrap_or(0),
            retry_after_seconds: int_header(&pairs, RETRY_AFTER_HEADER),
        }
    }

    /// Whether the per-second limit has been reached.
    pub fn is_rate_limit_reached(&self) -> bool {
        self.remaining <= 0 && self.limit > 0
    }

    /// Whether the daily limit has been reached.
    pub fn is_daily_limit_reached(&self) -> bool {
        self.daily_remaining <= 0 && self.daily_limit > 0
    }

    /// The server's retry hint as a duration. Negative hints are ignored.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after_seconds
            .and_then(|secs| u64::try_from(secs).ok())
            .map(Duration::from_secs)
    }
}

/// Estimated time until the daily quota resets (next midnight UTC).
pub fn time_until_daily_reset() -> Duration {
    time_until_daily_reset_from(Utc::now())
}

pub(crate) fn time_until_daily_reset_from(now: DateTime<Utc>) -> Duration {
    let midnight = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc());
    match midnight {
        Some(midnight) => (midnight - now).to_std().unwrap_or_default(),
        None => Duration::ZERO,
    }
}

fn find_header<'a>(pairs: &[(&'a str, &'a str)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| *key == name)
        .or_else(|| pairs.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)))
        .map(|(_, value)| *value)
}

fn int_header(pairs: &[(&str, &str)], name: &str) -> Option<i64> {
    find_header(pairs, name).and_then(|v| v.trim().parse::<i64>().ok())
}
