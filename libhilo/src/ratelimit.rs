//! Rate-limit bookkeeping for the posting endpoint.
//!
//! Nothing here blocks or throttles on its own; the engine only derives a
//! user-facing wait suggestion from the platform's throttling headers and
//! leaves the retry decision to the caller.

use chrono::{DateTime, Utc};

/// Raw throttling header values captured off a rejected response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// `retry-after`, seconds as decimal text.
    pub retry_after: Option<String>,
    /// `x-rate-limit-limit`, the window ceiling.
    pub limit: Option<String>,
    /// `x-rate-limit-remaining`, requests left in the window.
    pub remaining: Option<String>,
    /// `x-rate-limit-reset`, UTC epoch seconds when the window resets.
    pub reset: Option<String>,
}

/// Informational snapshot of an endpoint's rate-limit window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub endpoint: String,
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: DateTime<Utc>,
}

impl RateLimitStatus {
    /// Build a snapshot from captured headers; `None` when no counting
    /// header is present at all.
    pub fn from_headers(endpoint: &str, headers: &RateLimitHeaders) -> Option<Self> {
        if headers.limit.is_none() && headers.remaining.is_none() && headers.reset.is_none() {
            return None;
        }
        let parse = |value: &Option<String>| {
            value
                .as_deref()
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(0)
        };
        let reset_ts = headers
            .reset
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0);
        Some(Self {
            endpoint: endpoint.to_string(),
            limit: parse(&headers.limit),
            remaining: parse(&headers.remaining),
            reset_time: DateTime::<Utc>::from_timestamp(reset_ts, 0).unwrap_or(DateTime::UNIX_EPOCH),
        })
    }
}

impl std::fmt::Display for RateLimitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Endpoint: {}\nLimit: {} requests\nRemaining: {}\nResets at: {}",
            self.endpoint,
            self.limit,
            self.remaining,
            self.reset_time.format("%H:%M:%S")
        )
    }
}

/// Suggested seconds to wait before retrying, derived from throttling
/// headers.
///
/// Prefers `retry-after` (floored, minimum one second); falls back to the
/// reset timestamp relative to `now` (epoch seconds, minimum one second);
/// `None` when neither header yields a number. Advisory only.
pub fn compute_wait_seconds(headers: &RateLimitHeaders, now: i64) -> Option<u64> {
    if let Some(retry_after) = headers.retry_after.as_deref() {
        if let Ok(value) = retry_after.trim().parse::<f64>() {
            return Some((value.floor() as i64).max(1) as u64);
        }
    }
    if let Some(reset) = headers.reset.as_deref() {
        return match reset.trim().parse::<i64>() {
            Ok(reset_ts) => Some((reset_ts - now).max(1) as u64),
            Err(_) => None,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(retry_after: Option<&str>, reset: Option<&str>) -> RateLimitHeaders {
        RateLimitHeaders {
            retry_after: retry_after.map(str::to_string),
            reset: reset.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_prefers_retry_after() {
        let wait = compute_wait_seconds(&headers(Some("120"), Some("9999999999")), 1_000);
        assert_eq!(wait, Some(120));
    }

    #[test]
    fn test_retry_after_is_floored() {
        assert_eq!(compute_wait_seconds(&headers(Some("90.9"), None), 0), Some(90));
    }

    #[test]
    fn test_retry_after_minimum_is_one_second() {
        assert_eq!(compute_wait_seconds(&headers(Some("0"), None), 0), Some(1));
        assert_eq!(compute_wait_seconds(&headers(Some("-5"), None), 0), Some(1));
    }

    #[test]
    fn test_falls_back_to_reset_timestamp() {
        let now = 1_700_000_000;
        let wait = compute_wait_seconds(&headers(None, Some("1700000300")), now);
        assert_eq!(wait, Some(300));
    }

    #[test]
    fn test_reset_in_the_past_floors_to_one() {
        let now = 1_700_000_000;
        let wait = compute_wait_seconds(&headers(None, Some("1699999000")), now);
        assert_eq!(wait, Some(1));
    }

    #[test]
    fn test_unparsable_retry_after_falls_back_to_reset() {
        let wait = compute_wait_seconds(&headers(Some("soon"), Some("1050")), 1_000);
        assert_eq!(wait, Some(50));
    }

    #[test]
    fn test_unparsable_reset_yields_none() {
        assert_eq!(compute_wait_seconds(&headers(None, Some("later")), 0), None);
    }

    #[test]
    fn test_no_headers_yields_none() {
        assert_eq!(compute_wait_seconds(&RateLimitHeaders::default(), 0), None);
    }

    #[test]
    fn test_status_from_headers() {
        let headers = RateLimitHeaders {
            limit: Some("300".to_string()),
            remaining: Some("7".to_string()),
            reset: Some("1700000000".to_string()),
            ..Default::default()
        };
        let status = RateLimitStatus::from_headers("/2/tweets", &headers).unwrap();
        assert_eq!(status.endpoint, "/2/tweets");
        assert_eq!(status.limit, 300);
        assert_eq!(status.remaining, 7);
        assert_eq!(status.reset_time.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_status_absent_without_headers() {
        assert!(RateLimitStatus::from_headers("/2/tweets", &RateLimitHeaders::default()).is_none());
    }

    #[test]
    fn test_status_display_includes_reset_clock() {
        let status = RateLimitStatus {
            endpoint: "/2/tweets".to_string(),
            limit: 300,
            remaining: 0,
            reset_time: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        let text = status.to_string();
        assert!(text.contains("Endpoint: /2/tweets"));
        assert!(text.contains("Limit: 300 requests"));
        assert!(text.contains("Resets at:"));
    }
}
