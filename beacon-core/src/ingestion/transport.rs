// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport abstraction for ingestion calls.
//!
//! The dispatch engine talks to the backend exclusively through the
//! [`HttpTransport`] trait, so tests can drive it with
//! [`MockTransport`](super::MockTransport) and production code can plug in
//! the bundled reqwest transport or a platform-specific client.

use std::time::Duration;

use async_trait::async_trait;

use super::error::TransportError;

/// Response header consulted for server-directed retry delays.
pub const RETRY_AFTER_HEADER: &str = "Retry-After";

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// A single outbound ingestion call, fully assembled.
///
/// Headers already include authentication; the transport only moves bytes.
#[derive(Clone)]
pub struct IngestionRequest {
    /// Absolute URL of the ingestion endpoint.
    pub url: String,
    /// Header name/value pairs, in send order.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Vec<u8>,
}

impl IngestionRequest {
    /// Returns the value of the first header matching `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl std::fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Credential-bearing headers never reach logs in the clear.
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let redact = name.eq_ignore_ascii_case("App-Secret")
                    || name.eq_ignore_ascii_case("Authorization");
                (name.as_str(), if redact { "[REDACTED]" } else { value.as_str() })
            })
            .collect();
        f.debug_struct("IngestionRequest")
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// An HTTP response as seen by the dispatch engine.
///
/// Carries everything classification needs: the status code and the headers.
/// The body is kept for diagnostics but never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl IngestionResponse {
    /// Creates a response with the given status and no headers or body.
    pub fn with_status(status: u16) -> Self {
        IngestionResponse {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header, consuming and returning the response.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns true for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the value of the first header matching `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parses the `Retry-After` header as delta-seconds.
    ///
    /// HTTP-date values and unparseable content are ignored, falling back to
    /// computed backoff.
    pub fn retry_after(&self) -> Option<Duration> {
        self.header(RETRY_AFTER_HEADER)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }
}

/// Settings for constructing a concrete transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Value sent in the `User-Agent` header.
    pub user_agent: String,
    /// Optional proxy URL (http, https or socks5).
    pub proxy_url: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            request_timeout_ms: 60_000,
            user_agent: format!(
                "Beacon/{}",
                option_env!("CARGO_PKG_VERSION").unwrap_or("0.1.0")
            ),
            proxy_url: None,
        }
    }
}

/// Moves one assembled request to the backend and returns the response.
///
/// Implementations must be cheap to share behind an [`std::sync::Arc`]; a
/// single instance serves every concurrent send.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs the HTTP call described by `request`.
    ///
    /// Returns `Ok` whenever an HTTP response was produced, whatever its
    /// status. `Err` is reserved for failures below the HTTP layer.
    async fn send(&self, request: IngestionRequest) -> TransportResult<IngestionResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success_bounds() {
        assert!(IngestionResponse::with_status(200).is_success());
        assert!(IngestionResponse::with_status(299).is_success());
        assert!(!IngestionResponse::with_status(199).is_success());
        assert!(!IngestionResponse::with_status(300).is_success());
        assert!(!IngestionResponse::with_status(404).is_success());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = IngestionResponse::with_status(429).with_header("retry-after", "12");
        assert_eq!(response.header("Retry-After"), Some("12"));
        assert_eq!(response.header("RETRY-AFTER"), Some("12"));
        assert_eq!(response.header("X-Other"), None);
    }

    #[test]
    fn test_retry_after_parses_delta_seconds() {
        let response = IngestionResponse::with_status(429).with_header("Retry-After", "120");
        assert_eq!(response.retry_after(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_retry_after_ignores_http_dates_and_junk() {
        let dated = IngestionResponse::with_status(429)
            .with_header("Retry-After", "Wed, 21 Oct 2026 07:28:00 GMT");
        assert_eq!(dated.retry_after(), None);

        let junk = IngestionResponse::with_status(429).with_header("Retry-After", "-5");
        assert_eq!(junk.retry_after(), None);

        assert_eq!(IngestionResponse::with_status(429).retry_after(), None);
    }

    #[test]
    fn test_request_debug_redacts_credentials() {
        let request = IngestionRequest {
            url: "https://in.example.com/logs".to_string(),
            headers: vec![
                ("App-Secret".to_string(), "s3cr3t".to_string()),
                ("Authorization".to_string(), "Bearer t0k3n".to_string()),
                ("Install-ID".to_string(), "device-1".to_string()),
            ],
            body: vec![0; 16],
        };
        let debug = format!("{:?}", request);
        assert!(!debug.contains("s3cr3t"));
        assert!(!debug.contains("t0k3n"));
        assert!(debug.contains("device-1"));
        assert!(debug.contains("[REDACTED]"));
    }
}
