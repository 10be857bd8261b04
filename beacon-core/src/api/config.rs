// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ingestion configuration.
//!
//! One value configures a handle end to end. The sub-structures the
//! internals consume are derived from it through the `to_*` converters, so
//! callers never assemble those by hand.

use crate::ingestion::{
    RequestConfig, RetryPolicy, TransportConfig, DEFAULT_CONTENT_TYPE, DEFAULT_INGESTION_PATH,
    DEFAULT_MAX_PAYLOAD_BYTES,
};

/// Retry and backoff settings.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// First retry delay in milliseconds.
    pub base_delay_ms: u64,
    /// Ceiling for any computed delay in milliseconds.
    pub max_delay_ms: u64,
    /// Attempts per batch before giving up, counting the first send.
    pub max_attempts: u32,
    /// Upper bound of the random jitter added to each delay, in
    /// milliseconds. Clamped to the base delay so delays stay monotonic.
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            base_delay_ms: 10_000,     // 10 seconds
            max_delay_ms: 1_200_000,   // 20 minutes
            max_attempts: 5,
            jitter_ms: 1_000,
        }
    }
}

impl RetryConfig {
    /// Builds the normalized policy the dispatch engine uses.
    pub fn to_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.base_delay_ms,
            self.max_delay_ms,
            self.max_attempts,
            self.jitter_ms,
        )
    }
}

/// Complete settings for an ingestion handle.
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Base URL of the ingestion backend, e.g. `https://in.example.com`.
    pub base_url: String,
    /// Path of the batch endpoint, appended to the base URL.
    pub ingestion_path: String,
    /// Content type declared for batch payloads.
    pub content_type: String,
    /// Maximum accepted payload size in bytes.
    pub max_payload_bytes: usize,
    /// Ceiling on concurrently outstanding network calls.
    pub max_concurrent_sends: usize,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Optional proxy URL for the bundled transport.
    pub proxy_url: Option<String>,
    /// Retry and backoff settings.
    pub retry: RetryConfig,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        IngestionConfig {
            base_url: String::new(),
            ingestion_path: DEFAULT_INGESTION_PATH.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            max_concurrent_sends: 4,
            request_timeout_ms: 60_000,
            proxy_url: None,
            retry: RetryConfig::default(),
        }
    }
}

impl IngestionConfig {
    /// Sets the backend base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the concurrency ceiling.
    pub fn with_max_concurrent_sends(mut self, max_concurrent_sends: usize) -> Self {
        self.max_concurrent_sends = max_concurrent_sends;
        self
    }

    /// Sets the payload size limit.
    pub fn with_max_payload_bytes(mut self, max_payload_bytes: usize) -> Self {
        self.max_payload_bytes = max_payload_bytes;
        self
    }

    /// Sets the retry and backoff settings.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Extracts the request construction settings.
    pub fn to_request_config(&self) -> RequestConfig {
        RequestConfig {
            base_url: self.base_url.clone(),
            ingestion_path: self.ingestion_path.clone(),
            content_type: self.content_type.clone(),
            max_payload_bytes: self.max_payload_bytes,
        }
    }

    /// Extracts the transport settings.
    pub fn to_transport_config(&self) -> TransportConfig {
        TransportConfig {
            request_timeout_ms: self.request_timeout_ms,
            proxy_url: self.proxy_url.clone(),
            ..TransportConfig::default()
        }
    }
}
