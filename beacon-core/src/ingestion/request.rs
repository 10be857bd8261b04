// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Request construction for ingestion calls.
//!
//! Turns a batch plus an authentication snapshot into a fully-addressed
//! [`IngestionRequest`]. Construction is deterministic; credentials are the
//! only part that varies between attempts for the same batch.

use crate::auth::AuthSnapshot;
use crate::batch::Batch;

use super::error::MalformedBatchError;
use super::transport::IngestionRequest;

/// Header carrying the application secret.
pub const APP_SECRET_HEADER: &str = "App-Secret";
/// Header carrying the device installation id.
pub const INSTALL_ID_HEADER: &str = "Install-ID";
/// Standard authorization header, populated with a bearer token.
pub const AUTHORIZATION_HEADER: &str = "Authorization";
/// Standard content type header.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
/// Value prefix for bearer tokens in the authorization header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Default URL path of the batch ingestion endpoint.
pub const DEFAULT_INGESTION_PATH: &str = "/logs";
/// Default content type for batch payloads.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
/// Default maximum payload size: 2 MiB.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Addressing and validation settings for request construction.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Base URL of the ingestion backend, e.g. `https://in.example.com`.
    pub base_url: String,
    /// Path appended to the base URL.
    pub ingestion_path: String,
    /// Content type declared for the payload.
    pub content_type: String,
    /// Maximum accepted payload size in bytes.
    pub max_payload_bytes: usize,
}

impl Default for RequestConfig {
    fn default() -> Self {
        RequestConfig {
            base_url: String::new(),
            ingestion_path: DEFAULT_INGESTION_PATH.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

/// Builds ingestion requests for a fixed endpoint and installation.
///
/// One builder serves every batch of a handle; per-attempt state comes in
/// through the [`AuthSnapshot`] argument.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    endpoint_url: String,
    content_type: String,
    install_id: String,
    max_payload_bytes: usize,
}

impl RequestBuilder {
    /// Creates a builder for the given endpoint and installation id.
    ///
    /// The endpoint URL is composed once: trailing slashes on the base URL
    /// and a missing leading slash on the path are both tolerated.
    pub fn new(config: &RequestConfig, install_id: impl Into<String>) -> Self {
        let base = config.base_url.trim_end_matches('/');
        let endpoint_url = if config.ingestion_path.starts_with('/') {
            format!("{}{}", base, config.ingestion_path)
        } else {
            format!("{}/{}", base, config.ingestion_path)
        };
        RequestBuilder {
            endpoint_url,
            content_type: config.content_type.clone(),
            install_id: install_id.into(),
            max_payload_bytes: config.max_payload_bytes,
        }
    }

    /// Returns the composed endpoint URL.
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Returns the maximum accepted payload size in bytes.
    pub fn max_payload_bytes(&self) -> usize {
        self.max_payload_bytes
    }

    /// Checks a payload against the size limits.
    ///
    /// Runs synchronously on submission so oversized and empty batches are
    /// rejected before they consume queue space.
    pub fn validate(&self, payload: &[u8]) -> Result<(), MalformedBatchError> {
        if payload.is_empty() {
            return Err(MalformedBatchError::EmptyPayload);
        }
        if payload.len() > self.max_payload_bytes {
            return Err(MalformedBatchError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload_bytes,
            });
        }
        Ok(())
    }

    /// Assembles the request for one network attempt.
    ///
    /// The authorization header is present exactly when the snapshot carries
    /// a bearer token.
    pub fn build(
        &self,
        batch: &Batch,
        auth: &AuthSnapshot,
    ) -> Result<IngestionRequest, MalformedBatchError> {
        self.validate(&batch.payload)?;

        let mut headers = vec![
            (CONTENT_TYPE_HEADER.to_string(), self.content_type.clone()),
            (APP_SECRET_HEADER.to_string(), auth.app_secret.clone()),
            (INSTALL_ID_HEADER.to_string(), self.install_id.clone()),
        ];
        if let Some(ref token) = auth.bearer_token {
            headers.push((
                AUTHORIZATION_HEADER.to_string(),
                format!("{}{}", BEARER_PREFIX, token),
            ));
        }

        Ok(IngestionRequest {
            url: self.endpoint_url.clone(),
            headers,
            body: batch.payload.clone(),
        })
    }
}
