// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reqwest-backed transport.
//!
//! Default production transport, enabled through the `transport-reqwest`
//! feature. Hosts that must route traffic through a platform HTTP stack
//! implement [`HttpTransport`] themselves instead.

use std::time::Duration;

use async_trait::async_trait;

use super::error::TransportError;
use super::transport::{
    HttpTransport, IngestionRequest, IngestionResponse, TransportConfig, TransportResult,
};

/// [`HttpTransport`] implementation on top of a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client with the configured timeout, user agent and proxy.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.clone());

        if let Some(ref proxy_url) = config.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| TransportError::Connection(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Io(format!("Failed to build HTTP client: {}", e)))?;

        Ok(ReqwestTransport { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: IngestionRequest) -> TransportResult<IngestionResponse> {
        let mut call = self.client.post(&request.url);
        for (name, value) in &request.headers {
            call = call.header(name.as_str(), value.as_str());
        }

        let response = call
            .body(request.body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

        Ok(IngestionResponse {
            status,
            headers,
            body,
        })
    }
}

/// Sorts reqwest failures into the transport error taxonomy.
fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connection(error.to_string())
    } else {
        TransportError::Io(error.to_string())
    }
}
