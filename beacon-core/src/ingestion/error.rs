// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ingestion error types.

use thiserror::Error;

/// Failures raised by a transport before any HTTP status was produced.
///
/// Every transport failure is treated as transient and retried; responses
/// that did arrive are classified by status instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,
    /// The connection could not be established.
    #[error("Connection failed: {0}")]
    Connection(String),
    /// The request failed after the connection was established.
    #[error("Transport error: {0}")]
    Io(String),
}

/// Validation failures detected before a batch is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedBatchError {
    /// The batch id is empty.
    #[error("Batch id is empty")]
    EmptyBatchId,
    /// The payload contains no bytes.
    #[error("Batch payload is empty")]
    EmptyPayload,
    /// The payload exceeds the configured size limit.
    #[error("Batch payload is {size} bytes, exceeds limit of {max} bytes")]
    PayloadTooLarge {
        /// Actual payload size in bytes.
        size: usize,
        /// Configured limit in bytes.
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        assert_eq!(TransportError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            TransportError::Connection("refused".to_string()).to_string(),
            "Connection failed: refused"
        );
    }

    #[test]
    fn test_malformed_batch_error_display() {
        let err = MalformedBatchError::PayloadTooLarge {
            size: 3_000_000,
            max: 2_097_152,
        };
        assert_eq!(
            err.to_string(),
            "Batch payload is 3000000 bytes, exceeds limit of 2097152 bytes"
        );
    }
}
