// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Batch and delivery outcome types.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Unique identifier for a batch.
pub type BatchId = String;

/// A bundle of serialized telemetry records submitted as one transfer unit.
///
/// The payload is opaque to the ingestion core: records are serialized by an
/// external collaborator before submission, and the core only validates size.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Unique identifier, supplied by the caller or generated by the
    /// configured id supplier.
    pub batch_id: BatchId,
    /// Serialized record payload.
    pub payload: Vec<u8>,
    /// When the batch was handed to the ingestion core.
    pub enqueued_at: Instant,
}

impl Batch {
    /// Creates a new batch with the given id and payload.
    pub fn new(batch_id: impl Into<BatchId>, payload: Vec<u8>) -> Self {
        Batch {
            batch_id: batch_id.into(),
            payload,
            enqueued_at: Instant::now(),
        }
    }
}

/// Why a batch was dropped without being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The backend rejected the credentials (401/403). The batch is not
    /// retried here; an external collaborator refreshes the token and
    /// resubmits.
    Unauthorized,
    /// The backend rejected the batch itself (other 4xx).
    Rejected,
    /// Transient failures persisted through the maximum attempt count.
    RetriesExhausted,
}

/// Metadata reported alongside a successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// HTTP status of the accepting response.
    pub status: u16,
    /// Number of attempts it took to deliver the batch.
    pub attempts: u32,
}

/// Terminal outcome of a submitted batch.
///
/// Every submitted batch reaches exactly one of these, reported once through
/// the completion callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The backend accepted the batch (2xx).
    Success(ResponseMetadata),
    /// The batch was dropped for the given reason. `status` carries the last
    /// HTTP status seen, when the failure came from a response.
    PermanentFailure {
        /// Why the batch was dropped.
        kind: FailureKind,
        /// Last HTTP status observed, if any.
        status: Option<u16>,
    },
    /// Delivery was cancelled by lifecycle control before completion.
    Cancelled,
}

impl DeliveryOutcome {
    /// Returns true if the batch was delivered.
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Success(_))
    }

    /// Returns true if delivery was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DeliveryOutcome::Cancelled)
    }

    /// Returns the failure kind for a permanent failure, `None` otherwise.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            DeliveryOutcome::PermanentFailure { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
