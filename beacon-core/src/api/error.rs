// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Public API error types.

use thiserror::Error;

use crate::ingestion::MalformedBatchError;

/// Why a submission was refused at the handle.
///
/// Submission errors are synchronous: a batch that was refused never
/// produces a completion callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The batch failed validation.
    #[error("Batch validation failed: {0}")]
    Malformed(#[from] MalformedBatchError),
    /// Ingestion is disabled; enable the handle before submitting.
    #[error("Ingestion is disabled")]
    Disabled,
    /// The dispatch engine is no longer running.
    #[error("Ingestion has shut down")]
    Stopped,
}

/// Top-level error for handle construction and operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeaconError {
    /// The handle could not be built from the given settings.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A submission was refused.
    #[error("Submit failed: {0}")]
    Submit(#[from] SubmitError),
}

/// Result alias for API operations.
pub type BeaconResult<T> = Result<T, BeaconError>;
