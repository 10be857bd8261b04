// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Beacon Core Library
//!
//! Network-ingestion core of the Beacon telemetry SDK. Batches of
//! serialized records are delivered to a collection backend over HTTPS
//! with retry, backoff and bounded concurrency; delivery can be paused,
//! resumed or disabled at any time, and every batch reports exactly one
//! terminal outcome.
//!
//! Record serialization, persistence and token refresh live in other
//! layers of the SDK; this crate starts where a finished payload is
//! handed over and ends where its outcome is known.

pub mod api;
pub mod auth;
pub mod batch;
pub mod ids;
pub mod ingestion;

pub use api::{
    Beacon, BeaconBuilder, BeaconError, BeaconResult, CallbackHandler, ChannelHandler,
    CompletionDispatcher, CompletionHandler, IngestionConfig, RetryConfig, SubmitError,
};
pub use auth::{AuthSnapshot, AuthState};
pub use batch::{Batch, BatchId, DeliveryOutcome, FailureKind, ResponseMetadata};
pub use ids::{IdSupplier, UuidSupplier};
#[cfg(feature = "transport-reqwest")]
pub use ingestion::ReqwestTransport;
pub use ingestion::{
    HttpTransport, IngestionRequest, IngestionResponse, LifecycleState, MalformedBatchError,
    MockTransport, RequestBuilder, RequestConfig, RetryPolicy, TransportConfig, TransportError,
    TransportResult,
};
