// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Batch delivery over HTTPS.
//!
//! Everything between "a batch was submitted" and "its terminal outcome was
//! reported" lives here:
//!
//! - [`RequestBuilder`] turns batches and credentials into HTTP requests
//! - [`HttpTransport`] abstracts the HTTP client; [`ReqwestTransport`] is
//!   the bundled implementation and [`MockTransport`] the test double
//! - [`RetryPolicy`] computes capped exponential backoff with jitter
//! - [`LifecycleState`] models the enabled/paused/disabled switch
//! - the dispatch engine task coordinates sends, retries and cancellation
//!
//! The engine itself is internal; it is driven through the
//! [`Beacon`](crate::api::Beacon) handle.

mod backoff;
pub(crate) mod dispatcher;
mod error;
#[cfg(feature = "transport-reqwest")]
mod http;
mod lifecycle;
mod mock;
mod request;
mod transport;

pub use backoff::RetryPolicy;
pub use error::{MalformedBatchError, TransportError};
#[cfg(feature = "transport-reqwest")]
pub use http::ReqwestTransport;
pub use lifecycle::LifecycleState;
pub(crate) use lifecycle::LifecycleCell;
pub use mock::MockTransport;
pub use request::{
    RequestBuilder, RequestConfig, APP_SECRET_HEADER, AUTHORIZATION_HEADER, BEARER_PREFIX,
    CONTENT_TYPE_HEADER, DEFAULT_CONTENT_TYPE, DEFAULT_INGESTION_PATH, DEFAULT_MAX_PAYLOAD_BYTES,
    INSTALL_ID_HEADER,
};
pub use transport::{
    HttpTransport, IngestionRequest, IngestionResponse, TransportConfig, TransportResult,
    RETRY_AFTER_HEADER,
};
