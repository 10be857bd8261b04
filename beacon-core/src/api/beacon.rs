// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! The ingestion handle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::auth::AuthState;
use crate::batch::{Batch, BatchId};
use crate::ids::{IdSupplier, UuidSupplier};
use crate::ingestion::dispatcher::{Command, DispatchEngine, SharedState};
#[cfg(feature = "transport-reqwest")]
use crate::ingestion::ReqwestTransport;
use crate::ingestion::{
    HttpTransport, LifecycleCell, LifecycleState, MalformedBatchError, RequestBuilder,
};

use super::config::IngestionConfig;
use super::error::{BeaconError, BeaconResult, SubmitError};
use super::events::{CallbackHandler, CompletionDispatcher, CompletionHandler};

/// Handle to the ingestion core.
///
/// Created through [`Beacon::builder`]. The handle accepts batches, controls
/// the delivery lifecycle and owns the background dispatch engine; dropping
/// it cancels outstanding batches and stops the engine.
///
/// All methods take `&self`, so a handle wrapped in an [`Arc`] can be shared
/// across tasks and threads freely.
///
/// # Example
///
/// ```ignore
/// let beacon = Beacon::builder()
///     .config(IngestionConfig::default().with_base_url("https://in.example.com"))
///     .app_secret("my-app-secret")
///     .on_completion(|batch_id, outcome| {
///         println!("{batch_id}: {outcome:?}");
///     })
///     .build()?;
///
/// let batch_id = beacon.submit(payload)?;
/// ```
pub struct Beacon {
    tx: mpsc::UnboundedSender<Command>,
    auth: Arc<AuthState>,
    lifecycle: Arc<LifecycleCell>,
    request_builder: Arc<RequestBuilder>,
    ids: Arc<dyn IdSupplier>,
    in_flight: Arc<AtomicUsize>,
    install_id: String,
    shutdown_token: CancellationToken,
    engine: Option<JoinHandle<()>>,
}

impl Beacon {
    /// Returns a builder with default settings.
    pub fn builder() -> BeaconBuilder {
        BeaconBuilder::new()
    }

    /// Builds a handle from a config and an app secret, with the bundled
    /// transport and no completion handlers.
    pub fn new(config: IngestionConfig, app_secret: impl Into<String>) -> BeaconResult<Self> {
        Beacon::builder().config(config).app_secret(app_secret).build()
    }

    /// Submits a payload as a new batch with a generated id.
    ///
    /// Validation runs before this returns: an empty or oversized payload is
    /// refused here and produces no completion callback. On success the
    /// generated batch id is returned and the batch is owned by the engine
    /// until its outcome is reported.
    pub fn submit(&self, payload: Vec<u8>) -> Result<BatchId, SubmitError> {
        let batch_id = self.ids.next_id();
        self.submit_batch(Batch::new(batch_id, payload))
    }

    /// Submits a batch with a caller-chosen id.
    ///
    /// Ids must be unique among batches currently in flight; a duplicate is
    /// dropped by the engine without a second outcome for that id.
    pub fn submit_batch(&self, batch: Batch) -> Result<BatchId, SubmitError> {
        if self.lifecycle.is_disabled() {
            return Err(SubmitError::Disabled);
        }
        if batch.batch_id.is_empty() {
            return Err(MalformedBatchError::EmptyBatchId.into());
        }
        self.request_builder.validate(&batch.payload)?;

        let batch_id = batch.batch_id.clone();
        debug!("submitting batch {} ({} bytes)", batch_id, batch.payload.len());
        self.tx
            .send(Command::Submit(batch))
            .map_err(|_| SubmitError::Stopped)?;
        Ok(batch_id)
    }

    /// Holds all sends without dropping state. No-op unless `Enabled`.
    ///
    /// Queued batches and pending retries are kept and released in their
    /// original order by [`resume`](Self::resume).
    pub fn pause(&self) {
        if self.lifecycle.pause() {
            let _ = self.tx.send(Command::Pause);
        }
    }

    /// Releases batches held by [`pause`](Self::pause). No-op unless
    /// `Paused`.
    pub fn resume(&self) {
        if self.lifecycle.resume() {
            let _ = self.tx.send(Command::Resume);
        }
    }

    /// Stops accepting submissions and cancels everything in flight.
    ///
    /// Each cancelled batch reports [`DeliveryOutcome::Cancelled`] exactly
    /// once. The state flips before the engine is notified, so a submission
    /// sequenced after this call is refused synchronously.
    ///
    /// [`DeliveryOutcome::Cancelled`]: crate::batch::DeliveryOutcome::Cancelled
    pub fn disable(&self) {
        if self.lifecycle.disable() != LifecycleState::Disabled {
            let _ = self.tx.send(Command::Disable);
        }
    }

    /// Returns to `Enabled`, accepting submissions again.
    ///
    /// Batches cancelled by [`disable`](Self::disable) are not resurrected.
    pub fn enable(&self) {
        if self.lifecycle.enable() != LifecycleState::Enabled {
            let _ = self.tx.send(Command::Enable);
        }
    }

    /// Cancels every in-flight batch without changing the lifecycle state.
    /// Idempotent; cancelling an empty engine does nothing.
    pub fn cancel_all(&self) {
        let _ = self.tx.send(Command::CancelAll);
    }

    /// Replaces the bearer token used for subsequent network attempts.
    /// `None` drops back to app-secret-only authentication.
    ///
    /// Attempts already on the wire keep the credentials they were built
    /// with; the next attempt of any retrying batch picks up the new token.
    pub fn set_bearer_token(&self, token: Option<String>) {
        self.auth.set_bearer_token(token);
    }

    /// Returns a copy of the current bearer token, if any.
    pub fn bearer_token(&self) -> Option<String> {
        self.auth.bearer_token()
    }

    /// Returns the app secret this handle authenticates with.
    pub fn app_secret(&self) -> &str {
        self.auth.app_secret()
    }

    /// Returns the installation id sent with every request.
    pub fn install_id(&self) -> &str {
        &self.install_id
    }

    /// Returns the composed ingestion endpoint URL.
    pub fn endpoint_url(&self) -> &str {
        self.request_builder.endpoint_url()
    }

    /// Returns the current lifecycle state.
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Returns how many batches the engine currently owns, in any state.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Cancels outstanding batches, stops the engine and waits for it to
    /// finish. Outcomes for the cancelled batches are reported first.
    pub async fn shutdown(mut self) {
        debug!("shutting down ingestion");
        if self.tx.send(Command::Shutdown).is_err() {
            self.shutdown_token.cancel();
        }
        if let Some(engine) = self.engine.take() {
            let _ = engine.await;
        }
    }
}

impl std::fmt::Debug for Beacon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Beacon")
            .field("endpoint_url", &self.endpoint_url())
            .field("install_id", &self.install_id)
            .field("lifecycle", &self.lifecycle.state())
            .field("in_flight", &self.in_flight_count())
            .finish()
    }
}

/// Builder for [`Beacon`].
pub struct BeaconBuilder {
    config: IngestionConfig,
    app_secret: Option<String>,
    bearer_token: Option<String>,
    install_id: Option<String>,
    transport: Option<Arc<dyn HttpTransport>>,
    ids: Option<Arc<dyn IdSupplier>>,
    handlers: Vec<Arc<dyn CompletionHandler>>,
    shutdown_token: Option<CancellationToken>,
}

impl BeaconBuilder {
    /// Creates a builder with default settings and nothing configured.
    pub fn new() -> Self {
        BeaconBuilder {
            config: IngestionConfig::default(),
            app_secret: None,
            bearer_token: None,
            install_id: None,
            transport: None,
            ids: None,
            handlers: Vec::new(),
            shutdown_token: None,
        }
    }

    /// Sets the full ingestion config.
    pub fn config(mut self, config: IngestionConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the backend base URL on the current config.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Sets the app secret. Required.
    pub fn app_secret(mut self, app_secret: impl Into<String>) -> Self {
        self.app_secret = Some(app_secret.into());
        self
    }

    /// Sets an initial bearer token.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the installation id. Defaults to a generated one.
    pub fn install_id(mut self, install_id: impl Into<String>) -> Self {
        self.install_id = Some(install_id.into());
        self
    }

    /// Supplies the transport. Defaults to the bundled reqwest transport
    /// when the `transport-reqwest` feature is enabled.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Supplies the batch id source. Defaults to random UUIDs.
    pub fn id_supplier(mut self, ids: Arc<dyn IdSupplier>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Registers a completion callback.
    pub fn on_completion<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, crate::batch::DeliveryOutcome) + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(CallbackHandler::new(callback)));
        self
    }

    /// Registers a completion handler.
    pub fn completion_handler(mut self, handler: Arc<dyn CompletionHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Supplies an external shutdown token. Cancelling it cancels all
    /// in-flight batches and stops the engine, as
    /// [`Beacon::shutdown`] does.
    pub fn shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown_token = Some(token);
        self
    }

    /// Validates the settings, spawns the dispatch engine and returns the
    /// handle. Must be called from within a Tokio runtime.
    pub fn build(self) -> BeaconResult<Beacon> {
        let app_secret = match self.app_secret {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                return Err(BeaconError::Configuration(
                    "app secret must be set".to_string(),
                ))
            }
        };
        if self.config.base_url.is_empty() {
            return Err(BeaconError::Configuration(
                "base URL must be set".to_string(),
            ));
        }

        let auth = Arc::new(AuthState::new(app_secret));
        if let Some(token) = self.bearer_token {
            auth.set_bearer_token(Some(token));
        }

        let ids: Arc<dyn IdSupplier> = self.ids.unwrap_or_else(|| Arc::new(UuidSupplier));
        let install_id = self.install_id.unwrap_or_else(|| ids.next_id());
        let request_builder = Arc::new(RequestBuilder::new(
            &self.config.to_request_config(),
            install_id.clone(),
        ));

        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport(&self.config)?,
        };

        let mut completions = CompletionDispatcher::new();
        for handler in self.handlers {
            completions.register(handler);
        }

        let lifecycle = Arc::new(LifecycleCell::default());
        let in_flight = Arc::new(AtomicUsize::new(0));
        let shutdown_token = self.shutdown_token.unwrap_or_default();

        let shared = SharedState {
            auth: Arc::clone(&auth),
            lifecycle: Arc::clone(&lifecycle),
            in_flight: Arc::clone(&in_flight),
        };
        let (tx, engine) = DispatchEngine::spawn(
            transport,
            Arc::clone(&request_builder),
            shared,
            self.config.retry.to_retry_policy(),
            self.config.max_concurrent_sends,
            completions,
            shutdown_token.clone(),
        );

        Ok(Beacon {
            tx,
            auth,
            lifecycle,
            request_builder,
            ids,
            in_flight,
            install_id,
            shutdown_token,
            engine: Some(engine),
        })
    }
}

impl Default for BeaconBuilder {
    fn default() -> Self {
        BeaconBuilder::new()
    }
}

#[cfg(feature = "transport-reqwest")]
fn default_transport(config: &IngestionConfig) -> BeaconResult<Arc<dyn HttpTransport>> {
    let transport = ReqwestTransport::new(&config.to_transport_config())
        .map_err(|e| BeaconError::Configuration(e.to_string()))?;
    Ok(Arc::new(transport))
}

#[cfg(not(feature = "transport-reqwest"))]
fn default_transport(_config: &IngestionConfig) -> BeaconResult<Arc<dyn HttpTransport>> {
    Err(BeaconError::Configuration(
        "no transport available; enable the transport-reqwest feature or supply one".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::MockTransport;

    fn mock_builder() -> BeaconBuilder {
        Beacon::builder()
            .base_url("https://in.example.com")
            .app_secret("test-secret")
            .transport(Arc::new(MockTransport::new()))
    }

    #[tokio::test]
    async fn test_build_requires_app_secret() {
        let result = Beacon::builder()
            .base_url("https://in.example.com")
            .transport(Arc::new(MockTransport::new()))
            .build();
        assert!(matches!(result, Err(BeaconError::Configuration(_))));

        let result = Beacon::builder()
            .base_url("https://in.example.com")
            .app_secret("")
            .transport(Arc::new(MockTransport::new()))
            .build();
        assert!(matches!(result, Err(BeaconError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_build_requires_base_url() {
        let result = Beacon::builder()
            .app_secret("test-secret")
            .transport(Arc::new(MockTransport::new()))
            .build();
        assert!(matches!(result, Err(BeaconError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_build_defaults() {
        let beacon = mock_builder().build().unwrap();
        assert_eq!(beacon.lifecycle_state(), LifecycleState::Enabled);
        assert_eq!(beacon.app_secret(), "test-secret");
        assert_eq!(beacon.bearer_token(), None);
        assert_eq!(beacon.endpoint_url(), "https://in.example.com/logs");
        assert_eq!(beacon.in_flight_count(), 0);
        // Generated install id is a UUID.
        assert_eq!(beacon.install_id().len(), 36);
        beacon.shutdown().await;
    }

    #[tokio::test]
    async fn test_build_honors_explicit_identity() {
        let beacon = mock_builder()
            .install_id("device-1")
            .bearer_token("token-a")
            .build()
            .unwrap();
        assert_eq!(beacon.install_id(), "device-1");
        assert_eq!(beacon.bearer_token(), Some("token-a".to_string()));
        beacon.shutdown().await;
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_payloads() {
        let beacon = mock_builder().build().unwrap();

        let err = beacon.submit(Vec::new()).unwrap_err();
        assert_eq!(
            err,
            SubmitError::Malformed(MalformedBatchError::EmptyPayload)
        );

        let err = beacon
            .submit_batch(Batch::new("", vec![1]))
            .unwrap_err();
        assert_eq!(
            err,
            SubmitError::Malformed(MalformedBatchError::EmptyBatchId)
        );
        beacon.shutdown().await;
    }

    #[tokio::test]
    async fn test_submit_while_disabled_is_refused() {
        let beacon = mock_builder().build().unwrap();
        beacon.disable();
        assert_eq!(beacon.lifecycle_state(), LifecycleState::Disabled);
        assert_eq!(beacon.submit(vec![1]).unwrap_err(), SubmitError::Disabled);

        beacon.enable();
        assert_eq!(beacon.lifecycle_state(), LifecycleState::Enabled);
        assert!(beacon.submit(vec![1]).is_ok());
        beacon.shutdown().await;
    }

    #[tokio::test]
    async fn test_debug_omits_credentials() {
        let beacon = mock_builder().bearer_token("very-private").build().unwrap();
        let debug = format!("{:?}", beacon);
        assert!(!debug.contains("test-secret"));
        assert!(!debug.contains("very-private"));
        beacon.shutdown().await;
    }
}
