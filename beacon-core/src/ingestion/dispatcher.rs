// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Dispatch engine.
//!
//! A single task owns every in-flight batch and multiplexes three event
//! sources: commands from the handle, expiring retry timers and completing
//! network sends. All delivery state lives inside the task, so retries,
//! cancellation and the concurrency ceiling never need a lock.
//!
//! Each batch moves through a small state machine: `Queued` waiting for a
//! send slot, `Sending` with exactly one network call outstanding, and
//! `AwaitingRetry` parked on a timer. Terminal outcomes remove the batch
//! and report it through the completion dispatcher exactly once.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::time::DelayQueue;
use tracing::{debug, trace, warn};

use crate::api::CompletionDispatcher;
use crate::auth::AuthState;
use crate::batch::{Batch, BatchId, DeliveryOutcome, FailureKind, ResponseMetadata};

use super::backoff::RetryPolicy;
use super::lifecycle::LifecycleCell;
use super::request::RequestBuilder;
use super::transport::{HttpTransport, IngestionResponse, TransportResult};

/// Control messages from the handle to the engine.
#[derive(Debug)]
pub(crate) enum Command {
    /// Take ownership of a batch and deliver it.
    Submit(Batch),
    /// Lifecycle moved to `Paused`; hold new sends.
    Pause,
    /// Lifecycle moved back to `Enabled`; release held batches.
    Resume,
    /// Lifecycle moved to `Enabled` from `Disabled`.
    Enable,
    /// Lifecycle moved to `Disabled`; cancel everything in flight.
    Disable,
    /// Cancel everything in flight without a lifecycle change.
    CancelAll,
    /// Cancel everything in flight and stop the engine.
    Shutdown,
}

/// State shared between the handle and the engine.
#[derive(Clone)]
pub(crate) struct SharedState {
    pub(crate) auth: Arc<AuthState>,
    pub(crate) lifecycle: Arc<LifecycleCell>,
    pub(crate) in_flight: Arc<AtomicUsize>,
}

/// Where a tracked batch currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    /// Waiting for a send slot.
    Queued,
    /// One network call outstanding.
    Sending,
    /// Parked on a retry timer.
    AwaitingRetry,
}

/// A batch the engine owns, with its delivery bookkeeping.
struct InFlightCall {
    batch: Batch,
    /// Attempts started so far, counting the one in progress.
    attempt_count: u32,
    state: CallState,
}

impl InFlightCall {
    fn new(batch: Batch) -> Self {
        InFlightCall {
            batch,
            attempt_count: 1,
            state: CallState::Queued,
        }
    }
}

/// What a response status means for the batch that earned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    /// Accepted; report success.
    Delivered,
    /// Transient; schedule another attempt.
    Retry,
    /// Final rejection; report failure and drop.
    Drop(FailureKind),
}

/// Maps an HTTP status onto the delivery state machine.
fn classify_status(status: u16) -> Disposition {
    match status {
        200..=299 => Disposition::Delivered,
        401 | 403 => Disposition::Drop(FailureKind::Unauthorized),
        429 => Disposition::Retry,
        500..=599 => Disposition::Retry,
        // Remaining 4xx reject the batch itself. Informational and
        // redirect statuses are not retryable either; the endpoint is
        // fixed, so they count as rejections too.
        _ => Disposition::Drop(FailureKind::Rejected),
    }
}

type SendOutcome = (BatchId, TransportResult<IngestionResponse>);
type SendFuture = BoxFuture<'static, SendOutcome>;

/// The engine task. Created and spawned through [`DispatchEngine::spawn`].
pub(crate) struct DispatchEngine {
    rx: mpsc::UnboundedReceiver<Command>,
    transport: Arc<dyn HttpTransport>,
    builder: Arc<RequestBuilder>,
    shared: SharedState,
    policy: RetryPolicy,
    max_concurrent_sends: usize,
    completions: CompletionDispatcher,
    shutdown: CancellationToken,
    calls: HashMap<BatchId, InFlightCall>,
    ready: VecDeque<BatchId>,
    retry_timers: DelayQueue<BatchId>,
    sends: FuturesUnordered<SendFuture>,
}

impl DispatchEngine {
    /// Spawns the engine onto the current runtime and returns the command
    /// channel plus the task handle.
    pub(crate) fn spawn(
        transport: Arc<dyn HttpTransport>,
        builder: Arc<RequestBuilder>,
        shared: SharedState,
        policy: RetryPolicy,
        max_concurrent_sends: usize,
        completions: CompletionDispatcher,
        shutdown: CancellationToken,
    ) -> (mpsc::UnboundedSender<Command>, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = DispatchEngine {
            rx,
            transport,
            builder,
            shared,
            policy,
            max_concurrent_sends: max_concurrent_sends.max(1),
            completions,
            shutdown,
            calls: HashMap::new(),
            ready: VecDeque::new(),
            retry_timers: DelayQueue::new(),
            sends: FuturesUnordered::new(),
        };
        let handle = tokio::spawn(engine.run());
        (tx, handle)
    }

    async fn run(mut self) {
        debug!("dispatch engine started for {}", self.builder.endpoint_url());
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    self.cancel_all_calls();
                    break;
                }
                command = self.rx.recv() => {
                    match command {
                        Some(command) => {
                            if !self.handle_command(command) {
                                break;
                            }
                        }
                        None => {
                            // Every handle is gone; nothing more can arrive.
                            self.cancel_all_calls();
                            break;
                        }
                    }
                }
                expired = self.retry_timers.next(), if !self.retry_timers.is_empty() => {
                    if let Some(expired) = expired {
                        self.on_retry_due(expired.into_inner());
                    }
                }
                completed = self.sends.next(), if !self.sends.is_empty() => {
                    if let Some((batch_id, result)) = completed {
                        self.on_send_complete(batch_id, result);
                    }
                }
            }
            self.pump();
        }
        debug!("dispatch engine stopped");
    }

    /// Applies one command. Returns false when the engine should stop.
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Submit(batch) => {
                self.accept(batch);
                true
            }
            Command::Pause => {
                debug!("ingestion paused");
                true
            }
            Command::Resume => {
                debug!("ingestion resumed");
                true
            }
            Command::Enable => {
                debug!("ingestion enabled");
                true
            }
            Command::Disable => {
                debug!("ingestion disabled, cancelling in-flight batches");
                self.cancel_all_calls();
                true
            }
            Command::CancelAll => {
                self.cancel_all_calls();
                true
            }
            Command::Shutdown => {
                self.cancel_all_calls();
                false
            }
        }
    }

    /// Takes ownership of a freshly submitted batch.
    fn accept(&mut self, batch: Batch) {
        if self.shared.lifecycle.is_disabled() {
            // The submitter saw Enabled but disable won the race. The
            // exactly-once contract still owes a terminal outcome.
            self.completions
                .dispatch(&batch.batch_id, DeliveryOutcome::Cancelled);
            return;
        }
        if self.calls.contains_key(&batch.batch_id) {
            warn!(
                "batch {} is already in flight, dropping duplicate submission",
                batch.batch_id
            );
            return;
        }
        trace!("batch {} queued ({} bytes)", batch.batch_id, batch.payload.len());
        let batch_id = batch.batch_id.clone();
        self.calls.insert(batch_id.clone(), InFlightCall::new(batch));
        self.ready.push_back(batch_id);
        self.update_gauge();
    }

    /// Starts queued sends until the concurrency ceiling is reached.
    ///
    /// Gated on the lifecycle state: while `Paused` or `Disabled`, queued
    /// batches stay queued.
    fn pump(&mut self) {
        if !self.shared.lifecycle.is_enabled() {
            return;
        }
        while self.sends.len() < self.max_concurrent_sends {
            let Some(batch_id) = self.ready.pop_front() else {
                break;
            };
            self.start_send(batch_id);
        }
    }

    /// Moves one batch from `Queued` to `Sending`.
    fn start_send(&mut self, batch_id: BatchId) {
        let snapshot = self.shared.auth.snapshot();
        let built = match self.calls.get_mut(&batch_id) {
            Some(call) if call.state == CallState::Queued => {
                match self.builder.build(&call.batch, &snapshot) {
                    Ok(request) => {
                        call.state = CallState::Sending;
                        Some((request, call.attempt_count))
                    }
                    Err(err) => {
                        warn!("batch {} failed validation at send time: {}", batch_id, err);
                        None
                    }
                }
            }
            _ => return,
        };

        let Some((request, attempt)) = built else {
            // Validation also ran at submission, so this only fires when the
            // limits changed between queueing and sending.
            self.finish(
                &batch_id,
                DeliveryOutcome::PermanentFailure {
                    kind: FailureKind::Rejected,
                    status: None,
                },
            );
            return;
        };

        debug!(
            "sending batch {} (attempt {} of {})",
            batch_id,
            attempt,
            self.policy.max_attempts()
        );
        let transport = Arc::clone(&self.transport);
        self.sends.push(
            async move {
                let result = transport.send(request).await;
                (batch_id, result)
            }
            .boxed(),
        );
    }

    /// Classifies a finished network attempt and advances the batch.
    fn on_send_complete(&mut self, batch_id: BatchId, result: TransportResult<IngestionResponse>) {
        let attempt = match self.calls.get(&batch_id) {
            Some(call) if call.state == CallState::Sending => call.attempt_count,
            // Completion raced with cancellation; the outcome was already
            // reported as Cancelled.
            _ => return,
        };

        match result {
            Ok(response) => {
                let status = response.status;
                match classify_status(status) {
                    Disposition::Delivered => {
                        debug!(
                            "batch {} delivered with status {} after {} attempt(s)",
                            batch_id, status, attempt
                        );
                        self.finish(
                            &batch_id,
                            DeliveryOutcome::Success(ResponseMetadata {
                                status,
                                attempts: attempt,
                            }),
                        );
                    }
                    Disposition::Drop(kind) => {
                        warn!(
                            "batch {} rejected with status {} ({:?})",
                            batch_id, status, kind
                        );
                        self.finish(
                            &batch_id,
                            DeliveryOutcome::PermanentFailure {
                                kind,
                                status: Some(status),
                            },
                        );
                    }
                    Disposition::Retry => {
                        self.schedule_retry(batch_id, Some(status), response.retry_after());
                    }
                }
            }
            Err(err) => {
                debug!("batch {} attempt {} transport failure: {}", batch_id, attempt, err);
                self.schedule_retry(batch_id, None, None);
            }
        }
    }

    /// Parks a batch on a retry timer, or gives up when the attempt budget
    /// is spent.
    fn schedule_retry(&mut self, batch_id: BatchId, status: Option<u16>, retry_after: Option<Duration>) {
        let attempt = match self.calls.get(&batch_id) {
            Some(call) => call.attempt_count,
            None => return,
        };

        if self.policy.attempts_exhausted(attempt) {
            warn!("batch {} exhausted {} attempts, giving up", batch_id, attempt);
            self.finish(
                &batch_id,
                DeliveryOutcome::PermanentFailure {
                    kind: FailureKind::RetriesExhausted,
                    status,
                },
            );
            return;
        }

        let delay = self.policy.retry_delay(attempt, retry_after);
        if let Some(call) = self.calls.get_mut(&batch_id) {
            call.state = CallState::AwaitingRetry;
        }
        match status {
            Some(status) => warn!(
                "batch {} attempt {} failed with status {}, retrying in {:?}",
                batch_id, attempt, status, delay
            ),
            None => warn!(
                "batch {} attempt {} failed at transport level, retrying in {:?}",
                batch_id, attempt, delay
            ),
        }
        self.retry_timers.insert(batch_id, delay);
    }

    /// Moves a batch whose retry timer expired back to the ready queue.
    fn on_retry_due(&mut self, batch_id: BatchId) {
        let Some(call) = self.calls.get_mut(&batch_id) else {
            return;
        };
        if call.state != CallState::AwaitingRetry {
            return;
        }
        call.state = CallState::Queued;
        call.attempt_count += 1;
        trace!("batch {} retry due (attempt {})", batch_id, call.attempt_count);
        // Retries queue behind earlier submissions still waiting for a slot.
        self.ready.push_back(batch_id);
    }

    /// Reports a terminal outcome and forgets the batch.
    fn finish(&mut self, batch_id: &str, outcome: DeliveryOutcome) {
        if self.calls.remove(batch_id).is_some() {
            self.completions.dispatch(batch_id, outcome);
            self.update_gauge();
        }
    }

    /// Cancels every tracked batch and reports `Cancelled` for each.
    ///
    /// Dropping the send futures aborts their network calls; a response that
    /// already arrived but was not yet drained loses to the cancellation.
    fn cancel_all_calls(&mut self) {
        if self.calls.is_empty() {
            return;
        }
        self.sends.clear();
        self.retry_timers.clear();
        self.ready.clear();
        let cancelled: Vec<BatchId> = self.calls.drain().map(|(batch_id, _)| batch_id).collect();
        debug!("cancelled {} in-flight batch(es)", cancelled.len());
        for batch_id in &cancelled {
            self.completions.dispatch(batch_id, DeliveryOutcome::Cancelled);
        }
        self.update_gauge();
    }

    fn update_gauge(&self) {
        self.shared.in_flight.store(self.calls.len(), Ordering::Relaxed);
    }
}
