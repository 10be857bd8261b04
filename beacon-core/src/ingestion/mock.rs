// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock transport for tests.
//!
//! Records every request, replays scripted responses in FIFO order and
//! falls back to a configurable default status once the script runs dry.
//! Combined with Tokio's paused clock this drives the dispatch engine
//! through retry and concurrency scenarios without a network.
//!
//! # Example
//!
//! ```ignore
//! let transport = Arc::new(MockTransport::new());
//! transport.enqueue_status(503);
//! transport.enqueue_status(200);
//! // first send fails retryably, the retry succeeds
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::error::TransportError;
use super::transport::{HttpTransport, IngestionRequest, IngestionResponse, TransportResult};

/// Scripted in-memory transport.
#[derive(Debug)]
pub struct MockTransport {
    script: Mutex<VecDeque<TransportResult<IngestionResponse>>>,
    sent: Mutex<Vec<IngestionRequest>>,
    sent_at: Mutex<Vec<Instant>>,
    latency: Mutex<Option<Duration>>,
    default_status: AtomicU16,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    /// Creates a transport that answers every request with 200.
    pub fn new() -> Self {
        MockTransport {
            script: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            sent_at: Mutex::new(Vec::new()),
            latency: Mutex::new(None),
            default_status: AtomicU16::new(200),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Queues a full response for the next unanswered request.
    pub fn enqueue_response(&self, response: IngestionResponse) {
        self.script.lock().unwrap().push_back(Ok(response));
    }

    /// Queues a bare-status response.
    pub fn enqueue_status(&self, status: u16) {
        self.enqueue_response(IngestionResponse::with_status(status));
    }

    /// Queues a transport-level failure.
    pub fn enqueue_error(&self, error: TransportError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Sets the status returned once the script is exhausted.
    pub fn set_default_status(&self, status: u16) {
        self.default_status.store(status, Ordering::SeqCst);
    }

    /// Adds a fixed delay before each response. Pairs with
    /// `tokio::time::pause` to observe overlapping sends deterministically.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Returns copies of every request seen so far, in arrival order.
    pub fn sent_requests(&self) -> Vec<IngestionRequest> {
        self.sent.lock().unwrap().clone()
    }

    /// Returns the arrival instant of every request seen so far.
    pub fn sent_at(&self) -> Vec<Instant> {
        self.sent_at.lock().unwrap().clone()
    }

    /// Returns how many requests have been seen.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Forgets recorded requests without touching the script.
    pub fn clear_sent(&self) {
        self.sent.lock().unwrap().clear();
        self.sent_at.lock().unwrap().clear();
    }

    /// Returns the number of requests currently inside `send`.
    pub fn current_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Returns the highest number of concurrently outstanding requests
    /// observed so far.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_result(&self) -> TransportResult<IngestionResponse> {
        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(IngestionResponse::with_status(
                self.default_status.load(Ordering::SeqCst),
            )),
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        MockTransport::new()
    }
}

/// Decrements the in-flight counter even when the send future is dropped
/// mid-call, which is exactly what cancellation does.
struct InFlightGuard<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: IngestionRequest) -> TransportResult<IngestionResponse> {
        self.sent.lock().unwrap().push(request);
        self.sent_at.lock().unwrap().push(Instant::now());

        let concurrent = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(concurrent, Ordering::SeqCst);
        let _guard = InFlightGuard {
            counter: &self.in_flight,
        };

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        self.next_result()
    }
}
