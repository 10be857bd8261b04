// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Completion notification.
//!
//! Every submitted batch reports exactly one [`DeliveryOutcome`] through the
//! handlers registered at build time. Handlers run on the dispatch engine
//! task and should hand heavy work off instead of blocking it.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::batch::{BatchId, DeliveryOutcome};

/// Receives the terminal outcome of submitted batches.
pub trait CompletionHandler: Send + Sync {
    /// Called once per batch when its outcome is final.
    fn on_completion(&self, batch_id: &str, outcome: DeliveryOutcome);
}

/// Wraps a closure as a [`CompletionHandler`].
pub struct CallbackHandler<F>
where
    F: Fn(&str, DeliveryOutcome) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(&str, DeliveryOutcome) + Send + Sync,
{
    /// Creates a handler from a closure.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> CompletionHandler for CallbackHandler<F>
where
    F: Fn(&str, DeliveryOutcome) + Send + Sync,
{
    fn on_completion(&self, batch_id: &str, outcome: DeliveryOutcome) {
        (self.callback)(batch_id, outcome);
    }
}

/// Forwards outcomes into a channel. Built for tests that await outcomes.
pub struct ChannelHandler {
    tx: mpsc::UnboundedSender<(BatchId, DeliveryOutcome)>,
}

impl ChannelHandler {
    /// Creates the handler and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(BatchId, DeliveryOutcome)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelHandler { tx }, rx)
    }
}

impl CompletionHandler for ChannelHandler {
    fn on_completion(&self, batch_id: &str, outcome: DeliveryOutcome) {
        let _ = self.tx.send((batch_id.to_string(), outcome));
    }
}

/// Fans one outcome out to every registered handler.
pub struct CompletionDispatcher {
    handlers: Vec<Arc<dyn CompletionHandler>>,
}

impl CompletionDispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        CompletionDispatcher {
            handlers: Vec::new(),
        }
    }

    /// Adds a handler. Handlers are invoked in registration order.
    pub fn register(&mut self, handler: Arc<dyn CompletionHandler>) {
        self.handlers.push(handler);
    }

    /// Returns how many handlers are registered.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Delivers one outcome to every handler.
    pub fn dispatch(&self, batch_id: &str, outcome: DeliveryOutcome) {
        for handler in &self.handlers {
            handler.on_completion(batch_id, outcome.clone());
        }
    }
}

impl Default for CompletionDispatcher {
    fn default() -> Self {
        CompletionDispatcher::new()
    }
}
