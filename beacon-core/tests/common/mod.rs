// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared helpers for ingestion integration tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use beacon_core::{
    Beacon, BatchId, ChannelHandler, DeliveryOutcome, IngestionConfig, MockTransport, RetryConfig,
};

/// Outcome stream fed by the channel completion handler.
pub type Outcomes = UnboundedReceiver<(BatchId, DeliveryOutcome)>;

/// Config pointing at a test endpoint, with jitter disabled so expected
/// retry delays are exact under the paused clock.
pub fn test_config() -> IngestionConfig {
    IngestionConfig::default()
        .with_base_url("https://in.beacon.test")
        .with_retry(RetryConfig {
            base_delay_ms: 10_000,
            max_delay_ms: 1_200_000,
            max_attempts: 5,
            jitter_ms: 0,
        })
}

/// Builds a handle over the given mock transport, wired to a channel
/// completion handler.
pub fn build_beacon(transport: Arc<MockTransport>, config: IngestionConfig) -> (Beacon, Outcomes) {
    let (handler, outcomes) = ChannelHandler::new();
    let beacon = Beacon::builder()
        .config(config)
        .app_secret("test-secret")
        .install_id("test-install")
        .transport(transport)
        .completion_handler(Arc::new(handler))
        .build()
        .expect("failed to build test beacon");
    (beacon, outcomes)
}

/// Yields until the engine has drained everything runnable right now.
/// Advances the paused clock by one millisecond.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
