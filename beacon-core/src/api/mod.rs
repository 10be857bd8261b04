// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Public API surface.
//!
//! [`Beacon`] is the entry point: build one per backend, submit batches,
//! steer the lifecycle. Outcomes arrive through [`CompletionHandler`]s
//! registered at build time.
//!
//! # Example
//!
//! ```ignore
//! use beacon_core::{Beacon, IngestionConfig};
//!
//! let config = IngestionConfig::default().with_base_url("https://in.example.com");
//! let beacon = Beacon::builder()
//!     .config(config)
//!     .app_secret("my-app-secret")
//!     .on_completion(|batch_id, outcome| println!("{batch_id}: {outcome:?}"))
//!     .build()?;
//!
//! beacon.submit(b"[{\"type\":\"event\"}]".to_vec())?;
//! ```

mod beacon;
mod config;
mod error;
mod events;

pub use beacon::{Beacon, BeaconBuilder};
pub use config::{IngestionConfig, RetryConfig};
pub use error::{BeaconError, BeaconResult, SubmitError};
pub use events::{CallbackHandler, ChannelHandler, CompletionDispatcher, CompletionHandler};
