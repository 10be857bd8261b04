// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Retry delay computation.
//!
//! Exponential backoff with a random jitter component and a hard ceiling.
//! Delays only ever grow between attempts: the jitter range is clamped to
//! the base delay at construction, so the spread added to attempt `n` can
//! never exceed the doubling that attempt `n + 1` brings.

use std::time::Duration;

use rand::Rng;

/// Computes retry delays and decides when a batch has run out of attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    base_delay_ms: u64,
    max_delay_ms: u64,
    max_attempts: u32,
    jitter_ms: u64,
}

impl RetryPolicy {
    /// Creates a policy from raw settings, normalizing degenerate values.
    ///
    /// The base delay is raised to at least 1ms, the ceiling to at least the
    /// base delay, the attempt count to at least one, and the jitter range is
    /// capped at the base delay.
    pub fn new(base_delay_ms: u64, max_delay_ms: u64, max_attempts: u32, jitter_ms: u64) -> Self {
        let base_delay_ms = base_delay_ms.max(1);
        RetryPolicy {
            base_delay_ms,
            max_delay_ms: max_delay_ms.max(base_delay_ms),
            max_attempts: max_attempts.max(1),
            jitter_ms: jitter_ms.min(base_delay_ms),
        }
    }

    /// Returns the configured base delay in milliseconds.
    pub fn base_delay_ms(&self) -> u64 {
        self.base_delay_ms
    }

    /// Returns the delay ceiling in milliseconds.
    pub fn max_delay_ms(&self) -> u64 {
        self.max_delay_ms
    }

    /// Returns the maximum number of attempts per batch.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the jitter range in milliseconds, after clamping.
    pub fn jitter_ms(&self) -> u64 {
        self.jitter_ms
    }

    /// Returns true once `attempt` has consumed the attempt budget.
    pub fn attempts_exhausted(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }

    /// Computes the delay to wait after failed attempt `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let scaled = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(exponent));
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        };
        Duration::from_millis(scaled.saturating_add(jitter).min(self.max_delay_ms))
    }

    /// Picks the delay for the next attempt, honoring a server-directed
    /// `Retry-After` value over the computed backoff.
    pub fn retry_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(delay) => delay,
            None => self.delay_for_attempt(attempt),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(10_000, 1_200_000, 5, 1_000)
    }
}
