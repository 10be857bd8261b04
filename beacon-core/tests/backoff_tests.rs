// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Retry policy integration tests.
//!
//! Covers the jitter spread and the ordering properties the dispatch engine
//! relies on when parking batches on timers.

use std::collections::HashSet;
use std::time::Duration;

use proptest::prelude::*;

use beacon_core::RetryPolicy;

// === Jitter ===

#[test]
fn test_jitter_stays_within_configured_range() {
    let policy = RetryPolicy::new(10_000, 1_200_000, 5, 1_000);
    let mut distinct = HashSet::new();
    for _ in 0..50 {
        let delay = policy.delay_for_attempt(1);
        assert!(delay >= Duration::from_millis(10_000));
        assert!(delay <= Duration::from_millis(11_000));
        distinct.insert(delay);
    }
    // 50 draws over a 1001-value range collapse to one value only when the
    // jitter component is broken.
    assert!(distinct.len() > 1);
}

#[test]
fn test_zero_jitter_is_deterministic() {
    let policy = RetryPolicy::new(10_000, 1_200_000, 5, 0);
    for _ in 0..10 {
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(20));
    }
}

// === Server-directed delays ===

#[test]
fn test_retry_after_beyond_ceiling_is_honored() {
    // The ceiling caps computed backoff, not what the server asked for.
    let policy = RetryPolicy::new(10_000, 60_000, 5, 0);
    assert_eq!(
        policy.retry_delay(1, Some(Duration::from_secs(2_000))),
        Duration::from_secs(2_000)
    );
}

#[test]
fn test_retry_after_shorter_than_backoff_is_honored() {
    let policy = RetryPolicy::new(10_000, 1_200_000, 5, 0);
    // Attempt 3 would back off 40s on its own.
    assert_eq!(
        policy.retry_delay(3, Some(Duration::from_secs(1))),
        Duration::from_secs(1)
    );
}

// === Defaults ===

#[test]
fn test_default_policy_settings() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.base_delay_ms(), 10_000);
    assert_eq!(policy.max_delay_ms(), 1_200_000);
    assert_eq!(policy.max_attempts(), 5);
    assert_eq!(policy.jitter_ms(), 1_000);
}

// === Ordering properties ===

proptest! {
    /// Delays never exceed the ceiling, never undercut the base delay, and
    /// never shrink from one attempt to the next, whatever the settings.
    #[test]
    fn prop_delays_monotonic_and_capped(
        base in 1u64..60_000,
        max in 1u64..3_600_000,
        jitter in 0u64..120_000,
        attempts in 1u32..=30,
    ) {
        let policy = RetryPolicy::new(base, max, 5, jitter);
        let ceiling = Duration::from_millis(policy.max_delay_ms());
        let floor = Duration::from_millis(policy.base_delay_ms());

        let mut previous = Duration::ZERO;
        for attempt in 1..=attempts {
            let delay = policy.delay_for_attempt(attempt);
            prop_assert!(delay <= ceiling);
            prop_assert!(delay >= floor);
            prop_assert!(delay >= previous);
            previous = delay;
        }
    }

    /// The attempt budget splits attempts cleanly: everything below the
    /// budget may retry, everything at or past it may not.
    #[test]
    fn prop_exhaustion_boundary(budget in 1u32..=10, attempt in 1u32..=20) {
        let policy = RetryPolicy::new(1_000, 60_000, budget, 0);
        prop_assert_eq!(policy.attempts_exhausted(attempt), attempt >= budget);
    }
}
