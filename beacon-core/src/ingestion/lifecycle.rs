// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ingestion lifecycle state.
//!
//! A single shared cell answers "may this handle accept and send right now".
//! The handle flips it synchronously before notifying the dispatch engine,
//! so a submission that observed `Disabled` is rejected without ever
//! reaching the engine.

use std::sync::atomic::{AtomicU8, Ordering};

/// Operating state of an ingestion handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    /// Accepting submissions and sending.
    Enabled = 0,
    /// Accepting submissions, holding all sends.
    Paused = 1,
    /// Rejecting submissions; in-flight work has been cancelled.
    Disabled = 2,
}

impl LifecycleState {
    fn from_u8(value: u8) -> LifecycleState {
        match value {
            1 => LifecycleState::Paused,
            2 => LifecycleState::Disabled,
            _ => LifecycleState::Enabled,
        }
    }
}

/// Lock-free lifecycle cell shared between the handle and the engine.
#[derive(Debug)]
pub struct LifecycleCell {
    state: AtomicU8,
}

impl LifecycleCell {
    /// Creates a cell in the given state.
    pub fn new(initial: LifecycleState) -> Self {
        LifecycleCell {
            state: AtomicU8::new(initial as u8),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Returns true when sends may be started.
    pub fn is_enabled(&self) -> bool {
        self.state() == LifecycleState::Enabled
    }

    /// Returns true when submissions must be rejected.
    pub fn is_disabled(&self) -> bool {
        self.state() == LifecycleState::Disabled
    }

    /// Moves `Enabled` to `Paused`. Returns true if the transition happened.
    pub fn pause(&self) -> bool {
        self.state
            .compare_exchange(
                LifecycleState::Enabled as u8,
                LifecycleState::Paused as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Moves `Paused` to `Enabled`. Returns true if the transition happened.
    pub fn resume(&self) -> bool {
        self.state
            .compare_exchange(
                LifecycleState::Paused as u8,
                LifecycleState::Enabled as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Moves any state to `Disabled`. Returns the previous state.
    pub fn disable(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.swap(LifecycleState::Disabled as u8, Ordering::SeqCst))
    }

    /// Moves any state to `Enabled`. Returns the previous state.
    pub fn enable(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.swap(LifecycleState::Enabled as u8, Ordering::SeqCst))
    }
}

impl Default for LifecycleCell {
    fn default() -> Self {
        LifecycleCell::new(LifecycleState::Enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_enabled_by_default() {
        let cell = LifecycleCell::default();
        assert_eq!(cell.state(), LifecycleState::Enabled);
        assert!(cell.is_enabled());
        assert!(!cell.is_disabled());
    }

    #[test]
    fn test_pause_resume_transitions() {
        let cell = LifecycleCell::default();
        assert!(cell.pause());
        assert_eq!(cell.state(), LifecycleState::Paused);
        // Pausing twice is a no-op.
        assert!(!cell.pause());

        assert!(cell.resume());
        assert_eq!(cell.state(), LifecycleState::Enabled);
        assert!(!cell.resume());
    }

    #[test]
    fn test_pause_does_not_leave_disabled() {
        let cell = LifecycleCell::default();
        cell.disable();
        assert!(!cell.pause());
        assert_eq!(cell.state(), LifecycleState::Disabled);
        assert!(!cell.resume());
        assert_eq!(cell.state(), LifecycleState::Disabled);
    }

    #[test]
    fn test_disable_and_enable_from_any_state() {
        let cell = LifecycleCell::default();
        assert_eq!(cell.disable(), LifecycleState::Enabled);
        assert_eq!(cell.disable(), LifecycleState::Disabled);
        assert_eq!(cell.enable(), LifecycleState::Disabled);
        assert_eq!(cell.state(), LifecycleState::Enabled);

        cell.pause();
        assert_eq!(cell.disable(), LifecycleState::Paused);
        assert_eq!(cell.state(), LifecycleState::Disabled);
    }
}
