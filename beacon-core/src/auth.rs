// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Authentication state for outbound ingestion calls.
//!
//! Holds the immutable app secret and an optional bearer token that an
//! external auth collaborator can replace at any time. The dispatch engine
//! takes a [`AuthSnapshot`] at the moment each network attempt is
//! constructed, so a token refreshed between retries is picked up by the
//! next attempt automatically.

use std::sync::RwLock;

use zeroize::Zeroize;

/// Shared, mutable authentication state.
///
/// The app secret identifies the application for the lifetime of the handle.
/// The bearer token authenticates an end user and may be absent, replaced, or
/// cleared while batches are in flight.
pub struct AuthState {
    app_secret: String,
    bearer_token: RwLock<Option<String>>,
}

impl AuthState {
    /// Creates authentication state with no bearer token.
    pub fn new(app_secret: impl Into<String>) -> Self {
        AuthState {
            app_secret: app_secret.into(),
            bearer_token: RwLock::new(None),
        }
    }

    /// Returns the app secret.
    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }

    /// Returns a copy of the current bearer token, if one is set.
    pub fn bearer_token(&self) -> Option<String> {
        self.bearer_token
            .read()
            .expect("auth token lock poisoned")
            .clone()
    }

    /// Replaces the bearer token. `None` clears it, dropping requests back
    /// to app-secret-only authentication.
    ///
    /// The previous token is wiped before it is released.
    pub fn set_bearer_token(&self, token: Option<String>) {
        let mut guard = self.bearer_token.write().expect("auth token lock poisoned");
        if let Some(ref mut old) = *guard {
            old.zeroize();
        }
        *guard = token;
    }

    /// Captures the credentials to use for a single network attempt.
    pub fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            app_secret: self.app_secret.clone(),
            bearer_token: self.bearer_token(),
        }
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let has_token = self
            .bearer_token
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false);
        f.debug_struct("AuthState")
            .field("app_secret", &"[REDACTED]")
            .field("bearer_token", &if has_token { "[REDACTED]" } else { "<none>" })
            .finish()
    }
}

impl Drop for AuthState {
    fn drop(&mut self) {
        self.app_secret.zeroize();
        if let Ok(mut guard) = self.bearer_token.write() {
            if let Some(ref mut token) = *guard {
                token.zeroize();
            }
        }
    }
}

/// Credentials captured for one network attempt.
///
/// A snapshot is immutable: token updates made after it was taken affect the
/// next attempt, never the one already in flight.
#[derive(Clone)]
pub struct AuthSnapshot {
    /// App secret, always present.
    pub app_secret: String,
    /// Bearer token, if an end user is authenticated.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSnapshot")
            .field("app_secret", &"[REDACTED]")
            .field(
                "bearer_token",
                &if self.bearer_token.is_some() { "[REDACTED]" } else { "<none>" },
            )
            .finish()
    }
}

impl Drop for AuthSnapshot {
    fn drop(&mut self) {
        self.app_secret.zeroize();
        if let Some(ref mut token) = self.bearer_token {
            token.zeroize();
        }
    }
}
