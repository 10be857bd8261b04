// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Batch id generation.

use uuid::Uuid;

use crate::batch::BatchId;

/// Source of batch ids for payload-only submissions.
///
/// Implementations must produce ids that are unique within the lifetime of a
/// handle; collisions with a batch still in flight are dropped.
pub trait IdSupplier: Send + Sync {
    /// Returns a fresh batch id.
    fn next_id(&self) -> BatchId;
}

/// Default id supplier backed by random UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSupplier;

impl IdSupplier for UuidSupplier {
    fn next_id(&self) -> BatchId {
        Uuid::new_v4().to_string()
    }
}
