// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The "operation handle" of spec §3/§4/§5, realised in async Rust.
//!
//! The spec's `user_tx`/`user_rx`/`user_neg` fields are non-owning
//! references to a pending user operation, cleared by either completion or
//! cancellation, with at-most-once-finish guaranteed by the pair racing
//! under a lock. Here that's a small `OpSlot`: at most one [`OpGuard`] can
//! be armed at a time (a second `arm()` while one is outstanding returns
//! [`TransportError::Busy`], matching the "at most one pending operation of
//! each kind" invariant), and the guard carries the
//! [`tokio_util::sync::CancellationToken`] a concurrent `cancel()` call
//! fires — the async equivalent of `stop()` guaranteeing no further
//! completion runs except to observe the cancelled state.

use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use crate::error::TransportError;

/// Guards a slot holding at most one in-flight cancellable operation.
#[derive(Debug, Default)]
pub struct OpSlot {
    current: Mutex<Option<CancellationToken>>,
}

impl OpSlot {
    /// Creates an empty, unarmed slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the slot for a new operation.
    ///
    /// Fails with [`TransportError::Busy`] if a previous operation on this
    /// slot has not yet finished (its guard has not been dropped). On
    /// success, returns a guard whose [`OpGuard::token`] the caller's
    /// `select!` should race the underlying I/O against, and which clears
    /// the slot automatically when the operation finishes (by any path).
    pub fn arm(&self) -> Result<OpGuard<'_>, TransportError> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if current.is_some() {
            return Err(TransportError::Busy);
        }
        let token = CancellationToken::new();
        *current = Some(token.clone());
        Ok(OpGuard { slot: self, token })
    }

    /// Cancels the slot's pending operation, if any. A no-op if nothing is
    /// pending or the pending operation has already finished — cancellation
    /// races with completion exactly as spec §5 describes, and the later
    /// of the two observes nothing left to do.
    pub fn cancel(&self) {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = current.as_ref() {
            token.cancel();
        }
    }

    /// True while an operation is pending on this slot.
    pub fn is_pending(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn clear(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = None;
    }
}

/// RAII handle for one armed operation. Dropping it clears the slot,
/// whether the operation completed, errored, or was cancelled.
pub struct OpGuard<'a> {
    slot: &'a OpSlot,
    token: CancellationToken,
}

impl OpGuard<'_> {
    /// The token a concurrent [`OpSlot::cancel`] call will fire.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        self.slot.clear();
    }
}
