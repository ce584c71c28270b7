// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Typed error surface for the IPC transport.
//!
//! Internal plumbing (config loading, the demo binary) uses `anyhow`, but
//! every fallible operation reachable from [`crate::Pipe`] or
//! [`crate::Endpoint`] returns this enum so callers can match on a specific
//! failure kind instead of parsing a string.

use thiserror::Error;

/// Errors surfaced by the pipe/endpoint state machine.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Allocation failure for a struct or an incoming message.
    #[error("no memory")]
    NoMemory,

    /// The URL did not start with `ipc://`, or exceeded the maximum address
    /// length.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Handshake magic mismatch, frame type byte other than `0x01`, or
    /// non-zero reserved bytes.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Incoming payload length exceeded the receiver's `rcvmax`.
    #[error("message too large: {len} bytes exceeds rcvmax of {rcvmax}")]
    MessageTooLarge {
        /// Length advertised by the frame header.
        len: u64,
        /// The receiver's configured cap.
        rcvmax: u64,
    },

    /// The requested option is not supported by this transport.
    #[error("not supported")]
    NotSupported,

    /// The pending operation was cancelled by its caller.
    #[error("operation cancelled")]
    Cancelled,

    /// The pipe or endpoint has already been closed.
    #[error("closed")]
    Closed,

    /// Another operation of the same kind (send/recv/negotiation/connect) is
    /// already pending on this pipe or endpoint.
    #[error("operation already in progress")]
    Busy,

    /// A byte-stream-level error, passed through unchanged.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// True if this error is the result of cancellation rather than a real
    /// I/O or protocol failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}
