// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Transport descriptor registration (spec §6).
//!
//! A surrounding scalability-protocol library that pluggably loads
//! transports by scheme would hold one of these per registered transport.
//! `init`/`fini` are no-ops here: this transport carries no global mutable
//! state beyond the descriptor itself.

/// The registered transport scheme, matching the original's
/// `nni_tran.tran_scheme = "ipc"` — distinct from [`crate::utils::IPC_SCHEME`],
/// which is the `"ipc://"` URL prefix this transport's addresses must start
/// with.
pub const SCHEME: &str = "ipc";

/// Describes the transport to a surrounding messaging library: the scheme
/// it answers to, and its lifecycle hooks.
#[derive(Debug, Clone, Copy)]
pub struct TransportDescriptor {
    /// The scheme this transport answers to, e.g. `"ipc"`.
    pub scheme: &'static str,
}

impl TransportDescriptor {
    /// The one descriptor this crate registers.
    pub const IPC: TransportDescriptor = TransportDescriptor { scheme: SCHEME };

    /// Transport-wide initialization. No-op: see module docs.
    pub fn init(&self) {}

    /// Transport-wide teardown. No-op: see module docs.
    pub fn fini(&self) {}
}
