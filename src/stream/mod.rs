// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The platform byte-stream adapter.
//!
//! Everything here is deliberately dumb: connect/listen/accept/send/recv/
//! close on a bidirectional byte channel, per spec §1/§6's "platform pipe
//! contract". `Pipe` and `Endpoint` (the in-scope state machine) are
//! generic over [`platform::IpcStream`] and never reach into this module's
//! internals.
pub mod platform;
