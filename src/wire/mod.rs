// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Wire formats used by the IPC transport. All multi-byte integers are
//! big-endian.

/// Handshake header: 8 bytes exchanged once per pipe to agree on protocol
/// identity.
pub mod handshake;
/// Message frame header: 9 bytes prefixed to every user message.
pub mod frame;
