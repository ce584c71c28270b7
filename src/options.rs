// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! `getopt`/`setopt` surface for pipes and endpoints.
//!
//! Per spec §6/§9: `LOCALADDR`/`REMOTEADDR` retrieval was left commented
//! out in the upstream source this spec was distilled from, pending a
//! decision on copy semantics (length-first probe vs. truncation). We
//! preserve that as an open question rather than inventing behaviour —
//! every option, known or not, resolves to [`TransportError::NotSupported`].

use crate::{error::TransportError, socket::Option_};

/// Reads an option. Always fails: no option is currently implemented.
///
/// See the module docs and spec §9 for why `LOCALADDR`/`REMOTEADDR` are
/// deliberately left unimplemented instead of guessed at.
pub fn getopt<T>(_name: Option_) -> Result<T, TransportError> {
    Err(TransportError::NotSupported)
}

/// Writes an option. Always fails: this transport exposes no writable
/// options.
pub fn setopt<T>(_name: Option_, _value: T) -> Result<(), TransportError> {
    Err(TransportError::NotSupported)
}
