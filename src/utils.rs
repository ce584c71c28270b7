// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::error::TransportError;

/// Scheme this transport accepts (spec §6).
pub const IPC_SCHEME: &str = "ipc://";

/// Maximum byte length of an address string, matching the upstream
/// `NNG_MAXADDRLEN` this transport was distilled from.
pub const MAX_ADDR_LEN: usize = 128;

/// Validates an `ipc://`-scheme URL per spec §6: it must start with the
/// scheme and fit within [`MAX_ADDR_LEN`] bytes. The URL is otherwise
/// stored verbatim — no further parsing is performed here.
pub fn validate_ipc_url(url: &str) -> Result<(), TransportError> {
    if url.len() > MAX_ADDR_LEN {
        return Err(TransportError::InvalidAddress(format!(
            "address exceeds {MAX_ADDR_LEN} bytes"
        )));
    }
    if !url.starts_with(IPC_SCHEME) {
        return Err(TransportError::InvalidAddress(format!(
            "address must start with {IPC_SCHEME:?}: {url:?}"
        )));
    }
    Ok(())
}

/// Strips the `ipc://` scheme, returning the filesystem path (UNIX) or
/// named-pipe path (Windows) portion of the URL.
pub fn path_from_ipc_url(url: &str) -> Result<&str, TransportError> {
    validate_ipc_url(url)?;
    Ok(&url[IPC_SCHEME.len()..])
}
