// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The unit of data carried across a pipe: a header segment and a body
//! segment, concatenated on the wire but kept separate in memory so callers
//! can prepend protocol headers without copying the body.

use bytes::{Bytes, BytesMut};

use crate::error::TransportError;

/// A message in flight between two pipes.
///
/// `header` and `body` are sent as two of the up-to-three gather-write
/// segments described in spec §4.2 (the third being the frame header
/// itself). On receive, messages are always decoded with an empty header
/// and the full payload in `body`; higher transport layers that prepend
/// their own header split it back out of `body`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    header: Bytes,
    body: Bytes,
}

impl Message {
    /// Builds a message from separately-owned header and body segments.
    pub fn new(header: impl Into<Bytes>, body: impl Into<Bytes>) -> Self {
        Self {
            header: header.into(),
            body: body.into(),
        }
    }

    /// Builds a message with an empty header, the common case for callers
    /// that don't speak a protocol layered on top of the raw frame.
    pub fn from_body(body: impl Into<Bytes>) -> Self {
        Self {
            header: Bytes::new(),
            body: body.into(),
        }
    }

    /// Allocates `len` zeroed bytes of scratch space for
    /// [`crate::pipe::Pipe::recv`] to read the body into directly.
    ///
    /// Mirrors the allocation-failure path of spec §4.3: on a real
    /// allocator this can fail under memory pressure, which the caller
    /// surfaces as [`TransportError::NoMemory`].
    pub(crate) fn alloc_body_scratch(len: usize) -> Result<BytesMut, TransportError> {
        if len > isize::MAX as usize {
            return Err(TransportError::NoMemory);
        }
        let mut body = BytesMut::with_capacity(len);
        body.resize(len, 0);
        Ok(body)
    }

    /// The header segment.
    pub fn header(&self) -> &Bytes {
        &self.header
    }

    /// The body segment.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Total length of header + body, as carried in the frame header.
    pub fn wire_len(&self) -> u64 {
        (self.header.len() + self.body.len()) as u64
    }
}
