// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! One established IPC connection: handshake, framed send/recv, close.
//!
//! This is the state machine of spec §4.1–§4.4. The C original threads a
//! callback-driven continuation through `got_tx`/`got_rx`/`want_tx`/
//! `want_rx` counters and a persistent `rxmsg` scratch field because each
//! suspension point there is a post-and-return through an `nni_aio`
//! callback. In async Rust the equivalent suspension is simply an `.await`:
//! [`tokio::io::AsyncWriteExt::write_all`] and
//! [`tokio::io::AsyncReadExt::read_exact`] already retry internally on
//! short completions (spec scenario S6), so `start`/`send`/`recv` are
//! straight-line async functions and the handshake counters and `rxmsg`
//! become ordinary stack locals of the one in-flight call instead of
//! struct fields — see DESIGN.md for the full rationale.
//!
//! What does persist as struct state is exactly what the spec calls out as
//! needing to survive across suspension and be visible to a concurrent
//! `close()`/cancel: the three [`OpSlot`]s, one per operation kind, and the
//! split read/write halves of the stream (so a slow receive can never
//! block a send, and vice versa).

use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf},
    sync::Mutex,
};
use tracing::{debug, warn};

use crate::{
    error::TransportError,
    message::Message,
    op::OpSlot,
    stream::platform::IpcStream,
    wire::{frame, handshake},
};

/// One established IPC connection after (or pending) a successful
/// handshake.
///
/// Generic over the underlying duplex byte stream so the same state
/// machine serves a UNIX domain socket, a Windows named pipe, or — in
/// tests — an in-memory [`tokio::io::duplex`] pair.
pub struct Pipe<S: IpcStream> {
    /// Shared with the endpoint that created this pipe; outlives the pipe
    /// via reference counting rather than a borrowed lifetime (spec §3
    /// calls for a non-owning reference with lifetime >= pipe; `Arc<str>`
    /// is the idiomatic Rust equivalent when the owner may outlive or be
    /// dropped independently of any one pipe).
    addr: Arc<str>,
    reader: Mutex<ReadHalf<S>>,
    writer: Mutex<WriteHalf<S>>,
    proto: u16,
    peer: OnceLock<u16>,
    rcvmax: usize,
    /// Set by [`Pipe::close`]; terminal. Checked at the entry of every
    /// public operation so a pipe that has been asked to abort its I/O
    /// stays aborted instead of silently accepting fresh work (spec §4.4,
    /// scenario S4: "subsequent B.recv after pipe close fails with
    /// closed").
    closed: AtomicBool,
    tx_slot: OpSlot,
    rx_slot: OpSlot,
    neg_slot: OpSlot,
}

impl<S: IpcStream> Pipe<S> {
    /// Wraps a freshly connected/accepted stream. `proto` and `rcvmax` are
    /// copied from the owning socket at creation, per spec §3.
    pub fn new(stream: S, addr: Arc<str>, proto: u16, rcvmax: usize) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            addr,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            proto,
            peer: OnceLock::new(),
            rcvmax,
            closed: AtomicBool::new(false),
            tx_slot: OpSlot::new(),
            rx_slot: OpSlot::new(),
            neg_slot: OpSlot::new(),
        }
    }

    /// True once [`Pipe::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// The endpoint address this pipe was created from.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// The local protocol id advertised during the handshake.
    pub fn proto(&self) -> u16 {
        self.proto
    }

    /// The remote peer's protocol id. Only meaningful after [`Pipe::start`]
    /// has completed successfully; `0` beforehand (spec §3: "undefined
    /// before").
    pub fn peer(&self) -> u16 {
        self.peer.get().copied().unwrap_or(0)
    }

    /// The configured receive cap. `0` means unlimited.
    pub fn rcvmax(&self) -> usize {
        self.rcvmax
    }

    async fn write_locked(&self, buf: &[u8]) -> std::io::Result<()> {
        let mut w = self.writer.lock().await;
        w.write_all(buf).await
    }

    async fn read_locked(&self, buf: &mut [u8]) -> std::io::Result<()> {
        let mut r = self.reader.lock().await;
        r.read_exact(buf).await
    }

    /// Runs the handshake (spec §4.1): send our 8-byte header, then receive
    /// and validate the peer's. The send is always issued before any
    /// receive, matching the wire-ordering requirement.
    pub async fn start(&self) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let guard = self.neg_slot.arm()?;
        let token = guard.token().clone();

        let txhead = handshake::encode(self.proto);
        tokio::select! {
            _ = token.cancelled() => return Err(TransportError::Cancelled),
            res = self.write_locked(&txhead) => res?,
        }

        let mut rxhead = [0u8; handshake::HANDSHAKE_LEN];
        tokio::select! {
            _ = token.cancelled() => return Err(TransportError::Cancelled),
            res = self.read_locked(&mut rxhead) => res?,
        }

        let peer = handshake::decode(&rxhead)?;
        // start() is guarded by neg_slot so at most one call reaches here
        // at a time; set() can only ever observe an empty cell.
        let _ = self.peer.set(peer);
        debug!(proto = self.proto, peer, addr = %self.addr, "ipc handshake complete");
        Ok(())
    }

    /// Sends one message, framed as a 9-byte header followed by the
    /// message's header and body segments (spec §4.2).
    ///
    /// Returns the number of body bytes sent on success. At most one send
    /// may be pending at a time; a concurrent call while one is in flight
    /// fails with [`TransportError::Busy`].
    pub async fn send(&self, msg: Message) -> Result<usize, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let guard = self.tx_slot.arm()?;
        let token = guard.token().clone();

        let frame_header = frame::encode(msg.wire_len());
        let header = msg.header().clone();
        let body = msg.body().clone();
        let body_len = body.len();

        let write_fut = async {
            self.write_locked(&frame_header).await?;
            if !header.is_empty() {
                self.write_locked(&header).await?;
            }
            if !body.is_empty() {
                self.write_locked(&body).await?;
            }
            Ok::<(), std::io::Error>(())
        };

        tokio::select! {
            _ = token.cancelled() => Err(TransportError::Cancelled),
            res = write_fut => {
                res?;
                Ok(body_len)
            }
        }
    }

    /// Receives one message: a 9-byte frame header, then exactly that many
    /// body bytes (spec §4.3).
    ///
    /// At most one receive may be pending at a time; a concurrent call
    /// while one is in flight fails with [`TransportError::Busy`]. A send
    /// in progress on the same pipe is unaffected.
    pub async fn recv(&self) -> Result<Message, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let guard = self.rx_slot.arm()?;
        let token = guard.token().clone();

        let mut rxhead = [0u8; frame::FRAME_HEADER_LEN];
        tokio::select! {
            _ = token.cancelled() => return Err(TransportError::Cancelled),
            res = self.read_locked(&mut rxhead) => res?,
        }

        let len = frame::decode(&rxhead)?;
        if self.rcvmax > 0 && len > self.rcvmax as u64 {
            return Err(TransportError::MessageTooLarge {
                len,
                rcvmax: self.rcvmax as u64,
            });
        }

        let mut body = Message::alloc_body_scratch(len as usize)?;
        tokio::select! {
            _ = token.cancelled() => return Err(TransportError::Cancelled),
            res = self.read_locked(&mut body) => res?,
        }

        Ok(Message::from_body(body.freeze()))
    }

    /// Idempotent, non-blocking: requests the platform pipe to abort all
    /// pending I/O (spec §4.4). Cancels any pending send/recv/negotiation so
    /// their callers observe [`TransportError::Cancelled`] on their next
    /// poll, and marks the pipe closed so any *subsequent* `start`/`send`/
    /// `recv` call fails immediately with [`TransportError::Closed`] instead
    /// of attempting fresh I/O (scenario S4). Does not wait for in-flight
    /// operations to actually finish — call [`Pipe::fini`] for that.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.neg_slot.cancel();
        self.tx_slot.cancel();
        self.rx_slot.cancel();
    }

    /// Tears the pipe down: cancels any pending operation and blocks until
    /// none is in flight, then drops the underlying stream (spec §4.4).
    /// Consumes the pipe — callers must not still be holding a cloned
    /// handle expecting to use it afterward.
    pub async fn fini(self) {
        self.close();
        while self.tx_slot.is_pending()
            || self.rx_slot.is_pending()
            || self.neg_slot.is_pending()
        {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let mut writer = self.writer.into_inner();
        if let Err(e) = writer.shutdown().await {
            warn!("ipc pipe shutdown during fini: {e}");
        }
    }
}

impl<S: IpcStream> std::fmt::Debug for Pipe<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipe")
            .field("addr", &self.addr)
            .field("proto", &self.proto)
            .field("peer", &self.peer.get())
            .field("rcvmax", &self.rcvmax)
            .field("closed", &self.is_closed())
            .finish()
    }
}
