// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! A bound local dialler (client) or listener (server), per spec §4.5.
//!
//! On a successful `connect`/`accept`, the endpoint wraps the platform
//! stream handed up by [`crate::stream::platform`] in a [`Pipe`], runs its
//! handshake, and hands the ready pipe back to the caller — the data flow
//! spec §2 describes as `Endpoint.connect/accept → platform stream →
//! Pipe.start → Pipe.send/recv loop`.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::OnceCell;
use tracing::info;

use crate::{
    error::TransportError,
    op::OpSlot,
    pipe::Pipe,
    socket::SocketView,
    stream::platform,
    utils::validate_ipc_url,
};

/// Whether an [`Endpoint`] dials out or listens for incoming connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A client endpoint: `connect()` dials `addr`.
    Dial,
    /// A server endpoint: `bind()` then `accept()` takes connections.
    Listen,
}

/// A bound local address used to dial out or accept incoming pipes.
pub struct Endpoint {
    addr: Arc<str>,
    proto: u16,
    rcvmax: usize,
    mode: Mode,
    closed: AtomicBool,
    op_slot: OpSlot,
    listener: OnceCell<platform::Listener>,
}

impl Endpoint {
    /// Validates `url` and copies `proto`/`rcvmax` from `socket` (spec §3:
    /// "copied from socket at creation; immutable thereafter").
    pub fn init(
        url: &str,
        socket: &dyn SocketView,
        mode: Mode,
    ) -> Result<Self, TransportError> {
        validate_ipc_url(url)?;
        Ok(Self {
            addr: Arc::from(url),
            proto: socket.proto(),
            rcvmax: socket.rcvmax(),
            mode,
            closed: AtomicBool::new(false),
            op_slot: OpSlot::new(),
            listener: OnceCell::new(),
        })
    }

    /// The address this endpoint was initialized with.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Whether this is a dial or listen endpoint.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True once [`Endpoint::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Begins listening. Synchronous (spec §4.5): the platform `listen`
    /// call either succeeds immediately or fails; there is no asynchronous
    /// completion to wait for.
    pub fn bind(&self) -> Result<(), TransportError> {
        if self.mode != Mode::Listen {
            return Err(TransportError::Protocol(
                "bind() called on a dial endpoint".into(),
            ));
        }
        let listener = platform::bind(&self.addr)?;
        self.listener
            .set(listener)
            .map_err(|_| TransportError::Busy)?;
        info!(addr = %self.addr, "ipc endpoint listening");
        Ok(())
    }

    /// Dials `addr`, running the handshake before returning the new pipe
    /// (spec §4.5).
    pub async fn connect(&self) -> Result<Pipe<platform::PlatformStream>, TransportError> {
        if self.mode != Mode::Dial {
            return Err(TransportError::Protocol(
                "connect() called on a listen endpoint".into(),
            ));
        }
        self.run_op(platform::connect(&self.addr)).await
    }

    /// Accepts one incoming connection on an already-[`bind`](Self::bind)
    /// endpoint, running the handshake before returning the new pipe.
    pub async fn accept(&self) -> Result<Pipe<platform::PlatformStream>, TransportError> {
        if self.mode != Mode::Listen {
            return Err(TransportError::Protocol(
                "accept() called on a dial endpoint".into(),
            ));
        }
        let listener = self
            .listener
            .get()
            .ok_or_else(|| TransportError::Protocol("endpoint not bound".into()))?;
        self.run_op(platform::accept(listener)).await
    }

    async fn run_op<F>(
        &self,
        fut: F,
    ) -> Result<Pipe<platform::PlatformStream>, TransportError>
    where
        F: std::future::Future<Output = std::io::Result<platform::PlatformStream>>,
    {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let guard = self.op_slot.arm()?;
        let token = guard.token().clone();

        // The handshake sub-phase of connect/accept must be raced against
        // the same cancellation token as the platform-level connect/accept
        // itself — otherwise a close() that lands mid-handshake has nothing
        // left polling the token and the call runs to completion (or hangs)
        // instead of returning promptly (spec §4.5, §5).
        let setup = async {
            let stream = fut.await?;
            let pipe = Pipe::new(stream, Arc::clone(&self.addr), self.proto, self.rcvmax);
            pipe.start().await?;
            Ok::<_, TransportError>(pipe)
        };

        tokio::select! {
            _ = token.cancelled() => Err(TransportError::Cancelled),
            res = setup => res,
        }
    }

    /// Idempotent, non-blocking: aborts any pending connect/accept, which
    /// drains through the normal cancellation path (spec §4.5).
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.op_slot.cancel();
    }

    /// Tears the endpoint down: closes it and waits for any in-flight
    /// connect/accept to finish before releasing the platform listener.
    pub async fn fini(self) {
        self.close();
        while self.op_slot.is_pending() {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
    }
}
