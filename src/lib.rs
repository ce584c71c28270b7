// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Asynchronous IPC transport: the pipe/endpoint state machine that carries
//! discrete, length-prefixed messages between two peers over a UNIX domain
//! socket or Windows named pipe.
//!
//! This crate implements one pluggable transport (scheme `ipc://`) for a
//! larger scalability-protocol messaging library. It owns the handshake
//! negotiation, the framed send/receive engine, and the cancellation/
//! teardown discipline; it does not own sockets, retries, encryption, or
//! multi-peer fan-out.

/// Command-line and configuration-file glue.
pub mod cfg;
/// Public error type returned by every fallible operation in this crate.
pub mod error;
/// The endpoint state machine: dial/listen/accept.
pub mod endpoint;
/// `Message` type: the unit of data carried across a pipe.
pub mod message;
/// Per-call cancellable operation slots ("operation handles").
pub mod op;
/// `getopt`/`setopt` surface (all options currently unsupported).
pub mod options;
/// The pipe state machine: handshake, send, recv, close.
pub mod pipe;
/// The owning-socket collaborator interface (protocol id, rcvmax, getopt).
pub mod socket;
/// The platform byte-stream adapter (UNIX domain socket / named pipe).
pub mod stream;
/// Transport descriptor registration (scheme, init/fini hooks).
pub mod transport;
/// Small standalone helpers.
pub mod utils;
/// Wire formats: handshake header and message frame header.
pub mod wire;

pub use endpoint::{Endpoint, Mode};
pub use error::TransportError;
pub use message::Message;
pub use pipe::Pipe;
pub use socket::SocketView;
