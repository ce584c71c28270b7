// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Concrete per-platform byte streams: `tokio::net::UnixStream` on Unix,
//! `tokio::net::windows::named_pipe` on Windows. This is the "platform pipe
//! contract" of spec §6 — send/recv/close on a duplex byte channel — with
//! no protocol knowledge whatsoever.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::utils::path_from_ipc_url;

/// A duplex byte stream suitable for use as the pipe's transport.
///
/// Blanket-implemented for anything that already satisfies the bounds;
/// `Pipe<S: IpcStream>` never needs to know whether `S` is a UNIX domain
/// socket or a Windows named pipe.
pub trait IpcStream: AsyncRead + AsyncWrite + Unpin + Send + 'static {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send + 'static> IpcStream for T {}

#[cfg(unix)]
pub use unix::*;
#[cfg(windows)]
pub use windows::*;

#[cfg(unix)]
mod unix {
    use tokio::net::{UnixListener, UnixStream};

    use super::*;

    /// The concrete stream type used on Unix: a UNIX domain socket.
    pub type PlatformStream = UnixStream;

    /// The concrete listener type used on Unix.
    pub type Listener = UnixListener;

    /// Dials `url` (an `ipc://` address), returning a connected stream.
    pub async fn connect(url: &str) -> std::io::Result<PlatformStream> {
        let path = path_from_ipc_url(url)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        UnixStream::connect(path).await
    }

    /// Binds a listener at `url`, ready to [`listen`].
    pub fn bind(url: &str) -> std::io::Result<Listener> {
        let path = path_from_ipc_url(url)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let _ = std::fs::remove_file(path);
        UnixListener::bind(path)
    }

    /// Accepts one incoming connection on an already-bound listener.
    pub async fn accept(listener: &Listener) -> std::io::Result<PlatformStream> {
        let (stream, _addr) = listener.accept().await?;
        Ok(stream)
    }
}

#[cfg(windows)]
mod windows {
    use tokio::{
        io::ReadBuf,
        net::windows::named_pipe::{
            ClientOptions, NamedPipeClient, NamedPipeServer, ServerOptions,
        },
    };

    use super::*;

    /// A named pipe, either the client or the server end. Tokio models
    /// these as two distinct types even though both are duplex byte
    /// streams; this enum unifies them behind one [`IpcStream`] impl so
    /// `Pipe<S>` doesn't need to be generic per role.
    pub enum PlatformStream {
        Client(NamedPipeClient),
        Server(NamedPipeServer),
    }

    impl AsyncRead for PlatformStream {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            match self.get_mut() {
                PlatformStream::Client(c) => std::pin::Pin::new(c).poll_read(cx, buf),
                PlatformStream::Server(s) => std::pin::Pin::new(s).poll_read(cx, buf),
            }
        }
    }

    impl AsyncWrite for PlatformStream {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            match self.get_mut() {
                PlatformStream::Client(c) => std::pin::Pin::new(c).poll_write(cx, buf),
                PlatformStream::Server(s) => std::pin::Pin::new(s).poll_write(cx, buf),
            }
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            match self.get_mut() {
                PlatformStream::Client(c) => std::pin::Pin::new(c).poll_flush(cx),
                PlatformStream::Server(s) => std::pin::Pin::new(s).poll_flush(cx),
            }
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            match self.get_mut() {
                PlatformStream::Client(c) => std::pin::Pin::new(c).poll_shutdown(cx),
                PlatformStream::Server(s) => std::pin::Pin::new(s).poll_shutdown(cx),
            }
        }
    }

    /// Dials `url` (an `ipc://` address naming a pipe path), returning a
    /// connected client stream.
    pub async fn connect(url: &str) -> std::io::Result<PlatformStream> {
        let path = path_from_ipc_url(url)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let client = ClientOptions::new().open(path)?;
        Ok(PlatformStream::Client(client))
    }

    /// A server-side listener: a named pipe instance awaiting its first
    /// connection, re-armed on every [`accept`].
    pub struct Listener {
        path: String,
    }

    /// Binds a listener at `url`, ready to [`accept`].
    pub fn bind(url: &str) -> std::io::Result<Listener> {
        let path = path_from_ipc_url(url)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        Ok(Listener { path: path.to_string() })
    }

    /// Accepts one incoming connection, creating a fresh pipe instance for
    /// the next accept call.
    pub async fn accept(listener: &Listener) -> std::io::Result<PlatformStream> {
        let server = ServerOptions::new().create(&listener.path)?;
        server.connect().await?;
        Ok(PlatformStream::Server(server))
    }
}
