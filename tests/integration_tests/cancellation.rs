// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Cancellation and teardown scenarios from spec.md §8 (properties 6 and 7,
//! scenario S5) exercised across a real pair of connected pipes rather than
//! a bare `OpSlot` in isolation.

use std::sync::Arc;

use bytes::Bytes;
use ipc_pipe_transport::{Message, Pipe, TransportError};
use tokio::io::DuplexStream;

fn pipe_pair(rcvmax: usize) -> (Pipe<DuplexStream>, Pipe<DuplexStream>) {
    let (a, b) = tokio::io::duplex(64 * 1024);
    let a = Pipe::new(a, Arc::from("ipc:///tmp/cancel-a"), 0x0050, rcvmax);
    let b = Pipe::new(b, Arc::from("ipc:///tmp/cancel-b"), 0x0051, rcvmax);
    (a, b)
}

// S5, send side: a send that never finds a reader waits; the caller cancels
// just that one send (by aborting the task awaiting it), and a fresh send on
// a later message on the still-open pipe afterward still succeeds. This is
// distinct from `close()`, which is a whole-pipe, terminal operation — see
// `close_rejects_subsequent_send_and_recv` below.
#[tokio::test]
async fn cancelled_send_does_not_poison_a_later_send() {
    let (a, b) = pipe_pair(0);
    tokio::try_join!(a.start(), b.start()).expect("handshake");

    let a = Arc::new(a);
    let send_task = tokio::spawn({
        let a = Arc::clone(&a);
        async move {
            // A large body plus no reader on the other end keeps this send
            // outstanding long enough to cancel.
            let msg = Message::from_body(Bytes::from(vec![0u8; 16 * 1024 * 1024]));
            a.send(msg).await
        }
    });
    tokio::task::yield_now().await;
    send_task.abort();
    let _ = send_task.await;

    let msg = Message::from_body(Bytes::from_static(b"still alive"));
    let sent = a.send(msg).await.expect("send after cancel");
    assert_eq!(sent, b"still alive".len());
    let received = b.recv().await.expect("recv after cancel");
    assert_eq!(received.body().as_ref(), b"still alive");
}

// S4 (closed state): close() is terminal. Once called, any further send or
// recv on that pipe fails immediately with `Closed` rather than attempting
// fresh I/O, even though the underlying stream is otherwise healthy.
#[tokio::test]
async fn close_rejects_subsequent_send_and_recv() {
    let (a, b) = pipe_pair(0);
    tokio::try_join!(a.start(), b.start()).expect("handshake");

    a.close();
    assert!(a.is_closed());

    let err = a
        .send(Message::from_body(Bytes::from_static(b"too late")))
        .await
        .expect_err("send on a closed pipe must fail");
    assert!(matches!(err, TransportError::Closed));

    b.close();
    let err = b
        .recv()
        .await
        .expect_err("recv on a closed pipe must fail");
    assert!(matches!(err, TransportError::Closed));
}

// Property 6: cancelling an op slot with nothing pending, or twice in a row,
// never panics and never double-finishes anything observable.
#[tokio::test]
async fn closing_an_idle_pipe_twice_is_a_no_op() {
    let (a, _b) = pipe_pair(0);
    a.close();
    a.close();
}

// Property 7: fini() only returns once every in-flight operation has
// actually drained, and the pipe is then gone for good (consumed by value).
#[tokio::test]
async fn fini_waits_for_in_flight_recv_to_drain() {
    let (a, b) = pipe_pair(0);
    tokio::try_join!(a.start(), b.start()).expect("handshake");

    let b = Arc::new(b);
    let recv_task = tokio::spawn({
        let b = Arc::clone(&b);
        async move { b.recv().await }
    });
    tokio::task::yield_now().await;
    b.close();

    let err = recv_task
        .await
        .expect("task joins")
        .expect_err("cancelled recv must error");
    assert!(err.is_cancelled());

    // No `Arc` clones survive past this point, so `fini` can consume `b`.
    let b = Arc::try_unwrap(b).unwrap_or_else(|_| panic!("stray Arc clone of b"));
    b.fini().await;
    a.fini().await;
}
