// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Spec.md §5 ordering guarantees: messages surface in submission order, and
//! a slow receiver never blocks an unrelated sender (and vice versa) beyond
//! the brief critical section under the per-kind op slot.

use std::sync::Arc;

use bytes::Bytes;
use ipc_pipe_transport::{Message, Pipe};
use tokio::io::DuplexStream;

fn pipe_pair() -> (Pipe<DuplexStream>, Pipe<DuplexStream>) {
    let (a, b) = tokio::io::duplex(64 * 1024);
    let a = Pipe::new(a, Arc::from("ipc:///tmp/order-a"), 0x0050, 0);
    let b = Pipe::new(b, Arc::from("ipc:///tmp/order-b"), 0x0051, 0);
    (a, b)
}

#[tokio::test]
async fn messages_surface_in_submission_order() {
    let (a, b) = pipe_pair();
    tokio::try_join!(a.start(), b.start()).expect("handshake");

    for i in 0u8..10 {
        a.send(Message::from_body(Bytes::from(vec![i]))).await.expect("send");
    }
    for i in 0u8..10 {
        let msg = b.recv().await.expect("recv");
        assert_eq!(msg.body().as_ref(), &[i]);
    }
}

// A recv with nothing incoming must not prevent a concurrent send on the
// same pipe from completing.
#[tokio::test]
async fn a_pending_recv_does_not_block_a_concurrent_send() {
    let (a, b) = pipe_pair();
    tokio::try_join!(a.start(), b.start()).expect("handshake");

    let a = Arc::new(a);
    let recv_task = tokio::spawn({
        let a = Arc::clone(&a);
        async move { a.recv().await }
    });
    tokio::task::yield_now().await;

    // a's own send is independent of a's own pending recv.
    let sent = a
        .send(Message::from_body(Bytes::from_static(b"unblocked")))
        .await
        .expect("send must not be blocked by a's own pending recv");
    assert_eq!(sent, b"unblocked".len());

    let received = b.recv().await.expect("b receives a's send");
    assert_eq!(received.body().as_ref(), b"unblocked");

    // Now satisfy a's outstanding recv so the spawned task can complete.
    b.send(Message::from_body(Bytes::from_static(b"reply"))).await.expect("reply send");
    let recv_result = recv_task.await.expect("task joins").expect("a's recv completes");
    assert_eq!(recv_result.body().as_ref(), b"reply");
}
