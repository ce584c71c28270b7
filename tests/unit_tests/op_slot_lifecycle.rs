// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Beyond the single-cycle cases covered inline in `src/op.rs`, these check
//! that a slot is fully reusable across repeated arm/finish and arm/cancel
//! cycles (spec.md §8 property 5: "at any instant... at most one").

use ipc_pipe_transport::op::OpSlot;

#[test]
fn slot_is_reusable_across_many_cycles() {
    let slot = OpSlot::new();
    for _ in 0..50 {
        let guard = slot.arm().expect("slot must be armable once cleared");
        assert!(!guard.token().is_cancelled());
        drop(guard);
    }
    assert!(!slot.is_pending());
}

#[test]
fn cancel_then_rearm_yields_a_fresh_unfired_token() {
    let slot = OpSlot::new();
    let first = slot.arm().expect("arm");
    slot.cancel();
    assert!(first.token().is_cancelled());
    drop(first);

    let second = slot.arm().expect("arm again after cancel");
    assert!(
        !second.token().is_cancelled(),
        "a new arm must get an unfired token, not the cancelled one"
    );
}

#[tokio::test]
async fn concurrent_cancel_races_completion_without_panicking() {
    use std::sync::Arc;

    let slot = Arc::new(OpSlot::new());
    let guard = slot.arm().expect("arm");
    let token = guard.token().clone();

    let canceller = {
        let slot = Arc::clone(&slot);
        tokio::spawn(async move { slot.cancel() })
    };

    tokio::select! {
        _ = token.cancelled() => {},
        _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {},
    }
    drop(guard);
    canceller.await.expect("canceller task must not panic");
    assert!(!slot.is_pending());
}
