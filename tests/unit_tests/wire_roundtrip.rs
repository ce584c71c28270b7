// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Exercises the handshake header and the message frame header together, as
//! they actually appear back to back on the wire (spec.md §4.1/§4.2, S3).

use ipc_pipe_transport::wire::{frame, handshake};

#[test]
fn handshake_then_frame_concatenate_as_expected_on_the_wire() {
    let mut wire = Vec::new();
    wire.extend_from_slice(&handshake::encode(0x0050));
    wire.extend_from_slice(&frame::encode(5));
    wire.extend_from_slice(&[0xAA, 0xBB, 0x01, 0x02, 0x03]);

    assert_eq!(wire.len(), handshake::HANDSHAKE_LEN + frame::FRAME_HEADER_LEN + 5);

    let mut hs = [0u8; handshake::HANDSHAKE_LEN];
    hs.copy_from_slice(&wire[..handshake::HANDSHAKE_LEN]);
    let peer = handshake::decode(&hs).expect("handshake header must decode");
    assert_eq!(peer, 0x0050);

    let frame_start = handshake::HANDSHAKE_LEN;
    let mut fh = [0u8; frame::FRAME_HEADER_LEN];
    fh.copy_from_slice(&wire[frame_start..frame_start + frame::FRAME_HEADER_LEN]);
    let len = frame::decode(&fh).expect("frame header must decode");
    assert_eq!(len, 5);

    let body_start = frame_start + frame::FRAME_HEADER_LEN;
    assert_eq!(&wire[body_start..body_start + len as usize], &[
        0xAA, 0xBB, 0x01, 0x02, 0x03
    ]);
}

#[test]
fn bytes_match_spec_s3_scenario_exactly() {
    let frame_header = frame::encode(5);
    assert_eq!(
        frame_header,
        [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05]
    );
}
