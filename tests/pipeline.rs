//! End-to-end framed-stream scenarios: a sender's bytes pushed through a
//! receiver over an in-memory transport, with and without corruption.

use std::io::Cursor;

use crossbeam::channel::bounded;
use crossbeam::select;

use satcom::adapter::{Adapter, CspV1Adapter};
use satcom::crc::{Crc32Adapter, CRC32C};
use satcom::csp;
use satcom::framing::{FrameConfig, FrameReceiver, FrameSender, ReceiveHandle};
use satcom::satlab::{
    idle_frame_random, idle_frame_zeros, SpaceframeAdapter, SpaceframeConfig, ASM,
};
use satcom::Error;

fn crc32c() -> Box<dyn Adapter> {
    Box::new(Crc32Adapter::new(&CRC32C).unwrap())
}

/// Collect everything a background receiver produces until it exits.
fn drain(handle: ReceiveHandle) -> (Vec<Vec<u8>>, Vec<Error>) {
    let mut msgs = Vec::new();
    let mut errs = Vec::new();
    let mut msgs_open = true;
    let mut errs_open = true;

    while msgs_open || errs_open {
        select! {
            recv(handle.messages) -> res => match res {
                Ok(msg) => msgs.push(msg),
                Err(_) => msgs_open = false,
            },
            recv(handle.errors) -> res => match res {
                Ok(err) => errs.push(err),
                Err(_) => errs_open = false,
            },
        }
    }
    handle.join();

    (msgs, errs)
}

fn receive_all(cfg: FrameConfig, stream: Vec<u8>) -> (Vec<Vec<u8>>, Vec<Error>) {
    let fr = FrameReceiver::new(cfg, Cursor::new(stream)).unwrap();
    let (_cancel_tx, cancel_rx) = bounded::<()>(0);
    drain(fr.spawn(cancel_rx))
}

fn plain_cfg(frame_size: usize) -> FrameConfig {
    FrameConfig {
        sync_marker: vec![0xff],
        frame_size,
        adapters: vec![],
    }
}

#[test]
fn garbage_interleaved_frames_deliver_exactly() {
    let stream = vec![
        0xaa, 0xbb, 0xcc, //
        0xff, 0x44, 0x55, 0x66, //
        0xff, 0x77, 0x88, 0x99, //
        0xdd, 0xee,
    ];

    let (msgs, errs) = receive_all(plain_cfg(3), stream);

    assert_eq!(msgs, vec![vec![0x44, 0x55, 0x66], vec![0x77, 0x88, 0x99]]);
    assert!(errs.is_empty(), "unexpected errors: {errs:?}");
}

#[test]
fn receiver_survives_corrupt_crc_frames() {
    let payloads: [[u8; 2]; 5] = [
        [0x11, 0x22],
        [0x33, 0x44],
        [0x55, 0x66],
        [0x77, 0x88],
        [0x99, 0xaa],
    ];

    let cfg = FrameConfig {
        sync_marker: vec![0xff],
        frame_size: 6,
        adapters: vec![crc32c()],
    };
    let mut stream = Vec::new();
    let mut sender = FrameSender::new(cfg, &mut stream).unwrap();
    for p in &payloads {
        sender.send(p).unwrap();
    }
    drop(sender);

    // each framed region is 1 (marker) + 6 bytes; mutate the final CRC
    // byte of frames 3 and 5
    stream[3 * 7 - 1] ^= 0xa5;
    stream[5 * 7 - 1] ^= 0xa5;

    let cfg = FrameConfig {
        sync_marker: vec![0xff],
        frame_size: 6,
        adapters: vec![crc32c()],
    };
    let (msgs, errs) = receive_all(cfg, stream);

    assert_eq!(
        msgs,
        vec![vec![0x11, 0x22], vec![0x33, 0x44], vec![0x77, 0x88]],
        "good frames should be delivered in stream order"
    );
    assert_eq!(errs.len(), 2, "expected one error per corrupt frame: {errs:?}");
    for err in errs {
        assert!(matches!(err, Error::CrcMismatch), "unexpected error: {err}");
    }
}

fn srs4_cfg() -> FrameConfig {
    FrameConfig {
        sync_marker: ASM.to_vec(),
        frame_size: 223,
        adapters: vec![
            Box::new(SpaceframeAdapter::new(SpaceframeConfig {
                payload_data_size: 217,
                ..Default::default()
            })),
            crc32c(),
        ],
    }
}

#[test]
fn srs4_style_loopback() {
    let messages: Vec<&[u8]> = vec![b"HELLO WORLD", b"", b"a longer message with some padding room"];

    let mut stream = Vec::new();
    let mut sender = FrameSender::new(srs4_cfg(), &mut stream).unwrap();
    for msg in &messages {
        sender.send(msg).unwrap();
    }
    drop(sender);

    let (msgs, errs) = receive_all(srs4_cfg(), stream);

    assert_eq!(msgs, messages);
    assert!(errs.is_empty(), "unexpected errors: {errs:?}");
}

#[test]
fn srs4_loopback_with_interleaved_garbage() {
    let messages: Vec<&[u8]> = vec![b"one", b"two", b"three"];

    // garbage that cannot contain the ASM's first byte
    let garbage: Vec<u8> = (0u8..60).map(|i| i.wrapping_mul(3) % 0x1a).collect();

    let mut stream = Vec::new();
    for msg in &messages {
        stream.extend_from_slice(&garbage);
        let mut one = Vec::new();
        let mut sender = FrameSender::new(srs4_cfg(), &mut one).unwrap();
        sender.send(msg).unwrap();
        stream.extend_from_slice(&one);
    }
    stream.extend_from_slice(&garbage);

    let (msgs, errs) = receive_all(srs4_cfg(), stream);

    assert_eq!(msgs, messages);
    assert!(errs.is_empty(), "unexpected errors: {errs:?}");
}

fn csp_chain_cfg() -> FrameConfig {
    FrameConfig {
        sync_marker: vec![0xff],
        frame_size: 10,
        adapters: vec![
            Box::new(
                CspV1Adapter::new(
                    csp::v1::PacketHeader {
                        priority: 1,
                        source: 14,
                        destination: 15,
                        destination_port: 17,
                        source_port: 16,
                    },
                    4,
                )
                .unwrap(),
            ),
            Box::new(SpaceframeAdapter::new(SpaceframeConfig {
                // CSP header plus message
                payload_data_size: 8,
                ..Default::default()
            })),
        ],
    }
}

#[test]
fn csp_chain_wire_format() {
    let mut stream = Vec::new();
    let mut sender = FrameSender::new(csp_chain_cfg(), &mut stream).unwrap();
    sender.send(&[0x11, 0x22]).unwrap();
    drop(sender);

    assert_eq!(
        stream,
        [
            0xff, // sync marker
            0x00, 0x06, // Spaceframe header
            0x5c, 0xf4, 0x50, 0x00, // CSP header
            0x11, 0x22, // original message
            0x00, 0x00, // Spaceframe padding
        ]
    );
}

#[test]
fn csp_chain_loopback() {
    let mut stream = Vec::new();
    let mut sender = FrameSender::new(csp_chain_cfg(), &mut stream).unwrap();
    sender.send(&[0x11, 0x22]).unwrap();
    sender.send(&[0x33]).unwrap();
    drop(sender);

    let (msgs, errs) = receive_all(csp_chain_cfg(), stream);

    assert_eq!(msgs, vec![vec![0x11, 0x22], vec![0x33]]);
    assert!(errs.is_empty(), "unexpected errors: {errs:?}");
}

#[test]
fn idle_frames_through_receiver() {
    // the frame layer owns the ASM, so the Spaceframe config leaves it off
    let sf = SpaceframeConfig {
        payload_data_size: 16,
        with_crc: true,
        ..Default::default()
    };
    // ASM-inclusive variant: its random idle frame is marker plus
    // frame_size bytes of noise, exactly one framed region on this link
    let sf_with_asm = SpaceframeConfig {
        with_asm: true,
        ..sf
    };
    let mk_cfg = || FrameConfig {
        sync_marker: ASM.to_vec(),
        frame_size: sf.frame_size(),
        adapters: vec![Box::new(SpaceframeAdapter::new(sf))],
    };

    let mut stream = Vec::new();
    stream.extend_from_slice(&ASM);
    stream.extend_from_slice(&idle_frame_zeros(&sf).unwrap());

    // a random idle frame is deliberately invalid; the receiver should
    // report it and keep going
    stream.extend_from_slice(&idle_frame_random(&sf_with_asm).unwrap());

    stream.extend_from_slice(&ASM);
    stream.extend_from_slice(&sf.enframe(b"real data").unwrap());

    let (msgs, errs) = receive_all(mk_cfg(), stream);

    assert_eq!(msgs.len(), 2, "zeros idle frame and real frame: {msgs:?}");
    assert_eq!(msgs[0], vec![0u8; 16]);
    assert_eq!(msgs[1], b"real data");
    assert_eq!(errs.len(), 1, "random idle frame should fail: {errs:?}");
}
