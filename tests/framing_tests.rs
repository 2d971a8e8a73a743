//! Wire framing tests: round-trip law, delimiter rejection, resynchronization

use face_tracker::constants::{END_MARKER, MAX_FRAME_PAYLOAD, START_MARKER};
use face_tracker::error::FramingError;
use face_tracker::framing::{decode, encode};
use std::io::Cursor;

#[test]
fn test_round_trip_law() {
    let payloads: Vec<&[u8]> = vec![
        b"",
        b"Y",
        b"N",
        b"-100,0.785",
        b"connected",
        b"\x00\x01\xFF\x80",
        b"a longer payload with spaces and 1234567890 digits",
    ];

    for payload in payloads {
        let frame = encode(payload).unwrap();
        assert_eq!(frame.first(), Some(&START_MARKER));
        assert_eq!(frame.last(), Some(&END_MARKER));

        let mut stream = Cursor::new(frame);
        let message = decode(&mut stream).unwrap();
        assert_eq!(message.payload, payload);
    }
}

#[test]
fn test_encode_rejects_delimiter_bytes() {
    let result = encode(b"bad<payload");
    match result {
        Err(FramingError::IllegalByte(b)) => assert_eq!(b, START_MARKER),
        other => panic!("expected IllegalByte, got {other:?}"),
    }

    let result = encode(b"bad>payload");
    match result {
        Err(FramingError::IllegalByte(b)) => assert_eq!(b, END_MARKER),
        other => panic!("expected IllegalByte, got {other:?}"),
    }
}

#[test]
fn test_decode_discards_leading_noise() {
    let mut stream = Cursor::new(b"garbage \xFF\x00 before>>the frame<payload>trailing".to_vec());
    let message = decode(&mut stream).unwrap();
    assert_eq!(message.payload, b"payload");
}

#[test]
fn test_decode_skips_mid_payload_start_marker() {
    // A stray start marker inside a frame is line noise, not a new frame
    let mut stream = Cursor::new(b"<he<llo>".to_vec());
    let message = decode(&mut stream).unwrap();
    assert_eq!(message.payload, b"hello");
}

#[test]
fn test_decode_returns_frames_in_stream_order() {
    let mut stream = Cursor::new(b"<first><second>".to_vec());
    assert_eq!(decode(&mut stream).unwrap().payload, b"first");
    assert_eq!(decode(&mut stream).unwrap().payload, b"second");
}

#[test]
fn test_decode_rejects_oversized_frame() {
    let mut oversized = vec![START_MARKER];
    oversized.extend(std::iter::repeat(b'x').take(MAX_FRAME_PAYLOAD + 1));
    oversized.push(END_MARKER);

    let mut stream = Cursor::new(oversized);
    match decode(&mut stream) {
        Err(FramingError::FrameTooLarge) => {}
        other => panic!("expected FrameTooLarge, got {other:?}"),
    }
}

#[test]
fn test_frame_at_exact_size_limit_is_accepted() {
    let payload = vec![b'x'; MAX_FRAME_PAYLOAD];
    let frame = encode(&payload).unwrap();
    let mut stream = Cursor::new(frame);
    assert_eq!(decode(&mut stream).unwrap().payload.len(), MAX_FRAME_PAYLOAD);
}

#[test]
fn test_decode_fails_on_truncated_stream() {
    // EOF before any frame
    let mut stream = Cursor::new(b"no frame here".to_vec());
    match decode(&mut stream) {
        Err(FramingError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("expected Io error, got {other:?}"),
    }

    // EOF mid-frame
    let mut stream = Cursor::new(b"<half a fra".to_vec());
    match decode(&mut stream) {
        Err(FramingError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("expected Io error, got {other:?}"),
    }
}
