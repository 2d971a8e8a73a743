//! Byte-level message framing for the serial wire protocol.
//!
//! A frame is `<` + payload + `>` with no length prefix and no checksum.
//! The payload must not contain either delimiter byte; resynchronizing on
//! the next start marker is the only recovery mechanism after corruption.
//! Framing knows nothing about message semantics.

use std::borrow::Cow;
use std::io::Read;

use crate::constants::{END_MARKER, MAX_FRAME_PAYLOAD, START_MARKER};
use crate::error::FramingError;

/// A whole decoded message exchanged with the peer.
///
/// The payload is guaranteed free of unescaped delimiter bytes: `encode`
/// rejects them and `decode` never includes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Raw payload bytes, delimiters excluded
    pub payload: Vec<u8>,
}

impl Message {
    /// View the payload as text, replacing invalid UTF-8
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Whether the payload contains the given token as a substring
    #[must_use]
    pub fn contains_token(&self, token: &str) -> bool {
        self.text().contains(token)
    }
}

/// Wrap a payload between the start and end markers.
///
/// Fails with [`FramingError::IllegalByte`] if the payload itself contains
/// either marker value, rather than silently corrupting the frame.
pub fn encode(payload: &[u8]) -> Result<Vec<u8>, FramingError> {
    if let Some(&bad) = payload.iter().find(|&&b| b == START_MARKER || b == END_MARKER) {
        return Err(FramingError::IllegalByte(bad));
    }

    let mut frame = Vec::with_capacity(payload.len() + 2);
    frame.push(START_MARKER);
    frame.extend_from_slice(payload);
    frame.push(END_MARKER);
    Ok(frame)
}

/// Decoder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Discarding noise until a start marker appears
    Seeking,
    /// Accumulating payload bytes until the end marker
    Accumulating,
}

/// Incremental frame decoder.
///
/// Bytes are pushed one at a time so the caller can interleave decoding
/// with transport reads that may stall or time out without losing a
/// partially received frame.
#[derive(Debug)]
pub struct FrameDecoder {
    state: DecodeState,
    payload: Vec<u8>,
}

impl FrameDecoder {
    /// Create a decoder in the seeking state
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: DecodeState::Seeking,
            payload: Vec::new(),
        }
    }

    /// Feed one byte from the transport.
    ///
    /// Returns `Ok(Some(message))` when the byte completes a frame,
    /// `Ok(None)` while a frame is still in progress or noise is being
    /// skipped. A payload growing past [`MAX_FRAME_PAYLOAD`] fails with
    /// [`FramingError::FrameTooLarge`]; the decoder then drops the frame
    /// and resynchronizes on the next start marker.
    pub fn push(&mut self, byte: u8) -> Result<Option<Message>, FramingError> {
        match self.state {
            DecodeState::Seeking => {
                if byte == START_MARKER {
                    self.state = DecodeState::Accumulating;
                    self.payload.clear();
                }
                Ok(None)
            }
            DecodeState::Accumulating => match byte {
                END_MARKER => {
                    self.state = DecodeState::Seeking;
                    let payload = std::mem::take(&mut self.payload);
                    Ok(Some(Message { payload }))
                }
                // A start marker mid-payload is line noise, not a new frame
                START_MARKER => Ok(None),
                byte => {
                    if self.payload.len() >= MAX_FRAME_PAYLOAD {
                        self.state = DecodeState::Seeking;
                        self.payload.clear();
                        return Err(FramingError::FrameTooLarge);
                    }
                    self.payload.push(byte);
                    Ok(None)
                }
            },
        }
    }

    /// Discard any partial frame and return to seeking
    pub fn reset(&mut self) {
        self.state = DecodeState::Seeking;
        self.payload.clear();
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read bytes from `reader` until one whole frame has been decoded.
///
/// All bytes preceding the start marker are silently discarded. Blocks
/// until a complete frame is available or the underlying read fails;
/// end-of-stream mid-frame surfaces as [`FramingError::Io`] with kind
/// `UnexpectedEof`.
pub fn decode<R: Read>(reader: &mut R) -> Result<Message, FramingError> {
    let mut decoder = FrameDecoder::new();
    let mut byte = [0u8; 1];

    loop {
        reader.read_exact(&mut byte)?;
        if let Some(message) = decoder.push(byte[0])? {
            return Ok(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_ignores_mid_payload_start_marker() {
        let mut decoder = FrameDecoder::new();
        let mut out = None;
        for &b in b"<ab<cd>" {
            if let Some(msg) = decoder.push(b).unwrap() {
                out = Some(msg);
            }
        }
        assert_eq!(out.unwrap().payload, b"abcd");
    }

    #[test]
    fn decoder_survives_split_frames() {
        let mut decoder = FrameDecoder::new();
        for &b in b"<par" {
            assert!(decoder.push(b).unwrap().is_none());
        }
        // Transport stalls here; decoder keeps the partial payload
        let mut out = None;
        for &b in b"tial>" {
            if let Some(msg) = decoder.push(b).unwrap() {
                out = Some(msg);
            }
        }
        assert_eq!(out.unwrap().payload, b"partial");
    }

    #[test]
    fn decoder_resyncs_after_oversized_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.push(START_MARKER).unwrap();
        for _ in 0..MAX_FRAME_PAYLOAD {
            decoder.push(b'x').unwrap();
        }
        match decoder.push(b'x') {
            Err(FramingError::FrameTooLarge) => {}
            other => panic!("expected FrameTooLarge, got {other:?}"),
        }

        // Next well-formed frame decodes normally
        let mut out = None;
        for &b in b"junk<ok>" {
            if let Some(msg) = decoder.push(b).unwrap() {
                out = Some(msg);
            }
        }
        assert_eq!(out.unwrap().payload, b"ok");
    }
}
