//! Error types for the face tracking library.

use std::time::Duration;
use thiserror::Error;

use crate::constants::MAX_FRAME_PAYLOAD;

/// Errors produced while encoding or decoding wire frames
#[derive(Error, Debug)]
pub enum FramingError {
    /// Payload contains a reserved delimiter byte and cannot be framed
    #[error("payload contains reserved delimiter byte 0x{0:02X}")]
    IllegalByte(u8),

    /// Incoming frame exceeded the accepted payload bound
    #[error("frame payload exceeds {MAX_FRAME_PAYLOAD} bytes")]
    FrameTooLarge,

    /// Underlying transport read failed (includes EOF mid-frame)
    #[error("transport read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced while establishing the serial link
#[derive(Error, Debug)]
pub enum ConnectError {
    /// The serial port could not be opened; the link stays Disconnected
    /// and connect may be retried with different configuration
    #[error("cannot open serial port {port}: {source}")]
    PortUnavailable {
        /// Port identifier that failed to open
        port: String,
        /// Underlying serial layer error
        #[source]
        source: serialport::Error,
    },

    /// The peer never sent the handshake token within the allowed time
    #[error("handshake timed out after {0:?} without \"connected\" token")]
    HandshakeTimeout(Duration),

    /// The transport failed while waiting for the handshake token
    #[error("transport lost during handshake")]
    TransportLost,
}

/// Errors produced on an established link
#[derive(Error, Debug)]
pub enum LinkError {
    /// Send attempted while the link is not in the Connected state;
    /// local and non-fatal, nothing was written to the transport
    #[error("link is not connected")]
    NotConnected,

    /// The transport failed; the link transitions back to Disconnected
    /// and must be re-established by an explicit connect
    #[error("transport lost")]
    TransportLost,

    /// No frame arrived within the requested time
    #[error("timed out waiting for a frame")]
    Timeout,

    /// Outgoing payload could not be framed
    #[error("frame encoding failed: {0}")]
    Framing(#[from] FramingError),

    /// Transport write failed
    #[error("transport write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Wire framing failed
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Link establishment failed
    #[error("connect error: {0}")]
    Connect(#[from] ConnectError),

    /// Link operation failed
    #[error("link error: {0}")]
    Link(#[from] LinkError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
