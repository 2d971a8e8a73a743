//! Serial link to the embedded actuator controller.
//!
//! The link owns the transport exclusively. A dedicated reader thread
//! decodes frames and hands them over a single-producer/single-consumer
//! channel, so a stalled peer can never freeze the tracking cycle. The
//! connection handshake discards every frame until the peer announces
//! itself with the "connected" token, bounded by an explicit timeout.
//! There is no automatic reconnect: once the transport is lost the link
//! stays Disconnected until the caller establishes a fresh one.

use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serialport::SerialPort as _;

use crate::config::LinkConfig;
use crate::constants::HANDSHAKE_TOKEN;
use crate::error::{ConnectError, LinkError};
use crate::framing::{self, FrameDecoder, Message};

/// How often the reader thread wakes to check for shutdown when the
/// transport is idle
const READER_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Decoded frames buffered between the reader thread and the consumer
const FRAME_CHANNEL_BOUND: usize = 32;

/// Connection state of the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No transport, or the transport was lost
    Disconnected,
    /// Transport open, waiting for the peer's handshake token
    Handshaking,
    /// Handshake complete; application traffic is valid
    Connected,
}

/// Callback notified after successful link activity.
///
/// Decouples the link from the display layer: the UI registers an observer
/// instead of being called into directly.
pub trait LinkObserver: Send {
    /// A payload was framed and written to the transport
    fn frame_sent(&mut self, _payload: &[u8]) {}

    /// A whole frame arrived from the peer
    fn frame_received(&mut self, _message: &Message) {}
}

/// Owns the serial transport and exchanges whole decoded messages with
/// the embedded peer.
pub struct SerialLink {
    writer: Box<dyn Write + Send>,
    frames: Receiver<Message>,
    state: LinkState,
    shutdown: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    observer: Option<Box<dyn LinkObserver>>,
}

impl SerialLink {
    /// Open the configured serial port and perform the handshake.
    ///
    /// Fails with [`ConnectError::PortUnavailable`] if the port cannot be
    /// opened (retryable with different configuration) and with
    /// [`ConnectError::HandshakeTimeout`] if the peer never sends the
    /// "connected" token within the configured window.
    pub fn connect(config: &LinkConfig) -> Result<Self, ConnectError> {
        let port_unavailable = |source: serialport::Error| ConnectError::PortUnavailable {
            port: config.port.clone(),
            source,
        };

        let reader = serialport::new(&config.port, config.baud_rate)
            .timeout(READER_POLL_INTERVAL)
            .open()
            .map_err(&port_unavailable)?;

        let mut writer = reader.try_clone().map_err(&port_unavailable)?;
        writer
            .set_timeout(config.write_timeout())
            .map_err(&port_unavailable)?;

        info!(
            "opened serial port {} at {} baud",
            config.port, config.baud_rate
        );
        Self::establish(Box::new(reader), Box::new(writer), config.handshake_timeout())
    }

    /// Build a link over an arbitrary byte transport.
    ///
    /// Used by tests and simulators to run against an in-memory peer. The
    /// reader must eventually return `Ok(0)`, an error, or time out with
    /// `ErrorKind::TimedOut`, otherwise shutdown cannot interrupt it.
    pub fn from_transport<R, W>(
        reader: R,
        writer: W,
        handshake_timeout: Duration,
    ) -> Result<Self, ConnectError>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        Self::establish(Box::new(reader), Box::new(writer), handshake_timeout)
    }

    fn establish(
        reader: Box<dyn Read + Send>,
        writer: Box<dyn Write + Send>,
        handshake_timeout: Duration,
    ) -> Result<Self, ConnectError> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let (frame_tx, frame_rx) = mpsc::sync_channel(FRAME_CHANNEL_BOUND);

        let reader_shutdown = Arc::clone(&shutdown);
        let handle = std::thread::Builder::new()
            .name("serial-reader".into())
            .spawn(move || reader_loop(reader, &frame_tx, &reader_shutdown))
            .map_err(|_| ConnectError::TransportLost)?;

        let mut link = Self {
            writer,
            frames: frame_rx,
            state: LinkState::Handshaking,
            shutdown,
            reader: Some(handle),
            observer: None,
        };

        link.handshake(handshake_timeout)?;
        link.state = LinkState::Connected;
        Ok(link)
    }

    /// Poll decoded frames, discarding everything until one carries the
    /// handshake token
    fn handshake(&mut self, timeout: Duration) -> Result<(), ConnectError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or(ConnectError::HandshakeTimeout(timeout))?;

            match self.frames.recv_timeout(remaining) {
                Ok(message) if message.contains_token(HANDSHAKE_TOKEN) => {
                    info!("peer handshake complete");
                    return Ok(());
                }
                Ok(message) => {
                    debug!("discarding pre-handshake frame: {}", message.text());
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(ConnectError::HandshakeTimeout(timeout));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(ConnectError::TransportLost);
                }
            }
        }
    }

    /// Current connection state
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Whether application traffic may be sent
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Register the display-update observer
    pub fn set_observer(&mut self, observer: Box<dyn LinkObserver>) {
        self.observer = Some(observer);
    }

    /// Frame a payload and write it to the transport.
    ///
    /// Only valid in the Connected state; otherwise fails with
    /// [`LinkError::NotConnected`] without touching the transport. A write
    /// failure (including the bounded write timeout expiring) drops the
    /// link back to Disconnected.
    pub fn send(&mut self, payload: &[u8]) -> Result<(), LinkError> {
        if self.state != LinkState::Connected {
            return Err(LinkError::NotConnected);
        }

        let frame = framing::encode(payload)?;
        if let Err(e) = self
            .writer
            .write_all(&frame)
            .and_then(|()| self.writer.flush())
        {
            warn!("transport write failed: {e}");
            self.state = LinkState::Disconnected;
            return Err(LinkError::Io(e));
        }

        if let Some(observer) = self.observer.as_mut() {
            observer.frame_sent(payload);
        }
        Ok(())
    }

    /// Wait for the next decoded frame from the peer.
    ///
    /// Returns [`LinkError::Timeout`] if none arrives in time and
    /// [`LinkError::TransportLost`] (transitioning to Disconnected) if the
    /// reader thread has ended.
    pub fn receive(&mut self, timeout: Duration) -> Result<Message, LinkError> {
        match self.frames.recv_timeout(timeout) {
            Ok(message) => {
                if let Some(observer) = self.observer.as_mut() {
                    observer.frame_received(&message);
                }
                Ok(message)
            }
            Err(RecvTimeoutError::Timeout) => Err(LinkError::Timeout),
            Err(RecvTimeoutError::Disconnected) => {
                self.state = LinkState::Disconnected;
                Err(LinkError::TransportLost)
            }
        }
    }

    /// Drain one already-buffered frame without blocking
    pub fn try_receive(&mut self) -> Result<Option<Message>, LinkError> {
        match self.frames.try_recv() {
            Ok(message) => {
                if let Some(observer) = self.observer.as_mut() {
                    observer.frame_received(&message);
                }
                Ok(Some(message))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.state = LinkState::Disconnected;
                Err(LinkError::TransportLost)
            }
        }
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // A chatty peer can leave the reader blocked sending into a full
        // channel, where it never re-checks the shutdown flag. Dropping
        // the receiver first makes that send fail so the join cannot hang.
        let (_, disconnected) = mpsc::sync_channel(0);
        drop(std::mem::replace(&mut self.frames, disconnected));
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Reader thread body: pull bytes, feed the incremental decoder, push
/// whole messages to the consumer. Exits on transport end/failure, on
/// shutdown, or when the consumer goes away.
fn reader_loop(mut reader: Box<dyn Read + Send>, frames: &SyncSender<Message>, shutdown: &AtomicBool) {
    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; 256];

    while !shutdown.load(Ordering::Relaxed) {
        let n = match reader.read(&mut buf) {
            Ok(0) => {
                debug!("transport reached end of stream");
                return;
            }
            Ok(n) => n,
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {
                continue;
            }
            Err(e) => {
                warn!("transport read failed: {e}");
                return;
            }
        };

        for &byte in &buf[..n] {
            match decoder.push(byte) {
                Ok(Some(message)) => {
                    if frames.send(message).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("dropping inbound frame: {e}"),
            }
        }
    }
}
