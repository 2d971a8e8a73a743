//! Stereo face tracking core.
//!
//! This library provides the two-sided real-time pipeline behind a
//! two-camera face tracker driving an embedded actuator controller:
//! - A framed, error-tolerant serial protocol (`<` payload `>`) for
//!   exchanging short text commands and telemetry over an unreliable
//!   byte stream, with handshake and resynchronization.
//! - A stereo triangulation engine converting two per-camera pixel
//!   offsets into a distance/angle estimate, with explicit handling of
//!   degenerate geometry (parallel rays, singular rig-offset correction).
//! - A tracking loop orchestrating detection results, triangulation,
//!   presence hysteresis, and telemetry sends.
//!
//! Face detection and display are external collaborators injected through
//! the [`tracking::DetectionSource`] and [`tracking::TelemetryDisplay`]
//! traits.
//!
//! # Examples
//!
//! ```no_run
//! use face_tracker::config::Config;
//! use face_tracker::link::SerialLink;
//! use face_tracker::tracking::{CameraSide, Detection, DetectionSource, NullDisplay, TrackingLoop};
//!
//! struct CenteredFace;
//!
//! impl DetectionSource for CenteredFace {
//!     fn detect(&mut self, _side: CameraSide) -> Detection {
//!         Detection::at(0.0, 0.0)
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! config.validate()?;
//!
//! let link = SerialLink::connect(&config.link)?;
//!
//! let mut tracker = TrackingLoop::new(
//!     CenteredFace,
//!     NullDisplay,
//!     config.geometry.stereo_geometry(),
//!     config.tracking.max_empty_frames,
//! );
//! tracker.attach_link(link);
//!
//! let outcome = tracker.cycle();
//! println!("distance: {}", outcome.estimate.distance);
//! # Ok(())
//! # }
//! ```

/// Byte-level wire framing (delimiters, resynchronization, size cap)
pub mod framing;

/// Serial link ownership, handshake, and the receive loop
pub mod link;

/// Stereo triangulation engine with degenerate-case policy
pub mod triangulation;

/// Per-cycle tracking orchestration and presence hysteresis
pub mod tracking;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
