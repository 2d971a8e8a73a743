//! Configuration management for the tracker

use crate::constants::{
    DEFAULT_BASELINE, DEFAULT_BAUD_RATE, DEFAULT_FOCAL_LENGTH, DEFAULT_HANDSHAKE_TIMEOUT,
    DEFAULT_MAX_EMPTY_FRAMES, DEFAULT_RIG_OFFSET, DEFAULT_WRITE_TIMEOUT,
};
use crate::triangulation::StereoGeometry;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial link configuration
    pub link: LinkConfig,

    /// Camera pair and actuator rig calibration
    pub geometry: GeometryConfig,

    /// Tracking loop configuration
    pub tracking: TrackingConfig,
}

/// Serial link parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Transport endpoint identifier (e.g. `/dev/ttyACM0`, `COM3`)
    pub port: String,

    /// Bits-per-second framing rate
    pub baud_rate: u32,

    /// Time allowed for the peer's handshake, in milliseconds
    pub handshake_timeout_ms: u64,

    /// Bound on a single transport write, in milliseconds
    pub write_timeout_ms: u64,
}

impl LinkConfig {
    /// Handshake timeout as a duration
    #[must_use]
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    /// Write timeout as a duration
    #[must_use]
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

/// Physical calibration parameters, all in one linear unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Camera focal length
    pub focal_length: f64,

    /// Separation between the two camera viewpoints
    pub baseline: f64,

    /// Lateral offset between camera pair center and actuator pivot
    pub rig_offset: f64,
}

impl GeometryConfig {
    /// Convert into the triangulation engine's parameter struct
    #[must_use]
    pub fn stereo_geometry(&self) -> StereoGeometry {
        StereoGeometry {
            focal_length: self.focal_length,
            baseline: self.baseline,
            rig_offset: self.rig_offset,
        }
    }
}

/// Tracking loop parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Consecutive empty cycles tolerated before the object is absent
    pub max_empty_frames: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            geometry: GeometryConfig::default(),
            tracking: TrackingConfig::default(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            handshake_timeout_ms: u64::try_from(DEFAULT_HANDSHAKE_TIMEOUT.as_millis())
                .unwrap_or(10_000),
            write_timeout_ms: u64::try_from(DEFAULT_WRITE_TIMEOUT.as_millis()).unwrap_or(500),
        }
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            focal_length: DEFAULT_FOCAL_LENGTH,
            baseline: DEFAULT_BASELINE,
            rig_offset: DEFAULT_RIG_OFFSET,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            max_empty_frames: DEFAULT_MAX_EMPTY_FRAMES,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.link.port.is_empty() {
            return Err(Error::Config("Serial port must not be empty".to_string()));
        }
        if self.link.baud_rate == 0 {
            return Err(Error::Config(
                "Baud rate must be greater than 0".to_string(),
            ));
        }
        if self.link.handshake_timeout_ms == 0 {
            return Err(Error::Config(
                "Handshake timeout must be greater than 0".to_string(),
            ));
        }
        if self.link.write_timeout_ms == 0 {
            return Err(Error::Config(
                "Write timeout must be greater than 0".to_string(),
            ));
        }
        if self.geometry.focal_length <= 0.0 {
            return Err(Error::Config(
                "Focal length must be positive".to_string(),
            ));
        }
        if self.geometry.baseline <= 0.0 {
            return Err(Error::Config("Baseline must be positive".to_string()));
        }
        if !self.geometry.rig_offset.is_finite() {
            return Err(Error::Config("Rig offset must be finite".to_string()));
        }

        Ok(())
    }
}
