//! Constants used throughout the application

use std::time::Duration;

/// Frame start delimiter (`<`)
pub const START_MARKER: u8 = 0x3C;

/// Frame end delimiter (`>`)
pub const END_MARKER: u8 = 0x3E;

/// Maximum accepted frame payload length in bytes.
///
/// The wire format has no length prefix, so without a cap a missing end
/// marker would accumulate bytes forever. Oversized frames are dropped and
/// decoding resynchronizes on the next start marker.
pub const MAX_FRAME_PAYLOAD: usize = 1024;

/// Handshake token the embedded peer must send before application traffic
pub const HANDSHAKE_TOKEN: &str = "connected";

/// Default serial bit rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default time allowed for the peer to complete the handshake
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on a single transport write
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// Default focal length in the calibration's linear unit (inches)
pub const DEFAULT_FOCAL_LENGTH: f64 = 100.0;

/// Default baseline between the two camera viewpoints (inches)
pub const DEFAULT_BASELINE: f64 = 4.0;

/// Default lateral offset between camera pair center and actuator pivot (inches)
pub const DEFAULT_RIG_OFFSET: f64 = 3.0;

/// Sentinel distance reported when the rays are parallel
pub const DISTANCE_UNBOUNDED: f64 = f64::MAX;

/// Bearing reported for an object dead-center in one camera (radians)
pub const BORESIGHT_BEARING: f64 = std::f64::consts::FRAC_PI_2;

/// Default number of consecutive empty cycles tolerated before an object
/// is considered absent
pub const DEFAULT_MAX_EMPTY_FRAMES: u32 = 50;
