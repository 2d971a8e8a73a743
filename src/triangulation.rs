//! Stereo triangulation engine.
//!
//! Converts the per-camera horizontal offsets of a detected object into a
//! polar estimate (distance, angle) relative to the actuator rig. The
//! computation is pure: no hidden state, no side effects, and degenerate
//! geometry is reported through validity flags instead of NaN or infinity.

use crate::constants::{
    BORESIGHT_BEARING, DEFAULT_BASELINE, DEFAULT_FOCAL_LENGTH, DEFAULT_RIG_OFFSET,
    DISTANCE_UNBOUNDED,
};

/// Physical calibration of the camera pair and actuator rig.
///
/// All lengths share one linear unit; computed distances come out in the
/// same unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoGeometry {
    /// Focal length of the (matched) cameras
    pub focal_length: f64,
    /// Separation between the two camera viewpoints
    pub baseline: f64,
    /// Lateral offset between the camera pair's center and the actuator pivot
    pub rig_offset: f64,
}

impl Default for StereoGeometry {
    fn default() -> Self {
        Self {
            focal_length: DEFAULT_FOCAL_LENGTH,
            baseline: DEFAULT_BASELINE,
            rig_offset: DEFAULT_RIG_OFFSET,
        }
    }
}

/// A polar position estimate, immutable once computed.
///
/// Distance and angle can degenerate independently: parallel rays leave the
/// distance unbounded while the angle is still meaningful, and a distance
/// equal to the rig offset invalidates only the angle correction. Invalid
/// components carry defined sentinels, never NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Distance from the camera pair, in calibration units; sign preserved
    pub distance: f64,
    /// Angle from boresight, in radians, corrected to the actuator pivot
    pub angle: f64,
    /// False when the rays are parallel (unbounded distance sentinel)
    pub distance_valid: bool,
    /// False when the rig-offset correction would divide by zero
    pub angle_valid: bool,
}

impl Estimate {
    /// Neutral estimate used before any valid geometry has been observed:
    /// unbounded distance, boresight angle, both components invalid
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            distance: DISTANCE_UNBOUNDED,
            angle: BORESIGHT_BEARING,
            distance_valid: false,
            angle_valid: false,
        }
    }

    /// Whether both components carry freshly computed values
    #[must_use]
    pub fn valid(&self) -> bool {
        self.distance_valid && self.angle_valid
    }
}

/// Bearing from one camera's boresight to the object, in radians.
///
/// A zero offset means the object is dead-center, which is defined as the
/// boresight value `π/2` in this convention rather than an approximation
/// of the limit.
#[must_use]
pub fn bearing(focal_length: f64, offset: f64) -> f64 {
    if offset == 0.0 {
        BORESIGHT_BEARING
    } else {
        (focal_length / offset).atan()
    }
}

/// Triangulate one estimate from the two calibrated horizontal offsets.
///
/// Distance is `baseline * focal_length / (right - left)`; equal offsets
/// are parallel rays and yield the unbounded sentinel with
/// `distance_valid = false`. The averaged per-eye bearing is then corrected
/// for the lateral offset between camera rig and actuator rig; when the
/// distance equals that offset the correction is singular and the estimate
/// reports `angle_valid = false`, carrying the uncorrected average bearing.
#[must_use]
pub fn estimate(geometry: &StereoGeometry, left_offset: f64, right_offset: f64) -> Estimate {
    let (distance, distance_valid) = if left_offset == right_offset {
        (DISTANCE_UNBOUNDED, false)
    } else {
        (
            geometry.baseline * geometry.focal_length / (right_offset - left_offset),
            true,
        )
    };

    let average_bearing = (bearing(geometry.focal_length, left_offset)
        + bearing(geometry.focal_length, right_offset))
        / 2.0;

    let pivot_reach = distance - geometry.rig_offset;
    let (angle, angle_valid) = if pivot_reach == 0.0 {
        (average_bearing, false)
    } else {
        (
            (distance / pivot_reach * average_bearing.tan()).atan(),
            true,
        )
    };

    Estimate {
        distance,
        angle,
        distance_valid,
        angle_valid,
    }
}
