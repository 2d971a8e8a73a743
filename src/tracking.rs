//! Per-cycle tracking orchestration.
//!
//! Each cycle consumes one detection per camera, triangulates an estimate,
//! applies presence hysteresis, and (when the link is connected) streams a
//! presence indicator followed by the telemetry string to the actuator
//! controller. Detection and display are external collaborators injected
//! through traits; the loop owns all of its state explicitly, with no
//! process-wide singletons.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use crate::error::LinkError;
use crate::link::SerialLink;
use crate::triangulation::{self, Estimate, StereoGeometry};

/// Which camera of the pair a detection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraSide {
    /// Left camera
    Left,
    /// Right camera
    Right,
}

/// One detection result for one camera and one frame.
///
/// Offsets are the object center's distance from image center in calibrated
/// units (already divided by the per-axis calibration constant). Produced
/// fresh every frame and never retained.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Detection {
    /// Whether an object was detected in this frame
    pub found: bool,
    /// Calibrated horizontal offset from image center
    pub offset_x: f64,
    /// Calibrated vertical offset from image center
    pub offset_y: f64,
}

impl Detection {
    /// A frame with no detected object
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A detection at the given calibrated offsets
    #[must_use]
    pub fn at(offset_x: f64, offset_y: f64) -> Self {
        Self {
            found: true,
            offset_x,
            offset_y,
        }
    }
}

/// One synchronized detection pair, consumed immediately by the cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingSample {
    /// Left camera detection
    pub left: Detection,
    /// Right camera detection
    pub right: Detection,
}

/// Supplies one detection per camera per cycle (external collaborator)
pub trait DetectionSource {
    /// Run detection for the given camera's current frame
    fn detect(&mut self, side: CameraSide) -> Detection;
}

/// Receives presence and telemetry updates for presentation only
pub trait TelemetryDisplay {
    /// Object presence changed or was re-asserted this cycle
    fn on_presence(&mut self, _present: bool) {}

    /// A new estimate was computed this cycle
    fn on_telemetry(&mut self, _distance: f64, _angle: f64) {}
}

/// No-op display for headless use
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplay;

impl TelemetryDisplay for NullDisplay {}

/// Presence hysteresis: once an object has been seen, tracking stays
/// "present" for up to `max_empty_frames` consecutive empty cycles before
/// flipping to absent.
#[derive(Debug, Clone, Copy)]
pub struct TrackingState {
    consecutive_empty_frames: u32,
    max_empty_frames: u32,
    object_present: bool,
}

impl TrackingState {
    /// Create a state tolerating the given number of empty cycles
    #[must_use]
    pub fn new(max_empty_frames: u32) -> Self {
        Self {
            consecutive_empty_frames: 0,
            max_empty_frames,
            object_present: false,
        }
    }

    /// Record one cycle's combined detection outcome
    pub fn observe(&mut self, found: bool) {
        if found {
            self.consecutive_empty_frames = 0;
            self.object_present = true;
        } else if self.object_present {
            self.consecutive_empty_frames += 1;
            if self.consecutive_empty_frames > self.max_empty_frames {
                self.object_present = false;
            }
        }
    }

    /// Whether an object is currently considered present
    #[must_use]
    pub fn object_present(&self) -> bool {
        self.object_present
    }

    /// Empty cycles observed since the object was last seen
    #[must_use]
    pub fn consecutive_empty_frames(&self) -> u32 {
        self.consecutive_empty_frames
    }
}

/// Result of one tracking cycle, returned to the orchestrating caller
#[derive(Debug)]
pub struct CycleOutcome {
    /// The estimate used this cycle (invalid components carry the previous
    /// valid values)
    pub estimate: Estimate,
    /// Presence after hysteresis
    pub object_present: bool,
    /// Whether presence and telemetry were sent to the peer
    pub sent: bool,
    /// Link failure observed while sending, if any; never panics the cycle
    pub link_error: Option<LinkError>,
}

/// Drives capture → triangulate → send → display, one cycle at a time
pub struct TrackingLoop<S, D> {
    source: S,
    display: D,
    geometry: StereoGeometry,
    state: TrackingState,
    link: Option<SerialLink>,
    last_estimate: Estimate,
    running: Arc<AtomicBool>,
}

impl<S: DetectionSource, D: TelemetryDisplay> TrackingLoop<S, D> {
    /// Create a loop with no link attached
    pub fn new(source: S, display: D, geometry: StereoGeometry, max_empty_frames: u32) -> Self {
        Self {
            source,
            display,
            geometry,
            state: TrackingState::new(max_empty_frames),
            link: None,
            last_estimate: Estimate::neutral(),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attach an established link; telemetry flows once it is Connected
    pub fn attach_link(&mut self, link: SerialLink) {
        self.link = Some(link);
    }

    /// Detach and return the link, leaving the loop display-only
    pub fn take_link(&mut self) -> Option<SerialLink> {
        self.link.take()
    }

    /// Borrow the attached link, e.g. to drain telemetry acks
    pub fn link_mut(&mut self) -> Option<&mut SerialLink> {
        self.link.as_mut()
    }

    /// Current hysteresis state
    #[must_use]
    pub fn state(&self) -> &TrackingState {
        &self.state
    }

    /// The most recent per-component valid estimate
    #[must_use]
    pub fn last_estimate(&self) -> Estimate {
        self.last_estimate
    }

    /// Shared run flag. `run` raises it when it starts; clearing it from
    /// another thread stops the loop within one in-flight cycle without
    /// closing the transport, so resuming needs no re-handshake
    #[must_use]
    pub fn run_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Run one cycle from the detection source
    pub fn cycle(&mut self) -> CycleOutcome {
        let sample = TrackingSample {
            left: self.source.detect(CameraSide::Left),
            right: self.source.detect(CameraSide::Right),
        };
        self.cycle_with(sample)
    }

    /// Run one cycle from an already-collected sample
    pub fn cycle_with(&mut self, sample: TrackingSample) -> CycleOutcome {
        let found = sample.left.found || sample.right.found;
        self.state.observe(found);

        // A side with no detection contributes a centered offset for this
        // cycle; calibration state is never reset by a miss.
        let left_offset = if sample.left.found { sample.left.offset_x } else { 0.0 };
        let right_offset = if sample.right.found { sample.right.offset_x } else { 0.0 };

        let raw = triangulation::estimate(&self.geometry, left_offset, right_offset);
        let mut estimate = raw;
        if !raw.distance_valid {
            estimate.distance = self.last_estimate.distance;
        }
        if !raw.angle_valid {
            estimate.angle = self.last_estimate.angle;
        }
        self.last_estimate = estimate;

        let (sent, link_error) = self.send_cycle_messages(estimate);

        self.display.on_presence(self.state.object_present());
        self.display.on_telemetry(estimate.distance, estimate.angle);

        CycleOutcome {
            estimate,
            object_present: self.state.object_present(),
            sent,
            link_error,
        }
    }

    /// Send the presence indicator then the telemetry string, in that
    /// order, on the single ordered transport
    fn send_cycle_messages(&mut self, estimate: Estimate) -> (bool, Option<LinkError>) {
        let Some(link) = self.link.as_mut().filter(|l| l.is_connected()) else {
            return (false, None);
        };

        let presence: &[u8] = if self.state.object_present() { b"Y" } else { b"N" };
        let telemetry = format!("{},{}", estimate.distance, estimate.angle);

        match link
            .send(presence)
            .and_then(|()| link.send(telemetry.as_bytes()))
        {
            Ok(()) => (true, None),
            Err(e) => {
                warn!("telemetry send failed: {e}");
                (false, Some(e))
            }
        }
    }

    /// Drive cycles until the run flag is cleared
    pub fn run(&mut self) {
        self.running.store(true, Ordering::Relaxed);
        while self.running.load(Ordering::Relaxed) {
            let outcome = self.cycle();
            debug!(
                "cycle: present={} distance={} angle={} sent={}",
                outcome.object_present, outcome.estimate.distance, outcome.estimate.angle, outcome.sent
            );
        }
    }
}
