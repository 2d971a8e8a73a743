//! Hardware smoke-check binary: connects the serial link and drives the
//! tracking loop from a synthetic detection sweep.

use anyhow::Result;
use clap::Parser;
use face_tracker::config::Config;
use face_tracker::link::SerialLink;
use face_tracker::tracking::{CameraSide, Detection, DetectionSource, TelemetryDisplay, TrackingLoop};
use log::info;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial port of the actuator controller
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Number of synthetic tracking cycles to drive
    #[arg(long, default_value = "100")]
    cycles: u32,

    /// Delay between cycles in milliseconds
    #[arg(long, default_value = "50")]
    interval_ms: u64,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

/// Deterministic detection sweep: the synthetic face drifts sideways so
/// the actuator visibly follows while disparity (and thus distance) stays
/// well away from the degenerate cases.
struct SweepSource {
    step: u32,
}

impl DetectionSource for SweepSource {
    fn detect(&mut self, side: CameraSide) -> Detection {
        if side == CameraSide::Left {
            self.step = self.step.wrapping_add(1);
        }
        let drift = 3.0 * (f64::from(self.step) * 0.05).sin();
        match side {
            CameraSide::Left => Detection::at(2.0 + drift, 0.0),
            CameraSide::Right => Detection::at(-2.0 + drift, 0.0),
        }
    }
}

/// Prints telemetry the way the original rig showed it on its LCDs
struct ConsoleDisplay;

impl TelemetryDisplay for ConsoleDisplay {
    fn on_presence(&mut self, present: bool) {
        log::debug!("presence: {}", if present { "Y" } else { "N" });
    }

    fn on_telemetry(&mut self, distance: f64, angle: f64) {
        info!("distance: {distance:.2}  angle: {angle:.4} rad");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {config_path}");
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(port) = args.port {
        config.link.port = port;
    }
    if let Some(baud) = args.baud {
        config.link.baud_rate = baud;
    }
    config.validate()?;

    info!(
        "connecting to {} at {} baud",
        config.link.port, config.link.baud_rate
    );
    let link = SerialLink::connect(&config.link)?;
    info!("link connected");

    let mut tracker = TrackingLoop::new(
        SweepSource { step: 0 },
        ConsoleDisplay,
        config.geometry.stereo_geometry(),
        config.tracking.max_empty_frames,
    );
    tracker.attach_link(link);

    let mut sent = 0u32;
    for _ in 0..args.cycles {
        let outcome = tracker.cycle();
        if outcome.sent {
            sent += 1;
        }
        if let Some(e) = outcome.link_error {
            log::warn!("cycle stopped sending: {e}");
            break;
        }

        // Show whatever the controller echoes back
        if let Some(link) = tracker.link_mut() {
            while let Ok(Some(ack)) = link.try_receive() {
                info!("peer: {}", ack.text());
            }
        }

        std::thread::sleep(Duration::from_millis(args.interval_ms));
    }

    info!("done: {sent}/{} cycles delivered", args.cycles);
    Ok(())
}
