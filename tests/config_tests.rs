//! Configuration loading and validation tests

use face_tracker::config::Config;
use face_tracker::Error;

#[test]
fn test_default_config_validates() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.link.baud_rate, 115_200);
    assert_eq!(config.tracking.max_empty_frames, 50);
}

#[test]
fn test_invalid_values_are_rejected() {
    let mut config = Config::default();
    config.link.baud_rate = 0;
    match config.validate() {
        Err(Error::Config(msg)) => assert!(msg.contains("Baud rate")),
        other => panic!("expected Config error, got {other:?}"),
    }

    let mut config = Config::default();
    config.link.port.clear();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.geometry.focal_length = -1.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.geometry.baseline = 0.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.link.handshake_timeout_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_yaml_file_round_trip() {
    let path = std::env::temp_dir().join("face-tracker-config-round-trip.yaml");

    let mut config = Config::default();
    config.link.port = "COM7".to_string();
    config.geometry.baseline = 6.5;
    config.tracking.max_empty_frames = 12;
    config.to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.link.port, "COM7");
    assert_eq!(loaded.geometry.baseline, 6.5);
    assert_eq!(loaded.tracking.max_empty_frames, 12);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_partial_yaml_uses_defaults() {
    let yaml = "link:\n  port: /dev/ttyUSB1\n  baud_rate: 9600\n  handshake_timeout_ms: 1000\n  write_timeout_ms: 200\n";
    let path = std::env::temp_dir().join("face-tracker-config-partial.yaml");
    std::fs::write(&path, yaml).unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.link.port, "/dev/ttyUSB1");
    assert_eq!(config.link.baud_rate, 9600);
    // Sections not present in the file fall back to defaults
    assert_eq!(config.geometry.focal_length, 100.0);
    assert_eq!(config.tracking.max_empty_frames, 50);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_missing_config_file_is_an_io_error() {
    match Config::from_file("/nonexistent/path/config.yaml") {
        Err(Error::Io(_)) => {}
        other => panic!("expected Io error, got {other:?}"),
    }
}
