//! Config file round trips

use framegraph::config::{EngineConfig, FaultPolicy, LoggingConfig, PipelineSettings};
use framegraph::Error;
use tempfile::TempDir;

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = EngineConfig {
        pipeline: PipelineSettings {
            frame_rate_hz: 0,
            fault_policy: FaultPolicy::IsolateEntry,
            command_capacity: 8,
            message_capacity: 32,
        },
        logging: LoggingConfig {
            filter: "debug".into(),
            directory: Some(dir.path().join("logs")),
            ..Default::default()
        },
    };

    config.save(&path).unwrap();
    assert!(path.exists());

    let loaded = EngineConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_saved_file_is_readable_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    EngineConfig::default().save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[pipeline]"));
    assert!(text.contains("fault_policy = \"abort_frame\""));
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let err = EngineConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_hand_written_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[pipeline]
frame_rate_hz = 15
fault_policy = "isolate_entry"

[logging]
filter = "warn"
"#,
    )
    .unwrap();

    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.pipeline.frame_rate_hz, 15);
    assert_eq!(config.pipeline.fault_policy, FaultPolicy::IsolateEntry);
    assert_eq!(
        config.pipeline.message_capacity,
        PipelineSettings::default().message_capacity
    );
    assert_eq!(config.logging.filter, "warn");
    assert_eq!(config.logging.directory, None);
}
