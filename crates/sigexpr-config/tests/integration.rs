//! Integration tests for sigexpr-config.
//!
//! File round trips and engines built from loaded configurations.

use sigexpr_config::{ConfigError, EngineConfig, ValidationError};
use sigexpr_core::Diagnostic;
use tempfile::TempDir;

#[test]
fn save_then_load_roundtrip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("engine.toml");

    let config = EngineConfig::default()
        .with_input_channels(2)
        .with_default_expression("v0 - v1")
        .with_diagnostic_capacity(8);
    config.save(&path).expect("save should create parent dirs");

    let loaded = EngineConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn load_missing_file_reports_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.toml");
    let err = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn loaded_engine_renders_and_reports() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("engine.toml");
    std::fs::write(
        &path,
        "input_channels = 2\ndefault_expression = \"v0 + v1\"\ndiagnostic_capacity = 4\n",
    )
    .unwrap();

    let config = EngineConfig::load(&path).unwrap();
    let mut engine = config.build().unwrap();

    let channels: [&[f64]; 2] = [&[1.0, 2.0], &[10.0, 20.0]];
    assert_eq!(engine.renderer.render_block(&channels, 2), vec![11.0, 22.0]);

    // Replacement beyond the configured inputs renders NaN and reports.
    engine.store.set("v5").unwrap();
    let out = engine.renderer.render_block(&channels, 2);
    assert!(out.iter().all(|v| v.is_nan()));
    assert!(matches!(
        engine.diagnostics.try_recv(),
        Some(Diagnostic::Evaluation { .. })
    ));
}

#[test]
fn invalid_file_fails_validation_on_build() {
    let config =
        EngineConfig::from_toml("input_channels = 2\ndefault_expression = \"v3\"").unwrap();
    match config.build() {
        Err(ConfigError::Validation(ValidationError::ChannelOutOfRange { channel, inputs })) => {
            assert_eq!(channel, 3);
            assert_eq!(inputs, 2);
        }
        other => panic!("expected channel range error, got {other:?}"),
    }
}
