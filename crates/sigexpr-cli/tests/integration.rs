//! Integration tests for sigexpr-cli.
//!
//! Invoke the built binary and check its output and the files it writes.

use std::process::Command;

use sigexpr_io::{WavSpec, read_wav_channels, write_wav_channels};
use tempfile::TempDir;

/// Helper to get the path to the `sigexpr` binary built by cargo.
fn sigexpr_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sigexpr"))
}

// ---------------------------------------------------------------------------
// General
// ---------------------------------------------------------------------------

#[test]
fn cli_help_lists_subcommands() {
    let output = sigexpr_bin().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("render"));
    assert!(stdout.contains("eval"));
    assert!(stdout.contains("check"));
}

#[test]
fn cli_version_works() {
    let output = sigexpr_bin().arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("sigexpr"));
}

// ---------------------------------------------------------------------------
// `sigexpr eval`
// ---------------------------------------------------------------------------

#[test]
fn cli_eval_with_bindings() {
    let output = sigexpr_bin()
        .args(["eval", "v0 + v1", "v0=1", "v1=10"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "11");
}

#[test]
fn cli_eval_leading_minus() {
    let output = sigexpr_bin()
        .args(["eval", "-2 ^ 2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "-4");
}

#[test]
fn cli_eval_unbound_variable_fails_with_nan() {
    let output = sigexpr_bin().args(["eval", "v9"]).output().unwrap();
    assert!(!output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "NaN");
    assert!(String::from_utf8_lossy(&output.stderr).contains("v9"));
}

// ---------------------------------------------------------------------------
// `sigexpr check`
// ---------------------------------------------------------------------------

#[test]
fn cli_check_lists_references() {
    let output = sigexpr_bin()
        .args(["check", "gain(v0) * sin(v5)"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("variables:   v0, v5"), "{stdout}");
    assert!(stdout.contains("functions:   gain"), "{stdout}");
    assert!(stdout.contains("warning: v5"), "{stdout}");
}

#[test]
fn cli_check_rejects_syntax_error() {
    let output = sigexpr_bin().args(["check", "v0 * (v1"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid expression"));
}

#[test]
fn cli_check_honours_config_limit() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("engine.toml");
    std::fs::write(&config, "max_expression_len = 4\n").unwrap();

    let output = sigexpr_bin()
        .args(["check", "v0 + v1", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("limit is 4"));
}

// ---------------------------------------------------------------------------
// `sigexpr render` (end-to-end file processing)
// ---------------------------------------------------------------------------

fn write_input(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("input.wav");
    let a: Vec<f64> = (0..1000).map(|i| f64::from(i) / 4000.0).collect();
    let b: Vec<f64> = (0..1000).map(|i| -f64::from(i) / 8000.0).collect();
    let spec = WavSpec {
        channels: 2,
        sample_rate: 48000,
        bits_per_sample: 32,
    };
    write_wav_channels(&path, &[a.as_slice(), b.as_slice()], spec).unwrap();
    path
}

#[test]
fn cli_render_sums_channels() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let output_path = dir.path().join("out.wav");

    let output = sigexpr_bin()
        .arg("render")
        .arg(&input)
        .arg(&output_path)
        .args(["--expr", "v0 + v1", "--block-size", "64"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let (rendered, spec) = read_wav_channels(&output_path).unwrap();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 48000);
    assert_eq!(rendered[0].len(), 1000);
    for (i, &s) in rendered[0].iter().enumerate() {
        let expected = f64::from(i as u32) / 8000.0;
        assert!((s - expected).abs() < 1e-6, "sample {i}: {s} vs {expected}");
    }
}

#[test]
fn cli_render_default_expression_passes_v0_through() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let output_path = dir.path().join("out.wav");

    let status = sigexpr_bin()
        .arg("render")
        .arg(&input)
        .arg(&output_path)
        .status()
        .unwrap();
    assert!(status.success());

    let (input_channels, _) = read_wav_channels(&input).unwrap();
    let (rendered, _) = read_wav_channels(&output_path).unwrap();
    assert_eq!(rendered[0], input_channels[0]);
}

#[test]
fn cli_render_rejects_invalid_expression() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let output_path = dir.path().join("out.wav");

    let output = sigexpr_bin()
        .arg("render")
        .arg(&input)
        .arg(&output_path)
        .args(["--expr", "v0 +"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!output_path.exists());
}

#[test]
fn cli_render_help_describes_invalid_expression() {
    let output = sigexpr_bin().args(["render", "--help"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("does not parse stops the render"), "{stdout}");
}

#[test]
fn cli_render_missing_channel_reports_nan() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let output_path = dir.path().join("out.wav");

    let output = sigexpr_bin()
        .arg("render")
        .arg(&input)
        .arg(&output_path)
        .args(["--expr", "v3", "--bit-depth", "16"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("1000 sample(s) rendered as NaN"));

    // NaN becomes silence in integer output.
    let (rendered, _) = read_wav_channels(&output_path).unwrap();
    assert!(rendered[0].iter().all(|&s| s == 0.0));
}
