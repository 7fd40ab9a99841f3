//! Integration tests for hapticctl CLI
//!
//! Runs the real binary against the simulated device with a hidden run
//! duration so no Ctrl-C is needed.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn hapticctl() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hapticctl")?;
    cmd.env_remove("HAPTIC_SERVO_CONFIG")
        .env_remove("HAPTIC_SERVO_RUN_FOR_MS")
        .env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn test_help_lists_run() -> TestResult {
    hapticctl()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("HAPTIC_SERVO_CONFIG").not());
    Ok(())
}

#[test]
fn test_timed_run_prints_samples() -> TestResult {
    let dir = TempDir::new()?;
    let config = dir.path().join("servo.yaml");
    fs::write(
        &config,
        "throttle_interval_ms: 1\ndevice:\n  sweep_period_ms: 100\n  button_period_ms: 100\n",
    )?;

    hapticctl()?
        .env("HAPTIC_SERVO_CONFIG", &config)
        .args(["run", "--duration-ms", "300"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("Starting haptic feedback loop"))
        .stdout(predicate::str::contains("[POS] x="))
        .stdout(predicate::str::contains("[BTN] raw=0x"))
        .stdout(predicate::str::contains("Stopped"));
    Ok(())
}

#[test]
fn test_invalid_config_exits_with_error() -> TestResult {
    let dir = TempDir::new()?;
    let config = dir.path().join("servo.yaml");
    fs::write(&config, "surface:\n  stiffness_n_per_mm: -0.5\n")?;

    hapticctl()?
        .args(["--config"])
        .arg(&config)
        .args(["run", "--duration-ms", "10"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid configuration"))
        .stderr(predicate::str::contains("stiffness_n_per_mm"));
    Ok(())
}

#[test]
fn test_missing_config_exits_with_error() -> TestResult {
    let dir = TempDir::new()?;

    hapticctl()?
        .env("HAPTIC_SERVO_CONFIG", dir.path().join("absent.yaml"))
        .args(["run", "--duration-ms", "10"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid configuration"));
    Ok(())
}

#[test]
fn test_unknown_subcommand_rejected() -> TestResult {
    hapticctl()?
        .arg("calibrate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
    Ok(())
}
