use std::{fs, process::Command};

use tempfile::tempdir;

use crate::common::{command, stderr_text, LAUNCHER_PATH, LAUNCH_DATA_PATH};

#[test]
fn embed_then_dump_round_trips_entries() {
    let dir = tempdir().expect("tempdir");
    let output_path = dir.path().join("MyApp");
    let entries = dir.path().join("entries.toml");
    fs::write(
        &entries,
        "binary_type = \"Dotnet\"\ndotnet_bin_path = \"external/dotnet_sdk/dotnet\"\n",
    )
    .expect("write entries");

    let embed = Command::new(LAUNCH_DATA_PATH)
        .arg("embed")
        .arg(LAUNCHER_PATH)
        .arg("--output")
        .arg(&output_path)
        .arg("--entries")
        .arg(&entries)
        .args(["--set", "dotnet_env=FOO=bar;BAZ=1"])
        .output()
        .expect("launch-data runs");
    assert!(embed.status.success(), "stderr: {}", stderr_text(&embed));

    let dump = Command::new(LAUNCH_DATA_PATH)
        .arg("dump")
        .arg(&output_path)
        .output()
        .expect("launch-data runs");
    assert!(dump.status.success(), "stderr: {}", stderr_text(&dump));

    let value: serde_json::Value = serde_json::from_slice(&dump.stdout).expect("json output");
    assert_eq!(
        value,
        serde_json::json!({
            "binary_type": "Dotnet",
            "dotnet_bin_path": "external/dotnet_sdk/dotnet",
            "dotnet_env": "FOO=bar;BAZ=1",
        })
    );
}

#[test]
fn dump_as_toml() {
    let dir = tempdir().expect("tempdir");
    let output_path = dir.path().join("App");

    let embed = Command::new(LAUNCH_DATA_PATH)
        .arg("embed")
        .arg(LAUNCHER_PATH)
        .arg("-o")
        .arg(&output_path)
        .args(["--set", "binary_type=DotnetLegacy"])
        .output()
        .expect("launch-data runs");
    assert!(embed.status.success(), "stderr: {}", stderr_text(&embed));

    let dump = Command::new(LAUNCH_DATA_PATH)
        .arg("dump")
        .arg(&output_path)
        .args(["--format", "toml"])
        .output()
        .expect("launch-data runs");
    assert_eq!(
        String::from_utf8_lossy(&dump.stdout).trim(),
        "binary_type = \"DotnetLegacy\""
    );
}

#[test]
fn embedded_copy_is_a_working_launcher() {
    let dir = tempdir().expect("tempdir");
    let output_path = dir.path().join("App");

    let embed = Command::new(LAUNCH_DATA_PATH)
        .arg("embed")
        .arg(LAUNCHER_PATH)
        .arg("--output")
        .arg(&output_path)
        .args(["--set", "binary_type=Unknown", "--set", "dotnet_bin_path=dotnet"])
        .output()
        .expect("launch-data runs");
    assert!(embed.status.success(), "stderr: {}", stderr_text(&embed));

    let run = command(&output_path, dir.path())
        .output()
        .expect("launcher runs");
    assert_eq!(run.status.code(), Some(1));
    assert!(stderr_text(&run).contains("Unknown"));
}

#[test]
fn malformed_set_is_a_usage_error() {
    let dir = tempdir().expect("tempdir");
    let output = Command::new(LAUNCH_DATA_PATH)
        .arg("embed")
        .arg(LAUNCHER_PATH)
        .arg("--output")
        .arg(dir.path().join("App"))
        .args(["--set", "no-equals"])
        .output()
        .expect("launch-data runs");

    assert!(!output.status.success());
    assert!(stderr_text(&output).contains("KEY=VALUE"));
    assert!(!dir.path().join("App").exists());
}

#[test]
fn dump_of_missing_binary_fails() {
    let dir = tempdir().expect("tempdir");
    let output = Command::new(LAUNCH_DATA_PATH)
        .arg("dump")
        .arg(dir.path().join("missing"))
        .output()
        .expect("launch-data runs");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_text(&output).starts_with("launch-data:"));
}
