#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use dotnet_launcher::launch_info::LaunchInfo;

pub const LAUNCHER_PATH: &str = env!("CARGO_BIN_EXE_dotnet-launcher");
pub const LAUNCH_DATA_PATH: &str = env!("CARGO_BIN_EXE_launch-data");

/// Variables that would leak the test runner's runfiles or launcher settings into the child.
const SCRUBBED_ENV: [&str; 7] = [
    "RUNFILES_DIR",
    "RUNFILES_MANIFEST_FILE",
    "RUNFILES_MANIFEST_ONLY",
    "XML_OUTPUT_FILE",
    "DOTNET_LAUNCHER_CONFIG",
    "DOTNET_LAUNCHER_DEBUG",
    "DOTNET_LAUNCHER_LOG",
];

/// Copy the built launcher to `dir/name` and append `entries` as launch data.
pub fn embedded_launcher(dir: &Path, name: &str, entries: &[(&str, &str)]) -> PathBuf {
    let launcher = dir.join(name);
    fs::copy(LAUNCHER_PATH, &launcher).expect("copy launcher");
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect::<LaunchInfo>()
        .append_to_binary(&launcher)
        .expect("append launch data");
    launcher
}

/// A command with a clean launcher environment, running inside `cwd`.
pub fn command(program: &Path, cwd: &Path) -> Command {
    let mut command = Command::new(program);
    command.current_dir(cwd);
    for key in SCRUBBED_ENV {
        command.env_remove(key);
    }
    command
}

/// Write an executable shell script that stands in for the runtime.
#[cfg(unix)]
pub fn fake_runtime(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write runtime script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod runtime script");
    path
}

pub fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
