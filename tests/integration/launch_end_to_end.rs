use tempfile::tempdir;

use crate::common::{command, embedded_launcher, stderr_text};

#[cfg(unix)]
use crate::common::{fake_runtime, stdout_lines};

#[cfg(unix)]
const ECHO_RUNTIME: &str = r#"for arg in "$@"; do printf 'arg:%s\n' "$arg"; done
printf 'FOO=%s\n' "$FOO"
printf 'RUNFILES_DIR=%s\n' "$RUNFILES_DIR"
exit 7"#;

#[cfg(unix)]
#[test]
fn launcher_runs_runtime_with_rewritten_args_and_env() {
    let dir = tempdir().expect("tempdir");
    let runtime = fake_runtime(dir.path(), "fake_dotnet", ECHO_RUNTIME);
    let runtime_path = runtime.to_string_lossy().into_owned();
    let launcher = embedded_launcher(
        dir.path(),
        "MyApp",
        &[
            ("binary_type", "Dotnet"),
            ("dotnet_bin_path", &runtime_path),
            ("dotnet_env", "FOO=bar"),
        ],
    );

    let output = command(&launcher, dir.path())
        .args(["--flag", "two words"])
        .output()
        .expect("launcher runs");

    assert_eq!(output.status.code(), Some(7), "stderr: {}", stderr_text(&output));
    let launcher_path = launcher.to_string_lossy();
    assert_eq!(
        stdout_lines(&output),
        vec![
            format!("arg:{launcher_path}.dll"),
            "arg:--flag".to_string(),
            "arg:two words".to_string(),
            "FOO=bar".to_string(),
            format!("RUNFILES_DIR={launcher_path}.runfiles"),
        ]
    );
}

#[cfg(unix)]
#[test]
fn inherited_runfiles_dir_is_left_alone() {
    let dir = tempdir().expect("tempdir");
    let runfiles = dir.path().join("elsewhere.runfiles");
    std::fs::create_dir(&runfiles).expect("runfiles dir");
    let runtime = fake_runtime(dir.path(), "fake_dotnet", ECHO_RUNTIME);
    let runtime_path = runtime.to_string_lossy().into_owned();
    let launcher = embedded_launcher(
        dir.path(),
        "App",
        &[
            ("binary_type", "DotnetLegacy"),
            ("dotnet_bin_path", &runtime_path),
        ],
    );

    let output = command(&launcher, dir.path())
        .env("RUNFILES_DIR", &runfiles)
        .output()
        .expect("launcher runs");

    assert_eq!(output.status.code(), Some(7), "stderr: {}", stderr_text(&output));
    let lines = stdout_lines(&output);
    assert_eq!(lines[0], format!("arg:{}", launcher.to_string_lossy()));
    assert_eq!(
        lines.last().map(String::as_str),
        Some(format!("RUNFILES_DIR={}", runfiles.to_string_lossy()).as_str())
    );
}

#[cfg(unix)]
#[test]
fn test_command_gets_logger_argument() {
    let dir = tempdir().expect("tempdir");
    let runtime = fake_runtime(dir.path(), "fake_dotnet", ECHO_RUNTIME);
    let runtime_path = runtime.to_string_lossy().into_owned();
    let launcher = embedded_launcher(
        dir.path(),
        "Tests",
        &[
            ("binary_type", "Dotnet"),
            ("dotnet_bin_path", &runtime_path),
            ("dotnet_env", ""),
            ("dotnet_cmd", "test"),
            ("dotnet_logger", "junit"),
            ("log_path_arg_name", "LogFilePath"),
        ],
    );

    let output = command(&launcher, dir.path())
        .env("XML_OUTPUT_FILE", "/out/test.xml")
        .output()
        .expect("launcher runs");

    let lines = stdout_lines(&output);
    assert_eq!(lines[0], "arg:test");
    assert_eq!(lines[1], format!("arg:{}.dll", launcher.to_string_lossy()));
    assert_eq!(lines[2], "arg:--logger");
    assert_eq!(lines[3], "arg:junit;LogFilePath=/out/test.xml");
}

#[cfg(unix)]
#[test]
fn missing_runtime_falls_back_to_path_lookup() {
    let dir = tempdir().expect("tempdir");
    let bin = dir.path().join("bin");
    std::fs::create_dir(&bin).expect("bin dir");
    fake_runtime(&bin, "dotnet", "echo from-path\nexit 0");
    let launcher = embedded_launcher(
        dir.path(),
        "App",
        &[
            ("binary_type", "Dotnet"),
            ("dotnet_bin_path", "dotnet_sdk/dotnet"),
            ("dotnet_env", ""),
        ],
    );

    let output = command(&launcher, dir.path())
        .env("PATH", &bin)
        .output()
        .expect("launcher runs");

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr_text(&output));
    assert_eq!(stdout_lines(&output), vec!["from-path"]);
}

#[test]
fn missing_required_key_is_reported() {
    let dir = tempdir().expect("tempdir");
    let launcher = embedded_launcher(dir.path(), "App", &[("binary_type", "Dotnet")]);

    let output = command(&launcher, dir.path())
        .output()
        .expect("launcher runs");

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_text(&output);
    assert!(stderr.starts_with("LAUNCHER ERROR:"), "stderr: {stderr}");
    assert!(stderr.contains("dotnet_bin_path"), "stderr: {stderr}");
}

#[test]
fn unknown_binary_type_is_reported() {
    let dir = tempdir().expect("tempdir");
    let launcher = embedded_launcher(
        dir.path(),
        "App",
        &[("binary_type", "Python"), ("dotnet_bin_path", "dotnet")],
    );

    let output = command(&launcher, dir.path())
        .output()
        .expect("launcher runs");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_text(&output).contains("Python"));
}

#[test]
fn malformed_env_entry_is_reported() {
    let dir = tempdir().expect("tempdir");
    let launcher = embedded_launcher(
        dir.path(),
        "App",
        &[
            ("binary_type", "Dotnet"),
            ("dotnet_bin_path", "dotnet"),
            ("dotnet_env", "FOO"),
        ],
    );

    let output = command(&launcher, dir.path())
        .output()
        .expect("launcher runs");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_text(&output).contains("FOO"));
}

#[test]
fn configuration_failure_is_logged_before_the_fatal_report() {
    let dir = tempdir().expect("tempdir");
    let launcher = embedded_launcher(
        dir.path(),
        "App",
        &[
            ("binary_type", "Dotnet"),
            ("dotnet_bin_path", "dotnet"),
            ("dotnet_env", ""),
        ],
    );

    let output = command(&launcher, dir.path())
        .env("DOTNET_LAUNCHER_LOG", "debug")
        .env("DOTNET_LAUNCHER_CONFIG", dir.path().join("missing.toml"))
        .env("NO_COLOR", "1")
        .output()
        .expect("launcher runs");

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_text(&output);
    assert!(stderr.contains("dotnet_launcher::config"), "stderr: {stderr}");
    assert!(stderr.contains("LAUNCHER ERROR:"), "stderr: {stderr}");
}

#[cfg(unix)]
#[test]
fn debug_mode_logs_loaded_configuration() {
    let dir = tempdir().expect("tempdir");
    let runtime = fake_runtime(dir.path(), "fake_dotnet", "exit 0");
    let runtime_path = runtime.to_string_lossy().into_owned();
    let launcher = embedded_launcher(
        dir.path(),
        "App",
        &[
            ("binary_type", "Dotnet"),
            ("dotnet_bin_path", &runtime_path),
            ("dotnet_env", ""),
        ],
    );

    let output = command(&launcher, dir.path())
        .env("DOTNET_LAUNCHER_DEBUG", "1")
        .env("NO_COLOR", "1")
        .output()
        .expect("launcher runs");

    assert_eq!(output.status.code(), Some(0));
    let stderr = stderr_text(&output);
    assert!(stderr.contains("dotnet_launcher::config"), "stderr: {stderr}");
    assert!(stderr.contains("Launcher configuration loaded"), "stderr: {stderr}");
}
