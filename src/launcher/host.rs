use std::{future::Future, path::PathBuf, process::ExitStatus};

use tokio::process::Command;

use crate::lib::errors::LaunchError;

use super::environment::PreparedEnvironment;

/// One element of the child's command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchArg {
    /// Passed as-is; the platform quotes it if needed.
    Verbatim(String),
    /// Already escaped by [`LaunchHost::escape_arg`]; placed on the command line untouched.
    Escaped(String),
}

impl LaunchArg {
    pub fn as_str(&self) -> &str {
        match self {
            LaunchArg::Verbatim(value) | LaunchArg::Escaped(value) => value,
        }
    }
}

/// Fully prepared child process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<LaunchArg>,
    pub env: PreparedEnvironment,
}

impl LaunchCommand {
    /// Arguments as strings, for logging and assertions.
    pub fn argv(&self) -> Vec<String> {
        self.args.iter().map(|arg| arg.as_str().to_string()).collect()
    }
}

/// Operating-system capabilities the launcher depends on.
pub trait LaunchHost {
    /// True when `path` names an existing file.
    fn file_exists(&self, path: &str) -> bool;
    /// Expand short (8.3) path aliases. Returns the input when nothing applies.
    fn long_path(&self, path: &str) -> String;
    /// Read a variable from the launcher's own environment.
    fn env_var(&self, key: &str) -> Option<String>;
    /// Escape one argument so the child's argument parser sees it unchanged.
    fn escape_arg(&self, arg: &str) -> String;
    /// Spawn the child, wait for it, and return its exit code.
    fn launch(&self, command: LaunchCommand) -> impl Future<Output = Result<i32, LaunchError>>;
}

/// Host backed by the real process environment and filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLaunchHost;

impl LaunchHost for SystemLaunchHost {
    fn file_exists(&self, path: &str) -> bool {
        std::path::Path::new(path).is_file()
    }

    // Only paths carrying an 8.3 alias (`PROGRA~1`) are expanded. Expansion
    // canonicalizes, which also resolves symlinks on that path.
    #[cfg(windows)]
    fn long_path(&self, path: &str) -> String {
        if !has_short_name_component(path) {
            return path.to_string();
        }
        match std::fs::canonicalize(path) {
            Ok(full) => {
                let full = full.to_string_lossy();
                full.strip_prefix(r"\\?\").unwrap_or(&full).to_string()
            }
            Err(_) => path.to_string(),
        }
    }

    #[cfg(not(windows))]
    fn long_path(&self, path: &str) -> String {
        path.to_string()
    }

    fn env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    #[cfg(windows)]
    fn escape_arg(&self, arg: &str) -> String {
        escape_windows_arg(arg)
    }

    // argv is handed to exec as an array, so nothing needs quoting.
    #[cfg(not(windows))]
    fn escape_arg(&self, arg: &str) -> String {
        arg.to_string()
    }

    async fn launch(&self, command: LaunchCommand) -> Result<i32, LaunchError> {
        let mut child = Command::new(&command.program);
        for arg in &command.args {
            match arg {
                LaunchArg::Verbatim(value) => {
                    child.arg(value);
                }
                #[cfg(windows)]
                LaunchArg::Escaped(value) => {
                    child.raw_arg(value);
                }
                #[cfg(not(windows))]
                LaunchArg::Escaped(value) => {
                    child.arg(value);
                }
            }
        }
        child.envs(command.env.iter());

        let status = child
            .status()
            .await
            .map_err(|source| LaunchError::Spawn {
                binary: command.program.clone(),
                source,
            })?;
        Ok(exit_code_of(status))
    }
}

/// True when a path component looks like an 8.3 alias such as `PROGRA~1`.
pub fn has_short_name_component(path: &str) -> bool {
    path.split(|c: char| c == '/' || c == '\\')
        .any(|component| {
            component
                .split_once('~')
                .is_some_and(|(_, suffix)| {
                    suffix
                        .chars()
                        .next()
                        .is_some_and(|c| c.is_ascii_digit())
                })
        })
}

/// Map a child status to a process exit code. Signals become `128 + signal`.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Quote `arg` for `CommandLineToArgvW` / the MSVC runtime parser.
pub fn escape_windows_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "\"\"".to_string();
    }
    if !arg.contains(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0b' | '"')) {
        return arg.to_string();
    }

    let mut escaped = String::with_capacity(arg.len() + 2);
    escaped.push('"');
    let mut backslashes = 0usize;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                escaped.extend(std::iter::repeat('\\').take(backslashes * 2 + 1));
                escaped.push('"');
                backslashes = 0;
            }
            _ => {
                escaped.extend(std::iter::repeat('\\').take(backslashes));
                escaped.push(c);
                backslashes = 0;
            }
        }
    }
    escaped.extend(std::iter::repeat('\\').take(backslashes * 2));
    escaped.push('"');
    escaped
}
