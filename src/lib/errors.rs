use std::{io, path::PathBuf};

use config::ConfigError as ConfigLoaderError;
use thiserror::Error;

/// Errors that can occur while loading or validating launcher configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the configuration sources.
    #[error("Failed to read launcher configuration {source_name}")]
    FileRead {
        source_name: String,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize the merged configuration into a struct.
    #[error("Failed to parse launcher configuration {source_name}")]
    Parse {
        source_name: String,
        #[source]
        source: ConfigLoaderError,
    },
    /// Field failed validation.
    #[error("Launcher configuration {source_name} has invalid `{field}`: {message}")]
    InvalidField {
        source_name: String,
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(source_name: impl Into<String>, source: ConfigLoaderError) -> Self {
        Self::FileRead {
            source_name: source_name.into(),
            source,
        }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(source_name: impl Into<String>, source: ConfigLoaderError) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            source,
        }
    }
}

/// Failures while reading or writing the launch data appended to a binary.
#[derive(Debug, Error)]
pub enum LaunchInfoError {
    #[error("I/O failed for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is too short ({len} bytes) to carry launch data")]
    Truncated { path: PathBuf, len: u64 },
    #[error("launch data size {size} does not fit in a binary of {len} bytes")]
    InvalidSize { size: i64, len: u64 },
    #[error("launch data entry at offset {offset} has no `=` after its key")]
    MissingSeparator { offset: usize },
    #[error("launch data entry at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },
    #[error("launch data key `{key}` must not be empty or contain `=` or NUL")]
    InvalidKey { key: String },
    #[error("launch data value for `{key}` must not contain NUL")]
    InvalidValue { key: String },
}

/// Fatal launch failures. Each one terminates the launcher before a child runs.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to parse launch info")]
    LaunchInfo(#[from] LaunchInfoError),
    #[error("cannot find key \"{key}\" from launch data")]
    MissingKey { key: &'static str },
    #[error("unknown binary type `{binary_type}`, cannot launch anything")]
    UnknownBinaryType { binary_type: String },
    #[error("malformed dotnet environment entry `{entry}`: expected KEY=VALUE")]
    MalformedEnvEntry { entry: String },
    #[error("no command line arguments: cannot locate the user assembly")]
    MissingArgv0,
    #[error("failed to determine the launcher executable path")]
    CurrentExe {
        #[source]
        source: io::Error,
    },
    #[error("failed to make launcher path {path} absolute")]
    LauncherPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to launch {binary}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },
}
