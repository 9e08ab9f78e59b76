//! Load and validate launcher configuration.
use std::{collections::HashMap, env, path::PathBuf};

use serde::Deserialize;
use tracing::error;

use crate::lib::{errors::ConfigError, telemetry::debug_enabled};

pub mod runtime;
pub mod telemetry;

pub use runtime::{
    parse_runtime_section, RuntimeSection, DEFAULT_ARTIFACT_EXTENSION, DEFAULT_FALLBACK_BINARY,
    DEFAULT_SENTINEL_NAME,
};

/// Names an optional TOML file layered under the environment.
pub const CONFIG_ENV_KEY: &str = "DOTNET_LAUNCHER_CONFIG";
/// Prefix for environment overrides (`DOTNET_LAUNCHER_DEBUG`, `DOTNET_LAUNCHER_LOG`, ...).
pub const ENV_PREFIX: &str = "DOTNET_LAUNCHER";
const ENV_SOURCE_NAME: &str = "environment";

/// Top-level launcher configuration.
#[derive(Debug, Clone, Default)]
pub struct LauncherConfig {
    pub debug: bool,
    pub log: Option<String>,
    pub runtime: RuntimeSection,
    pub source_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct RawLauncherConfig {
    debug: Option<DebugFlag>,
    log: Option<String>,
    sentinel_name: Option<String>,
    fallback_binary: Option<String>,
    artifact_extension: Option<String>,
}

/// `DOTNET_LAUNCHER_DEBUG` is historically "any non-empty value", so accept strings too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DebugFlag {
    Bool(bool),
    Text(String),
}

impl DebugFlag {
    fn enabled(&self) -> bool {
        match self {
            DebugFlag::Bool(value) => *value,
            DebugFlag::Text(text) => debug_enabled(text),
        }
    }
}

impl LauncherConfig {
    /// Load from `DOTNET_LAUNCHER_CONFIG` (if set) and `DOTNET_LAUNCHER_*` variables.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let path = env::var_os(CONFIG_ENV_KEY)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        telemetry::log_env_source(path.as_deref());
        Self::load(path, None)
    }

    /// Load configuration from an optional file plus environment overrides.
    ///
    /// `env_override` replaces the process environment as the source of
    /// `DOTNET_LAUNCHER_*` keys.
    pub fn load(
        path: Option<PathBuf>,
        env_override: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let source_name = path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| ENV_SOURCE_NAME.to_string());

        let mut builder = config::Config::builder();
        if let Some(path) = &path {
            builder = builder.add_source(config::File::from(path.clone()));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(false)
                .source(env_override),
        );

        let document = builder.build().map_err(|err| {
            error!(
                target: "dotnet_launcher::config",
                source = %source_name,
                reason = %err,
                "Failed to read launcher configuration"
            );
            ConfigError::from_read_error(source_name.clone(), err)
        })?;

        let raw: RawLauncherConfig = document.try_deserialize().map_err(|err| {
            error!(
                target: "dotnet_launcher::config",
                source = %source_name,
                reason = %err,
                "Failed to parse launcher configuration"
            );
            ConfigError::from_parse_error(source_name.clone(), err)
        })?;

        let config = Self::from_raw(raw, &source_name, path)?;
        telemetry::log_loaded(&config);
        Ok(config)
    }

    fn from_raw(
        raw: RawLauncherConfig,
        source_name: &str,
        path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let runtime = parse_runtime_section(
            raw.sentinel_name,
            raw.fallback_binary,
            raw.artifact_extension,
            source_name,
        )?;
        Ok(Self {
            debug: raw.debug.map(|flag| flag.enabled()).unwrap_or(false),
            log: raw.log.filter(|filter| !filter.trim().is_empty()),
            runtime,
            source_path: path,
        })
    }
}
