use std::path::Path;

use tracing::debug;

use super::{LauncherConfig, CONFIG_ENV_KEY};

pub fn log_env_source(path: Option<&Path>) {
    match path {
        Some(path) => debug!(
            target: "dotnet_launcher::config",
            path = %path.display(),
            "Loading launcher configuration using DOTNET_LAUNCHER_CONFIG"
        ),
        None => debug!(
            target: "dotnet_launcher::config",
            env = CONFIG_ENV_KEY,
            "DOTNET_LAUNCHER_CONFIG not set; using environment and defaults"
        ),
    }
}

pub fn log_loaded(config: &LauncherConfig) {
    debug!(
        target: "dotnet_launcher::config",
        path = ?config.source_path,
        debug = config.debug,
        sentinel_name = %config.runtime.sentinel_name,
        fallback_binary = %config.runtime.fallback_binary,
        artifact_extension = %config.runtime.artifact_extension,
        "Launcher configuration loaded"
    );
}
