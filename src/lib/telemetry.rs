//! Telemetry initialization and launch event helpers.

use std::{env, path::Path};

use anyhow::{anyhow, Result};
use tracing::{debug, info};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Default filter when neither `DOTNET_LAUNCHER_LOG` nor debug mode is set.
pub const DEFAULT_LOG_FILTER: &str = "warn";
/// Filter used when `DOTNET_LAUNCHER_DEBUG` is enabled.
pub const DEBUG_LOG_FILTER: &str = "debug";
pub const LOG_ENV_KEY: &str = "DOTNET_LAUNCHER_LOG";
pub const DEBUG_ENV_KEY: &str = "DOTNET_LAUNCHER_DEBUG";

/// Handle for swapping the active filter once configuration is loaded.
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Initialize `tracing`. Logs go to stderr so the child's stdout stays untouched.
///
/// Returns `None` when a subscriber was already installed.
pub fn init_tracing(filter: &str) -> Result<Option<FilterHandle>> {
    if tracing::dispatcher::has_been_set() {
        return Ok(None);
    }

    let (filter_layer, handle) = reload::Layer::new(parse_filter(filter));
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|err| anyhow!("failed to initialize tracing: {err}"))?;
    Ok(Some(handle))
}

/// Filter taken straight from the process environment, used before configuration loads.
pub fn bootstrap_filter() -> String {
    let log = env::var(LOG_ENV_KEY).ok();
    let debug = env::var(DEBUG_ENV_KEY).is_ok_and(|value| debug_enabled(&value));
    select_filter(log.as_deref(), debug).to_string()
}

/// Replace the filter installed by [`init_tracing`].
pub fn apply_filter(handle: Option<&FilterHandle>, filter: &str) -> Result<()> {
    let Some(handle) = handle else {
        return Ok(());
    };
    handle
        .reload(parse_filter(filter))
        .map_err(|err| anyhow!("failed to update log filter: {err}"))
}

/// `DOTNET_LAUNCHER_DEBUG` is on for any value except empty, `0`, `false`, `no`, `off`.
pub fn debug_enabled(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

fn parse_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Pick the log filter from the configured value and debug flag.
pub fn select_filter(log: Option<&str>, debug: bool) -> &str {
    match log {
        Some(filter) if !filter.trim().is_empty() => filter,
        _ if debug => DEBUG_LOG_FILTER,
        _ => DEFAULT_LOG_FILTER,
    }
}

/// Payload describing a launch that is about to happen.
#[derive(Debug)]
pub struct LaunchTelemetry<'a> {
    pub binary_type: &'a str,
    pub binary: &'a Path,
    pub used_fallback: bool,
    pub args: &'a [String],
    pub env_keys: Vec<&'a str>,
}

/// Emit the launch plan to `tracing`.
pub fn emit_launch(telemetry: &LaunchTelemetry<'_>) {
    info!(
        target: "dotnet_launcher::launch",
        binary_type = telemetry.binary_type,
        binary = %telemetry.binary.display(),
        used_fallback = telemetry.used_fallback,
        "Launching runtime"
    );
    debug!(
        target: "dotnet_launcher::launch",
        args = ?telemetry.args,
        env_keys = ?telemetry.env_keys,
        "Launch arguments"
    );
}

/// Emit the child's exit code.
pub fn emit_exit(binary: &Path, exit_code: i32) {
    info!(
        target: "dotnet_launcher::launch",
        binary = %binary.display(),
        exit_code,
        "Runtime exited"
    );
}
