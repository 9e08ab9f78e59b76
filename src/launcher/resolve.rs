//! Runtime binary resolution.
use std::path::PathBuf;

use tracing::debug;

use crate::{config::RuntimeSection, lib::paths, runfiles::RunfilesResolver};

use super::host::LaunchHost;

/// The binary chosen for the launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinary {
    pub path: PathBuf,
    /// True when the configured binary was not found and the PATH fallback is used.
    pub used_fallback: bool,
}

/// True when `configured` is the sentinel name, with or without an extension.
///
/// Only bare names qualify: `external/sdk/dotnet` is a runfile path.
pub fn is_sentinel(configured: &str, sentinel_name: &str) -> bool {
    paths::is_bare_name(configured) && paths::strip_extension(configured) == sentinel_name
}

/// Resolve the configured runtime identifier to something that can be spawned.
///
/// Non-sentinel identifiers go through runfiles (absolute paths pass through).
/// Anything that does not exist afterwards is replaced by the fallback name,
/// which the spawn then looks up on PATH.
pub fn resolve_binary<H, R>(
    configured: &str,
    runtime: &RuntimeSection,
    runfiles: &R,
    host: &H,
) -> ResolvedBinary
where
    H: LaunchHost,
    R: RunfilesResolver + ?Sized,
{
    let candidate = if is_sentinel(configured, &runtime.sentinel_name) {
        Some(configured.to_string())
    } else {
        runfiles
            .rlocation(configured)
            .map(|path| path.to_string_lossy().into_owned())
    };

    match candidate {
        Some(path) if host.file_exists(&path) => {
            debug!(
                target: "dotnet_launcher::resolve",
                configured,
                resolved = %path,
                "Resolved runtime binary"
            );
            ResolvedBinary {
                path: PathBuf::from(path),
                used_fallback: false,
            }
        }
        candidate => {
            debug!(
                target: "dotnet_launcher::resolve",
                configured,
                candidate = ?candidate,
                fallback = %runtime.fallback_binary,
                "Runtime binary not found; falling back to PATH lookup"
            );
            ResolvedBinary {
                path: PathBuf::from(&runtime.fallback_binary),
                used_fallback: true,
            }
        }
    }
}
