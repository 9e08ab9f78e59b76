//! Rewrites the launcher's command line into the runtime's.
use crate::lib::paths;

use super::host::{LaunchArg, LaunchHost};

/// Whether the artifact extension is appended to the rewritten entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSuffix {
    /// `App.exe` becomes `App.dll`.
    Append,
    /// `App.exe` becomes `App`.
    Keep,
}

/// Map the launcher's own path (argument 0) to the compiled artifact beside it.
///
/// Short path aliases are expanded first so the artifact lookup sees the real name.
pub fn artifact_path<H: LaunchHost>(
    argv0: &str,
    suffix: ArtifactSuffix,
    extension: &str,
    host: &H,
) -> String {
    let long = host.long_path(argv0);
    match suffix {
        ArtifactSuffix::Append => paths::with_extension(&long, extension),
        ArtifactSuffix::Keep => paths::strip_extension(&long).to_string(),
    }
}

/// Replace argument 0 with the artifact path and escape the rest.
///
/// Returns `None` for an empty argument list.
pub fn rewrite_arguments<H: LaunchHost>(
    args: &[String],
    suffix: ArtifactSuffix,
    extension: &str,
    host: &H,
) -> Option<(LaunchArg, Vec<LaunchArg>)> {
    let (argv0, rest) = args.split_first()?;
    let artifact = LaunchArg::Verbatim(artifact_path(argv0, suffix, extension, host));
    let escaped = rest
        .iter()
        .map(|arg| LaunchArg::Escaped(host.escape_arg(arg)))
        .collect();
    Some((artifact, escaped))
}
