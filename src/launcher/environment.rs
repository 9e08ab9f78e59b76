//! Environment propagation for the child process.
//!
//! Nothing here touches the launcher's own environment: the variables are
//! collected into a [`PreparedEnvironment`] that is applied to the child
//! command only.
use tracing::debug;

use crate::{
    lib::errors::LaunchError,
    runfiles::{RunfilesResolver, RUNFILES_DIR_ENV, RUNFILES_MANIFEST_FILE_ENV},
};

use super::host::LaunchHost;

/// Separator between `KEY=VALUE` entries of `dotnet_env`.
pub const ENV_ENTRY_SEPARATOR: char = ';';

/// Ordered variables to set on the child. Later entries win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedEnvironment {
    vars: Vec<(String, String)>,
}

impl PreparedEnvironment {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.push((key.into(), value.into()));
    }

    /// The effective value of `key` after all assignments.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.vars.iter().map(|(k, _)| k.as_str()).collect()
    }
}

/// Split `dotnet_env` into `(key, value)` pairs.
///
/// Entries are split on the first `=`. Empty segments are skipped; an entry
/// without `=` or with an empty key is rejected.
pub fn parse_env_assignments(raw: &str) -> Result<Vec<(String, String)>, LaunchError> {
    raw.split(ENV_ENTRY_SEPARATOR)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(LaunchError::MalformedEnvEntry {
                entry: entry.to_string(),
            }),
        })
        .collect()
}

/// Collect the runfiles variables and `dotnet_env` assignments for the child.
///
/// `RUNFILES_DIR` is only added when the launcher's environment lacks it (an
/// empty value counts as missing), and `RUNFILES_MANIFEST_FILE` only when
/// lookups are manifest-based.
pub fn prepare_environment<H, R>(
    dotnet_env: Option<&str>,
    runfiles: &R,
    host: &H,
) -> Result<PreparedEnvironment, LaunchError>
where
    H: LaunchHost,
    R: RunfilesResolver + ?Sized,
{
    let assignments = dotnet_env
        .map(parse_env_assignments)
        .transpose()?
        .unwrap_or_default();

    let inherited = |key: &str| host.env_var(key).is_some_and(|value| !value.is_empty());

    let mut prepared = PreparedEnvironment::default();
    if !inherited(RUNFILES_DIR_ENV) {
        prepared.set(
            RUNFILES_DIR_ENV,
            runfiles.directory().to_string_lossy().into_owned(),
        );
    }
    if let Some(manifest) = runfiles.manifest_file() {
        if !inherited(RUNFILES_MANIFEST_FILE_ENV) {
            prepared.set(
                RUNFILES_MANIFEST_FILE_ENV,
                manifest.to_string_lossy().into_owned(),
            );
        }
    }
    for (key, value) in assignments {
        prepared.set(key, value);
    }

    debug!(
        target: "dotnet_launcher::environment",
        keys = ?prepared.keys(),
        "Prepared child environment"
    );
    Ok(prepared)
}
