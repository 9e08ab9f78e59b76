//! Runfiles discovery and lookup.
//!
//! A launcher runs either from a `<binary>.runfiles` symlink tree or, where
//! symlinks are unavailable, from a `MANIFEST` that maps logical paths to
//! physical ones. Both are reduced to [`RunfilesResolver`].
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::lib::paths;

pub const RUNFILES_DIR_ENV: &str = "RUNFILES_DIR";
pub const RUNFILES_MANIFEST_FILE_ENV: &str = "RUNFILES_MANIFEST_FILE";
pub const RUNFILES_MANIFEST_ONLY_ENV: &str = "RUNFILES_MANIFEST_ONLY";
pub const RUNFILES_SUFFIX: &str = ".runfiles";
pub const MANIFEST_FILE_NAME: &str = "MANIFEST";

/// Maps logical runfile paths to locations on disk.
pub trait RunfilesResolver {
    /// Resolve `path`. Absolute paths are returned unchanged.
    fn rlocation(&self, path: &str) -> Option<PathBuf>;
    /// The runfiles root directory.
    fn directory(&self) -> &Path;
    /// The manifest backing lookups, when lookups are manifest-based.
    fn manifest_file(&self) -> Option<&Path>;
}

#[derive(Debug, Clone)]
enum Strategy {
    Directory,
    Manifest {
        path: PathBuf,
        entries: HashMap<String, String>,
    },
}

/// Runfiles located for the current launcher.
#[derive(Debug, Clone)]
pub struct Runfiles {
    directory: PathBuf,
    strategy: Strategy,
}

impl Runfiles {
    /// Directory-backed runfiles rooted at `directory`.
    pub fn from_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            strategy: Strategy::Directory,
        }
    }

    /// Manifest-backed runfiles. An unreadable manifest resolves nothing.
    pub fn from_manifest(directory: impl Into<PathBuf>, manifest: impl Into<PathBuf>) -> Self {
        let path = manifest.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => parse_manifest(&content),
            Err(err) => {
                warn!(
                    target: "dotnet_launcher::runfiles",
                    manifest = %path.display(),
                    reason = %err,
                    "Failed to read runfiles manifest"
                );
                HashMap::new()
            }
        };
        Self {
            directory: directory.into(),
            strategy: Strategy::Manifest { path, entries },
        }
    }

    /// Locate runfiles for the launcher at `exe`.
    ///
    /// Resolution order:
    /// 1. `RUNFILES_DIR`.
    /// 2. The directory owning `RUNFILES_MANIFEST_FILE`.
    /// 3. `<exe>.runfiles` when it is a directory.
    /// 4. The `.runfiles` prefix of `cwd`.
    /// 5. `<exe>.runfiles`, unchecked.
    pub fn discover<F>(exe: &Path, cwd: Option<&Path>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|value| !value.is_empty());
        let manifest_env = lookup(RUNFILES_MANIFEST_FILE_ENV).map(PathBuf::from);
        let beside_exe = sibling_runfiles_dir(exe);

        let directory = lookup(RUNFILES_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| manifest_env.as_deref().map(directory_for_manifest))
            .or_else(|| beside_exe.is_dir().then(|| beside_exe.clone()))
            .or_else(|| cwd.and_then(runfiles_prefix))
            .unwrap_or(beside_exe);

        let manifest = manifest_env.unwrap_or_else(|| directory.join(MANIFEST_FILE_NAME));
        let manifest_only = lookup(RUNFILES_MANIFEST_ONLY_ENV).as_deref() == Some("1");
        let runfiles = if manifest_only || (!directory.is_dir() && manifest.is_file()) {
            Self::from_manifest(directory, manifest)
        } else {
            Self::from_directory(directory)
        };

        debug!(
            target: "dotnet_launcher::runfiles",
            directory = %runfiles.directory.display(),
            manifest = ?runfiles.manifest_file(),
            "Located runfiles"
        );
        runfiles
    }
}

impl RunfilesResolver for Runfiles {
    fn rlocation(&self, path: &str) -> Option<PathBuf> {
        if paths::is_nonempty_absolute(Path::new(path)) || paths::is_windows_absolute(path) {
            return Some(PathBuf::from(path));
        }

        let logical = ["../", "external/"]
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix))
            .unwrap_or(path);

        match &self.strategy {
            Strategy::Directory => Some(self.directory.join(logical)),
            Strategy::Manifest { entries, .. } => entries
                .get(logical)
                .filter(|physical| !physical.is_empty())
                .map(PathBuf::from),
        }
    }

    fn directory(&self) -> &Path {
        &self.directory
    }

    fn manifest_file(&self) -> Option<&Path> {
        match &self.strategy {
            Strategy::Directory => None,
            Strategy::Manifest { path, .. } => Some(path),
        }
    }
}

/// Parse `<logical> <physical>` lines. A line without a space maps to an empty path.
fn parse_manifest(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(' ') {
            Some((logical, physical)) => (logical.to_string(), physical.to_string()),
            None => (line.to_string(), String::new()),
        })
        .collect()
}

fn sibling_runfiles_dir(exe: &Path) -> PathBuf {
    let mut dir = exe.as_os_str().to_os_string();
    dir.push(RUNFILES_SUFFIX);
    PathBuf::from(dir)
}

/// `foo.runfiles/MANIFEST` belongs to `foo.runfiles`; `foo.runfiles_manifest` to its sibling.
fn directory_for_manifest(manifest: &Path) -> PathBuf {
    let text = manifest.to_string_lossy();
    if let Some(stripped) = text.strip_suffix("_manifest") {
        return PathBuf::from(stripped);
    }
    manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest.to_path_buf())
}

fn runfiles_prefix(cwd: &Path) -> Option<PathBuf> {
    let text = cwd.to_string_lossy();
    text.find(RUNFILES_SUFFIX)
        .map(|index| PathBuf::from(&text[..index + RUNFILES_SUFFIX.len()]))
}
