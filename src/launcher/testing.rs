//! In-memory host and runfiles used by launcher unit tests.
use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

use crate::{lib::errors::LaunchError, runfiles::RunfilesResolver};

use super::host::{LaunchCommand, LaunchHost};

#[derive(Debug, Default)]
pub struct FakeHost {
    env: HashMap<String, String>,
    files: HashSet<String>,
    long_paths: HashMap<String, String>,
    exit_code: i32,
    pub launched: RefCell<Vec<LaunchCommand>>,
}

impl FakeHost {
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.files
            .insert(path.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn with_long_path(mut self, short: &str, long: &str) -> Self {
        self.long_paths.insert(short.to_string(), long.to_string());
        self
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = exit_code;
        self
    }

    pub fn single_launch(&self) -> LaunchCommand {
        let launched = self.launched.borrow();
        assert_eq!(launched.len(), 1, "expected exactly one launch");
        launched[0].clone()
    }
}

impl LaunchHost for FakeHost {
    fn file_exists(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    fn long_path(&self, path: &str) -> String {
        self.long_paths
            .get(path)
            .cloned()
            .unwrap_or_else(|| path.to_string())
    }

    fn env_var(&self, key: &str) -> Option<String> {
        self.env.get(key).cloned()
    }

    fn escape_arg(&self, arg: &str) -> String {
        format!("<{arg}>")
    }

    async fn launch(&self, command: LaunchCommand) -> Result<i32, LaunchError> {
        self.launched.borrow_mut().push(command);
        Ok(self.exit_code)
    }
}

/// Directory-style runfiles that records every lookup.
#[derive(Debug)]
pub struct RecordingRunfiles {
    directory: PathBuf,
    pub lookups: RefCell<Vec<String>>,
}

impl RecordingRunfiles {
    pub fn new(directory: &str) -> Self {
        Self {
            directory: PathBuf::from(directory),
            lookups: RefCell::new(Vec::new()),
        }
    }
}

impl RunfilesResolver for RecordingRunfiles {
    fn rlocation(&self, path: &str) -> Option<PathBuf> {
        self.lookups.borrow_mut().push(path.to_string());
        if Path::new(path).is_absolute() {
            return Some(PathBuf::from(path));
        }
        Some(self.directory.join(path))
    }

    fn directory(&self) -> &Path {
        &self.directory
    }

    fn manifest_file(&self) -> Option<&Path> {
        None
    }
}
