//! Launch data embedded at the end of the launcher executable.
//!
//! The build appends `key=value\0` entries followed by the byte length of that
//! region as a little-endian `i64`. Keys end at the first `=`, values at NUL, so
//! values may themselves contain `=`.
use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lib::errors::{LaunchError, LaunchInfoError};

/// Width of the trailing size field.
pub const SIZE_FIELD_LEN: usize = std::mem::size_of::<i64>();
/// Separator between items of list-valued keys.
pub const LIST_SEPARATOR: &str = "*~*";

/// Immutable key/value launch configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaunchInfo {
    entries: BTreeMap<String, String>,
}

impl LaunchInfo {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// Read the launch data appended to `path`.
    pub fn read_from_binary(path: &Path) -> Result<Self, LaunchInfoError> {
        let bytes = fs::read(path).map_err(|source| LaunchInfoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.len() < SIZE_FIELD_LEN {
            return Err(LaunchInfoError::Truncated {
                path: path.to_path_buf(),
                len: bytes.len() as u64,
            });
        }
        let info = Self::parse(&bytes)?;
        debug!(
            target: "dotnet_launcher::launch_info",
            path = %path.display(),
            keys = ?info.entries.keys().collect::<Vec<_>>(),
            "Read launch data"
        );
        Ok(info)
    }

    /// Parse a buffer whose tail is the launch data region plus its size field.
    pub fn parse(bytes: &[u8]) -> Result<Self, LaunchInfoError> {
        let len = bytes.len() as u64;
        let size_start = bytes
            .len()
            .checked_sub(SIZE_FIELD_LEN)
            .ok_or(LaunchInfoError::InvalidSize { size: 0, len })?;
        let mut size_bytes = [0u8; SIZE_FIELD_LEN];
        size_bytes.copy_from_slice(&bytes[size_start..]);
        let size = i64::from_le_bytes(size_bytes);

        let data_len = usize::try_from(size)
            .ok()
            .filter(|data_len| *data_len <= size_start)
            .ok_or(LaunchInfoError::InvalidSize { size, len })?;
        let data_start = size_start - data_len;

        let mut entries = BTreeMap::new();
        let data = &bytes[data_start..size_start];
        let mut offset = 0;
        while offset < data.len() {
            let entry_end = data[offset..]
                .iter()
                .position(|b| *b == 0)
                .map(|pos| offset + pos)
                .unwrap_or(data.len());
            let entry = &data[offset..entry_end];
            let equals = entry
                .iter()
                .position(|b| *b == b'=')
                .ok_or(LaunchInfoError::MissingSeparator {
                    offset: data_start + offset,
                })?;
            let key = decode(&entry[..equals], data_start + offset)?;
            let value = decode(&entry[equals + 1..], data_start + offset + equals + 1)?;
            entries.insert(key, value);
            offset = entry_end + 1;
        }

        Ok(Self { entries })
    }

    /// Encode entries as the launch data region plus its size field.
    pub fn encode(&self) -> Result<Vec<u8>, LaunchInfoError> {
        let mut data = Vec::new();
        for (key, value) in &self.entries {
            if key.is_empty() || key.contains(|c: char| c == '=' || c == '\0') {
                return Err(LaunchInfoError::InvalidKey { key: key.clone() });
            }
            if value.contains('\0') {
                return Err(LaunchInfoError::InvalidValue { key: key.clone() });
            }
            data.extend_from_slice(key.as_bytes());
            data.push(b'=');
            data.extend_from_slice(value.as_bytes());
            data.push(0);
        }
        let size = data.len() as i64;
        data.extend_from_slice(&size.to_le_bytes());
        Ok(data)
    }

    /// Append encoded launch data to the end of `path`.
    pub fn append_to_binary(&self, path: &Path) -> Result<(), LaunchInfoError> {
        let encoded = self.encode()?;
        let io_error = |source| LaunchInfoError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(io_error)?;
        file.write_all(&encoded).map_err(io_error)?;
        file.flush().map_err(io_error)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up a key that the launch cannot proceed without.
    pub fn require(&self, key: &'static str) -> Result<&str, LaunchError> {
        self.get(key).ok_or(LaunchError::MissingKey { key })
    }

    /// Split a `*~*` separated value. Missing keys and empty values yield no items.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(value) if !value.is_empty() => {
                value.split(LIST_SEPARATOR).map(str::to_string).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl FromIterator<(String, String)> for LaunchInfo {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn decode(bytes: &[u8], offset: usize) -> Result<String, LaunchInfoError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| LaunchInfoError::InvalidUtf8 { offset })
}
