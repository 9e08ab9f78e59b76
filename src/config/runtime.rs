use crate::lib::errors::ConfigError;

/// Identifier meaning "use the runtime found on PATH".
pub const DEFAULT_SENTINEL_NAME: &str = "dotnet";
/// Suffix of compiled assemblies, without the leading dot.
pub const DEFAULT_ARTIFACT_EXTENSION: &str = "dll";
#[cfg(windows)]
pub const DEFAULT_FALLBACK_BINARY: &str = "dotnet.exe";
#[cfg(not(windows))]
pub const DEFAULT_FALLBACK_BINARY: &str = "dotnet";

/// Runtime lookup settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSection {
    pub sentinel_name: String,
    pub fallback_binary: String,
    pub artifact_extension: String,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            sentinel_name: DEFAULT_SENTINEL_NAME.to_string(),
            fallback_binary: DEFAULT_FALLBACK_BINARY.to_string(),
            artifact_extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
        }
    }
}

pub fn parse_runtime_section(
    sentinel_name: Option<String>,
    fallback_binary: Option<String>,
    artifact_extension: Option<String>,
    source_name: &str,
) -> Result<RuntimeSection, ConfigError> {
    let sentinel_name = sentinel_name.unwrap_or_else(|| DEFAULT_SENTINEL_NAME.to_string());
    validate_non_empty(&sentinel_name, "sentinel_name", source_name)?;

    let fallback_binary = fallback_binary.unwrap_or_else(|| DEFAULT_FALLBACK_BINARY.to_string());
    validate_non_empty(&fallback_binary, "fallback_binary", source_name)?;

    let artifact_extension =
        artifact_extension.unwrap_or_else(|| DEFAULT_ARTIFACT_EXTENSION.to_string());
    validate_extension(&artifact_extension, source_name)?;

    Ok(RuntimeSection {
        sentinel_name,
        fallback_binary,
        artifact_extension,
    })
}

fn validate_non_empty(
    value: &str,
    field: &'static str,
    source_name: &str,
) -> Result<(), ConfigError> {
    if !value.trim().is_empty() {
        return Ok(());
    }

    Err(ConfigError::InvalidField {
        source_name: source_name.to_string(),
        field,
        message: "must not be empty".into(),
    })
}

fn validate_extension(extension: &str, source_name: &str) -> Result<(), ConfigError> {
    validate_non_empty(extension, "artifact_extension", source_name)?;
    if extension.starts_with('.') || extension.contains(|c: char| c == '/' || c == '\\') {
        return Err(ConfigError::InvalidField {
            source_name: source_name.to_string(),
            field: "artifact_extension",
            message: "use a bare extension such as `dll`, without dots or separators".into(),
        });
    }
    Ok(())
}
