//! Path string helpers shared by the resolver and the argument rewriter.
//!
//! Launch data comes from Windows and Unix builds alike, so these helpers treat
//! both `/` and `\` as separators regardless of the host platform.

use std::path::Path;

/// Returns true if the path is non-empty and absolute.
pub fn is_nonempty_absolute(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.is_absolute()
}

/// Returns true for `C:\...`, `C:/...` and `\\server\...` style paths.
pub fn is_windows_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    let drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/');
    drive || path.starts_with("\\\\")
}

/// Byte index where the final path component starts.
fn file_name_start(path: &str) -> usize {
    path.rfind(|c: char| c == '/' || c == '\\').map(|idx| idx + 1).unwrap_or(0)
}

/// True when the path has no directory component.
pub fn is_bare_name(path: &str) -> bool {
    file_name_start(path) == 0
}

/// Remove the extension of the final component, if any.
///
/// Leading dots are not extensions, so `.hidden` is returned unchanged.
pub fn strip_extension(path: &str) -> &str {
    let start = file_name_start(path);
    match path[start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..start + dot],
        _ => path,
    }
}

/// Replace the extension of the final component with `extension` (no leading dot).
pub fn with_extension(path: &str, extension: &str) -> String {
    format!("{}.{}", strip_extension(path), extension)
}
