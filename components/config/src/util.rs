use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Parses an environment value, ignoring surrounding whitespace.
pub fn parse<T: FromStr>(value: &str) -> Result<T, T::Err> {
    value.trim().parse()
}

/// Treats an empty path as "not configured".
pub fn non_empty(path: &Path) -> Option<PathBuf> {
    match path.as_os_str().is_empty() {
        true => None,
        false => Some(path.to_path_buf()),
    }
}
