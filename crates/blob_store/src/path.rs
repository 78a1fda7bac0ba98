use std::fmt;
use std::path::PathBuf;

use crate::error::StoreError;

/// Longest accepted name, in bytes. Leaves room for the temporary-file affix
/// used by atomic writes within the usual 255-byte filesystem limit.
pub const MAX_NAME_LEN: usize = 250;

const TEMP_PREFIX: &str = ".";
const TEMP_SUFFIX: &str = ".tmp";

/// A caller-supplied file name, checked to be a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct FileName(String);

impl FileName {
    pub fn new(name: impl Into<String>) -> Result<Self, StoreError> {
        let name = name.into();

        match invalid_reason(&name) {
            Some(reason) => Err(StoreError::InvalidName { name, reason }),
            None => Ok(FileName(name)),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid_reason(name: &str) -> Option<&'static str> {
    Some(match name {
        "" => "name is empty",
        "." | ".." => "name refers to a directory",
        _ if name.len() > MAX_NAME_LEN => "name is too long",
        _ if name.contains(['/', '\\']) => "name contains a path separator",
        _ if name.contains('\0') => "name contains a NUL byte",
        _ if is_temp_name(name) => "name is reserved for staging atomic writes",
        _ => return None,
    })
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn name_to_path(name: &FileName, buf: &mut PathBuf) {
    buf.push(name.as_str());
}

/// Sibling path an atomic write stages its content in before renaming.
pub fn name_to_temp(name: &FileName, buf: &mut PathBuf) {
    let mut temp = String::with_capacity(TEMP_PREFIX.len() + name.0.len() + TEMP_SUFFIX.len());
    temp.push_str(TEMP_PREFIX);
    temp.push_str(&name.0);
    temp.push_str(TEMP_SUFFIX);

    buf.push(temp);
}

/// Whether a name belongs to the staging area of atomic writes.
///
/// Such names are never valid [`FileName`]s, so a staging file can not collide with stored data.
pub fn is_temp_name(name: &str) -> bool {
    name.len() > TEMP_PREFIX.len() + TEMP_SUFFIX.len() && name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)
}
