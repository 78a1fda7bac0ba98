use std::io;
use std::path::{Path, PathBuf};

use crate::codec::CodecError;

/// Coarse classification of a [`StoreError`], for callers deciding on retry or fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidName,
    CreateDir,
    Delete,
    Create,
    Write,
    NotFound,
    Read,
    Decode,
    Codec,
    Join,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid file name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Unable to create storage directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Unable to delete {}: {source}", .path.display())]
    Delete { path: PathBuf, source: io::Error },

    #[error("Unable to create {}: {source}", .path.display())]
    Create { path: PathBuf, source: io::Error },

    #[error("Write Error on {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Read Error on {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("UTF8 Parse Error in {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },

    #[error("Codec Error for {name}: {source}")]
    Codec { name: String, source: CodecError },

    #[error("Join Error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl StoreError {
    #[rustfmt::skip]
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidName { .. }  => ErrorKind::InvalidName,
            StoreError::CreateDir { .. }    => ErrorKind::CreateDir,
            StoreError::Delete { .. }       => ErrorKind::Delete,
            StoreError::Create { .. }       => ErrorKind::Create,
            StoreError::Write { .. }        => ErrorKind::Write,
            StoreError::NotFound { .. }     => ErrorKind::NotFound,
            StoreError::Read { .. }         => ErrorKind::Read,
            StoreError::Decode { .. }       => ErrorKind::Decode,
            StoreError::Codec { .. }        => ErrorKind::Codec,
            StoreError::Join(_)             => ErrorKind::Join,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Path of the file or directory involved, if the error came from the filesystem.
    pub fn path(&self) -> Option<&Path> {
        match self {
            | StoreError::CreateDir { path, .. }
            | StoreError::Delete { path, .. }
            | StoreError::Create { path, .. }
            | StoreError::Write { path, .. }
            | StoreError::NotFound { path }
            | StoreError::Read { path, .. }
            | StoreError::Decode { path, .. } => Some(path.as_path()),
            _ => None,
        }
    }
}
