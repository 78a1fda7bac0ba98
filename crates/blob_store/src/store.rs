use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::codec::{Codec, TypedFile};
use crate::error::StoreError;
use crate::lock::NameLocks;
use crate::path::{is_temp_name, name_to_path, name_to_temp, FileName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

/// How line breaks in stored content are treated on read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineMode {
    /// Every `\n`, `\r` and `\r\n` is dropped and the lines are concatenated.
    ///
    /// This is lossless for JSON, which never contains raw line breaks inside strings.
    #[default]
    Joined,

    /// Content is returned exactly as stored.
    Verbatim,
}

impl LineMode {
    pub fn apply(self, mut text: String) -> String {
        if let LineMode::Joined = self {
            text.retain(|c| c != '\n' && c != '\r');
        }

        text
    }
}

/// How a write replaces the previous content of a file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStrategy {
    /// Delete the old file, create a new one and write into it.
    ///
    /// A failure part way through can leave the file missing or truncated.
    #[default]
    Replace,

    /// Write into a hidden sibling file, sync it, then rename it over the target.
    Atomic,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {what} {value:?}, expected one of: {expected}")]
pub struct ParseModeError {
    what: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for LineMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "joined" => Ok(LineMode::Joined),
            "verbatim" => Ok(LineMode::Verbatim),
            _ => Err(ParseModeError {
                what: "line mode",
                value: s.to_owned(),
                expected: "joined, verbatim",
            }),
        }
    }
}

impl FromStr for WriteStrategy {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(WriteStrategy::Replace),
            "atomic" => Ok(WriteStrategy::Atomic),
            _ => Err(ParseModeError {
                what: "write strategy",
                value: s.to_owned(),
                expected: "replace, atomic",
            }),
        }
    }
}

#[derive(Debug)]
struct StoreInner {
    root: PathBuf,
    line_mode: LineMode,
    write_strategy: WriteStrategy,
    locks: NameLocks,
}

/// Text blobs stored as one file per name inside a single directory.
///
/// The directory is fixed at construction and created on the first write.
/// Clones share the same directory and per-name locks, so concurrent operations
/// on one name through any clone are serialized. Separate stores pointing at the
/// same directory are not coordinated with each other.
#[derive(Debug, Clone)]
pub struct FileStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug, Clone)]
pub struct FileStoreBuilder {
    root: PathBuf,
    line_mode: LineMode,
    write_strategy: WriteStrategy,
}

impl FileStoreBuilder {
    pub fn line_mode(mut self, line_mode: LineMode) -> Self {
        self.line_mode = line_mode;
        self
    }

    pub fn write_strategy(mut self, write_strategy: WriteStrategy) -> Self {
        self.write_strategy = write_strategy;
        self
    }

    pub fn build(self) -> FileStore {
        FileStore {
            inner: Arc::new(StoreInner {
                root: self.root,
                line_mode: self.line_mode,
                write_strategy: self.write_strategy,
                locks: NameLocks::default(),
            }),
        }
    }
}

impl FileStore {
    /// Store rooted at `root`, joining lines on read and replacing files in place.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore::builder(root).build()
    }

    pub fn builder(root: impl Into<PathBuf>) -> FileStoreBuilder {
        FileStoreBuilder {
            root: root.into(),
            line_mode: LineMode::default(),
            write_strategy: WriteStrategy::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    pub fn line_mode(&self) -> LineMode {
        self.inner.line_mode
    }

    pub fn write_strategy(&self) -> WriteStrategy {
        self.inner.write_strategy
    }

    /// Full path a name is stored at.
    pub fn path_of(&self, name: &FileName) -> PathBuf {
        let mut path = self.inner.root.clone();
        name_to_path(name, &mut path);
        path
    }

    /// Binds `name` to a codec so values of `T` can be saved and loaded directly.
    pub fn typed<T, C: Codec<T>>(&self, name: &str, codec: C) -> Result<TypedFile<T, C>, StoreError> {
        Ok(TypedFile::new(self.clone(), FileName::new(name)?, codec))
    }

    /// Replaces the content of `name` with the UTF-8 bytes of `value`,
    /// creating the storage directory first if needed.
    pub fn write(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.write_name(&FileName::new(name)?, value)
    }

    /// Reads `name` back, returning `None` if it was never written.
    pub fn read(&self, name: &str) -> Result<Option<String>, StoreError> {
        match self.load(name) {
            Ok(value) => Ok(Some(value)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Deletes `name`, returning whether it existed.
    pub fn remove(&self, name: &str) -> Result<bool, StoreError> {
        let name = FileName::new(name)?;
        let path = self.path_of(&name);

        self.inner.locks.with(&name, || match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("Removed file: {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Delete { path, source }),
        })
    }

    pub fn exists(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.path_of(&FileName::new(name)?);

        path.try_exists().map_err(|source| StoreError::Read { path, source })
    }

    /// Names of all stored files, sorted. A missing directory lists as empty.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let root = &self.inner.root;

        let read_err = |source| StoreError::Read {
            path: root.clone(),
            source,
        };

        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_err(e)),
        };

        let mut names = Vec::new();

        for entry in entries {
            let entry = entry.map_err(read_err)?;

            // follows symlinks, same as `read`; dangling links are skipped
            match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(read_err(e)),
            }

            match entry.file_name().into_string() {
                Ok(name) if !is_temp_name(&name) => names.push(name),
                Ok(_) => {}
                Err(name) => log::trace!("Skipping non-UTF8 entry: {name:?}"),
            }
        }

        names.sort_unstable();

        Ok(names)
    }

    pub(crate) fn write_name(&self, name: &FileName, value: &str) -> Result<(), StoreError> {
        let path = self.path_of(name);

        self.inner.locks.with(name, || {
            self.create_root()?;

            match self.inner.write_strategy {
                WriteStrategy::Replace => write_replace(&path, value.as_bytes()),
                WriteStrategy::Atomic => {
                    let mut temp = self.inner.root.clone();
                    name_to_temp(name, &mut temp);

                    write_atomic(&temp, &path, value.as_bytes())
                }
            }
        })
    }

    /// Like [`FileStore::read`], but a missing file is reported as [`StoreError::NotFound`].
    pub fn load(&self, name: &str) -> Result<String, StoreError> {
        self.load_name(&FileName::new(name)?)
    }

    pub(crate) fn load_name(&self, name: &FileName) -> Result<String, StoreError> {
        let path = self.path_of(name);

        let bytes = self.inner.locks.with(name, || read_file(&path))?;

        match String::from_utf8(bytes) {
            Ok(text) => Ok(self.inner.line_mode.apply(text)),
            Err(source) => Err(StoreError::Decode { path, source }),
        }
    }

    fn create_root(&self) -> Result<(), StoreError> {
        let root = &self.inner.root;

        if !root.is_dir() {
            log::debug!("Creating storage directory: {}", root.display());
        }

        fs::create_dir_all(root).map_err(|source| StoreError::CreateDir {
            path: root.clone(),
            source,
        })
    }
}

impl FileStore {
    pub async fn write_async(&self, name: impl Into<String>, value: impl Into<String>) -> Result<(), StoreError> {
        let (store, name, value) = (self.clone(), name.into(), value.into());

        tokio::task::spawn_blocking(move || store.write(&name, &value)).await?
    }

    pub async fn read_async(&self, name: impl Into<String>) -> Result<Option<String>, StoreError> {
        let (store, name) = (self.clone(), name.into());

        tokio::task::spawn_blocking(move || store.read(&name)).await?
    }

    pub async fn remove_async(&self, name: impl Into<String>) -> Result<bool, StoreError> {
        let (store, name) = (self.clone(), name.into());

        tokio::task::spawn_blocking(move || store.remove(&name)).await?
    }

    pub async fn list_async(&self) -> Result<Vec<String>, StoreError> {
        let store = self.clone();

        tokio::task::spawn_blocking(move || store.list()).await?
    }
}

pub fn open_sync(path: &Path, mode: OpenMode) -> io::Result<File> {
    let mut options = OpenOptions::new();
    let _ = match mode {
        OpenMode::Read => options.read(true),
        OpenMode::Write => options.write(true).create(true).truncate(true),
    };

    log::trace!("Synchronously opening file: {} in mode: {mode:?}", path.display());

    options.open(path)
}

fn write_replace(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("Replacing existing file: {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Delete {
                path: path.to_owned(),
                source,
            })
        }
    }

    let mut file = open_sync(path, OpenMode::Write).map_err(|source| StoreError::Create {
        path: path.to_owned(),
        source,
    })?;

    file.write_all(bytes).and_then(|_| file.flush()).map_err(|source| StoreError::Write {
        path: path.to_owned(),
        source,
    })
}

fn write_atomic(temp: &Path, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = open_sync(temp, OpenMode::Write).map_err(|source| StoreError::Create {
        path: temp.to_owned(),
        source,
    })?;

    let res = file
        .write_all(bytes)
        .and_then(|_| file.sync_all())
        .map_err(|source| StoreError::Write {
            path: temp.to_owned(),
            source,
        });

    drop(file);

    let res = res.and_then(|_| {
        fs::rename(temp, path).map_err(|source| StoreError::Write {
            path: path.to_owned(),
            source,
        })
    });

    if res.is_err() {
        let _ = fs::remove_file(temp);
    }

    res
}

fn read_file(path: &Path) -> Result<Vec<u8>, StoreError> {
    let mut file = match open_sync(path, OpenMode::Read) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound { path: path.to_owned() });
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_owned(),
                source,
            })
        }
    };

    let mut buf = Vec::new();
    file.read_to_end(&mut buf).map_err(|source| StoreError::Read {
        path: path.to_owned(),
        source,
    })?;

    Ok(buf)
}
