//! Explicit per-type conversion between stored text and typed values.

use std::error::Error as StdError;
use std::fmt;
use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::StoreError;
use crate::path::FileName;
use crate::store::FileStore;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(Box<dyn StdError + Send + Sync>),
}

impl CodecError {
    pub fn custom(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        CodecError::Custom(err.into())
    }
}

pub trait Codec<T> {
    fn encode(&self, value: &T) -> Result<String, CodecError>;

    fn decode(&self, text: &str) -> Result<T, CodecError>;
}

/// `serde_json` codec. Compact by default.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec {
    pub pretty: bool,
}

impl JsonCodec {
    pub const fn pretty() -> Self {
        JsonCodec { pretty: true }
    }
}

impl<T: Serialize + DeserializeOwned> Codec<T> for JsonCodec {
    fn encode(&self, value: &T) -> Result<String, CodecError> {
        Ok(match self.pretty {
            true => serde_json::to_string_pretty(value)?,
            false => serde_json::to_string(value)?,
        })
    }

    fn decode(&self, text: &str) -> Result<T, CodecError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Codec assembled from a pair of functions.
#[derive(Clone, Copy)]
pub struct FnCodec<E, D> {
    encode: E,
    decode: D,
}

impl<E, D> FnCodec<E, D> {
    pub const fn new(encode: E, decode: D) -> Self {
        FnCodec { encode, decode }
    }
}

impl<E, D> fmt::Debug for FnCodec<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}

impl<T, E, D> Codec<T> for FnCodec<E, D>
where
    E: Fn(&T) -> Result<String, CodecError>,
    D: Fn(&str) -> Result<T, CodecError>,
{
    fn encode(&self, value: &T) -> Result<String, CodecError> {
        (self.encode)(value)
    }

    fn decode(&self, text: &str) -> Result<T, CodecError> {
        (self.decode)(text)
    }
}

/// A single named file holding values of `T`.
pub struct TypedFile<T, C> {
    store: FileStore,
    name: FileName,
    codec: C,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C: fmt::Debug> fmt::Debug for TypedFile<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedFile")
            .field("root", &self.store.root())
            .field("name", &self.name)
            .field("codec", &self.codec)
            .finish()
    }
}

impl<T, C: Codec<T>> TypedFile<T, C> {
    pub(crate) fn new(store: FileStore, name: FileName, codec: C) -> Self {
        TypedFile {
            store,
            name,
            codec,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &FileName {
        &self.name
    }

    pub fn save(&self, value: &T) -> Result<(), StoreError> {
        let text = self.codec.encode(value).map_err(|source| self.codec_error(source))?;

        self.store.write_name(&self.name, &text)
    }

    pub fn load(&self) -> Result<Option<T>, StoreError> {
        let text = match self.store.load_name(&self.name) {
            Ok(text) => text,
            Err(StoreError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        match self.codec.decode(&text) {
            Ok(value) => Ok(Some(value)),
            Err(source) => Err(self.codec_error(source)),
        }
    }

    fn codec_error(&self, source: CodecError) -> StoreError {
        StoreError::Codec {
            name: self.name.as_str().to_owned(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::error::ErrorKind;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        id: u64,
        name: String,
        tags: Vec<String>,
    }

    fn profile() -> Profile {
        Profile {
            id: 1,
            name: "Zen".to_owned(),
            tags: vec!["anime".to_owned(), "manga".to_owned()],
        }
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let file = store.typed::<Profile, _>("profile.json", JsonCodec::default()).unwrap();
        assert_eq!(file.load().unwrap(), None);

        file.save(&profile()).unwrap();
        assert_eq!(file.load().unwrap(), Some(profile()));
        assert_eq!(
            store.read("profile.json").unwrap().as_deref(),
            Some(r#"{"id":1,"name":"Zen","tags":["anime","manga"]}"#)
        );
    }

    #[test]
    fn test_pretty_json_survives_joined_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let file = store.typed::<Profile, _>("profile.json", JsonCodec::pretty()).unwrap();
        file.save(&profile()).unwrap();

        assert_eq!(file.load().unwrap(), Some(profile()));
    }

    #[test]
    fn test_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.write("profile.json", "{not json").unwrap();

        let file = store.typed::<Profile, _>("profile.json", JsonCodec::default()).unwrap();
        assert_eq!(file.load().unwrap_err().kind(), ErrorKind::Codec);
    }

    #[test]
    fn test_fn_codec() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let codec = FnCodec::new(
            |v: &u32| -> Result<String, CodecError> { Ok(v.to_string()) },
            |s: &str| s.parse::<u32>().map_err(CodecError::custom),
        );

        let counter = store.typed::<u32, _>("counter", codec).unwrap();
        counter.save(&41).unwrap();
        assert_eq!(counter.load().unwrap(), Some(41));

        store.write("counter", "forty-two").unwrap();
        assert_eq!(counter.load().unwrap_err().kind(), ErrorKind::Codec);
    }

    #[test]
    fn test_invalid_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let err = store.typed::<Profile, _>("a/b.json", JsonCodec::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidName);
    }
}
