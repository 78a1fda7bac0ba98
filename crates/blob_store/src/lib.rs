//! Small text blobs kept as one file per name inside a single storage directory.
//!
//! [`FileStore`] is the primary interface and reports every failure through [`StoreError`].
//! [`ReportingStore`] keeps the older fire-and-forget contract, handing failures to an
//! [`ErrorReporter`] instead of the caller.

#![allow(clippy::redundant_pattern_matching, clippy::identity_op, clippy::redundant_closure)]
#![deny(deprecated)]

extern crate tracing as log;

pub mod codec;
pub mod error;
pub mod lock;
pub mod path;
pub mod report;
pub mod store;

pub use codec::{Codec, CodecError, FnCodec, JsonCodec, TypedFile};
pub use error::{ErrorKind, StoreError};
pub use path::FileName;
pub use report::{ErrorReporter, NoopReporter, ReportingStore, TracingReporter};
pub use store::{FileStore, FileStoreBuilder, LineMode, ParseModeError, WriteStrategy};
