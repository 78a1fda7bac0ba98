use crate::error::StoreError;
use crate::store::FileStore;

/// Receives failures the caller never sees.
pub trait ErrorReporter: Send + Sync {
    fn capture(&self, err: &StoreError);
}

/// Logs every failure. A missing file is only worth a debug line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn capture(&self, err: &StoreError) {
        if err.is_not_found() {
            log::debug!("{err}");
        } else {
            log::error!(kind = ?err.kind(), "Storage error: {err}");
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn capture(&self, _err: &StoreError) {}
}

impl<F> ErrorReporter for F
where
    F: Fn(&StoreError) + Send + Sync,
{
    fn capture(&self, err: &StoreError) {
        self(err)
    }
}

/// Fire-and-forget access to a [`FileStore`].
///
/// Writes return nothing and reads return `None` on any failure, including a missing
/// file. Every failure is handed to the reporter exactly once and then dropped, so
/// callers cannot tell a failed write from a successful one.
#[derive(Debug, Clone)]
pub struct ReportingStore<R = TracingReporter> {
    store: FileStore,
    reporter: R,
}

impl ReportingStore {
    pub fn with_tracing(store: FileStore) -> Self {
        ReportingStore::new(store, TracingReporter)
    }
}

impl<R: ErrorReporter> ReportingStore<R> {
    pub fn new(store: FileStore, reporter: R) -> Self {
        ReportingStore { store, reporter }
    }

    pub fn set_data(&self, name: &str, value: &str) {
        if let Err(e) = self.store.write(name, value) {
            self.reporter.capture(&e);
        }
    }

    pub fn get_data(&self, name: &str) -> Option<String> {
        match self.store.load(name) {
            Ok(value) => Some(value),
            Err(e) => {
                self.reporter.capture(&e);
                None
            }
        }
    }
}
