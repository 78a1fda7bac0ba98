use std::path::PathBuf;

use log::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{Layer, Subscriber},
    layer::SubscriberExt,
};

/// Prefix of the daily-rotated log files written when a log directory is configured.
pub const LOG_FILE_PREFIX: &str = "blobctl.log";

pub fn level_for(verbose: Option<u8>) -> (LevelFilter, bool) {
    #[allow(clippy::wildcard_in_or_patterns)]
    match verbose {
        None | Some(0) => (LevelFilter::INFO, false),
        Some(1) => (LevelFilter::DEBUG, false),
        Some(2) => (LevelFilter::TRACE, false),
        Some(3) | _ => (LevelFilter::TRACE, true),
    }
}

fn create_filter(verbose: Option<u8>) -> anyhow::Result<EnvFilter> {
    let (level_filter, extreme_trace) = level_for(verbose);

    let mut filter = EnvFilter::from_default_env().add_directive(level_filter.into());

    // every file open is traced, which drowns everything else out
    if !extreme_trace {
        filter = filter.add_directive("blob_store::store=debug".parse()?);
    }

    Ok(filter)
}

/// Builds the global subscriber. Console output goes to stderr so that command output
/// on stdout stays clean; with `dir` set, a copy is also written to a daily-rotated file.
///
/// The returned guard must be kept alive until shutdown to flush the file writer.
pub fn generate(
    verbose: Option<u8>,
    dir: Option<PathBuf>,
) -> Result<(Dispatch, Option<WorkerGuard>), anyhow::Error> {
    let filter = create_filter(verbose)?;

    Ok(match dir {
        None => (
            Dispatch::new(Subscriber::builder().with_env_filter(filter).with_writer(std::io::stderr).finish()),
            None,
        ),
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let file_logger = Layer::new().with_writer(non_blocking).with_ansi(false);
            let stderr_logger = Layer::new().with_writer(std::io::stderr);

            let collector = tracing_subscriber::registry().with(filter).with(file_logger).with(stderr_logger);

            (Dispatch::new(collector), Some(guard))
        }
    })
}
