#![cfg_attr(not(debug_assertions), allow(unused_mut, unused_variables, unused_imports))]
#![allow(clippy::redundant_pattern_matching, clippy::identity_op, clippy::redundant_closure)]
#![deny(deprecated)]

extern crate tracing as log;

use std::process::ExitCode;

pub mod cli;
pub mod commands;
pub mod config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();

    let args = cli::CliOptions::parse()?;

    // temporary logger until the log directory is known
    let (dispatch, _) = common::logging::generate(args.verbose, None)?;
    let _log_guard = log::dispatcher::set_default(&dispatch);

    log::debug!("Arguments: {:?}", args);

    let Some(command) = args.command else {
        log::error!("No command given, see `blobctl --help`");
        return Ok(ExitCode::from(2));
    };

    let (generated, local) = config::load(&args.config).await?;

    if generated {
        log::debug!("No config file at {}, running with defaults", args.config.display());
    }

    drop(_log_guard);

    let (dispatch, _log_guard) = common::logging::generate(args.verbose, local.paths.log_dir())?;
    log::dispatcher::set_global_default(dispatch)?;

    let outcome = commands::run(command, &args.config, &local, &mut std::io::stdout().lock()).await?;

    drop(_log_guard);

    Ok(outcome.exit_code())
}
