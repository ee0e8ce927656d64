mod runner;

use std::process::ExitCode;

use color_eyre::eyre::Report;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;

const LOG_ENV_NAME: &str = "SUFC_LOG";

fn main() -> Result<ExitCode, Report> {
    color_eyre::install()?;

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_ENV_NAME)
        .from_env_lossy();

    // stdout carries the dumps, so logging goes to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(runner::prepare_and_run())
}
