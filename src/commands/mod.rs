//! CLI command implementations for xferload.
//!
//! - [`run`] - Full load-test run
//! - [`fixtures`] - Dry run listing the fixtures that would become clients

pub mod fixtures;
pub mod run;

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Initialize stderr logging.
///
/// `RUST_LOG` wins when set; otherwise `-v` raises the default `info` level
/// to `debug`, and `-vv` to `trace`. Logs go to stderr so that stdout only
/// carries the summary or the JSON report.
pub fn init_logging(verbose: u8, format: LogFormat) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}
