//! Run the load test.
//!
//! Loads and validates the configuration, then drives one full run: server
//! start, client swarm, completion barrier, settle and server join.
//! Ctrl-C drops the run, which kills every child still alive.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

use xferload::config::{ConfigOverrides, HarnessConfig};
use xferload::harness::{self, ClientOutcome, Verdict};
use xferload::ui;
use xferload::utils::format_bytes;

/// How a completed `run` command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    /// Not every fixture got a client.
    LaunchFailed,
    ChildFailed,
    Interrupted,
}

/// Execute one run and print its summary, or the JSON report with `json`.
pub async fn execute(
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
    json: bool,
) -> Result<RunStatus> {
    let (config, validation) =
        HarnessConfig::build(config_path, overrides).context("Invalid configuration")?;

    for warning in &validation.warnings {
        warn!("{warning}");
    }

    if !json {
        print_banner(&config);
    }

    let progress = |outcome: &ClientOutcome| {
        if !json {
            println!("{}", ui::client_line(outcome));
        }
    };

    let report = tokio::select! {
        result = harness::run_with(&config, progress) => result.context("Load test aborted")?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted, stopping server and clients...");
            return Ok(RunStatus::Interrupted);
        },
    };

    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{out}");
    } else {
        ui::print_summary(&report);
        ui::print_failures(&report);
    }

    Ok(match report.verdict() {
        Verdict::Passed => RunStatus::Passed,
        Verdict::LaunchFailed => RunStatus::LaunchFailed,
        Verdict::ClientsFailed | Verdict::ServerFailed => RunStatus::ChildFailed,
    })
}

fn print_banner(config: &HarnessConfig) {
    println!(
        "Server {} on {}:{} ({})",
        config.server.join(" "),
        config.address,
        config.port,
        config.server_variant()
    );
    println!(
        "Clients {} for *.{} under {} (max transfer {})\n",
        config.client.join(" "),
        config.fixtures.extension,
        config.content_root.display(),
        format_bytes(config.max_transfer_size)
    );
}
