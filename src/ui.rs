//! UI utilities for consistent terminal output formatting.
//!
//! Summaries go to stdout; error boxes and failure details go to stderr.

use std::path::Path;
use std::time::Duration;

use crate::constants::FAILURE_LOG_TAIL_LINES;
use crate::harness::{ClientOutcome, RunReport, Verdict};
use crate::process::tail_log;
use crate::utils::format_duration;

/// Width of error box separators.
const ERROR_BOX_WIDTH: usize = 60;

/// Print an error box with a title and optional detail.
///
/// Outputs:
/// ```text
/// ============================================================
/// Run Failed
/// ============================================================
///
/// <detail>
/// ```
pub fn print_error_box(title: &str, detail: Option<&str>) {
    eprintln!("\n{}", "=".repeat(ERROR_BOX_WIDTH));
    eprintln!("{title}");
    eprintln!("{}", "=".repeat(ERROR_BOX_WIDTH));

    if let Some(detail) = detail
        && !detail.is_empty()
    {
        eprintln!("\n{detail}");
    }
}

/// One line per finished client, printed as the barrier observes it.
#[must_use]
pub fn client_line(outcome: &ClientOutcome) -> String {
    let mark = if outcome.succeeded() { "ok  " } else { "FAIL" };
    let elapsed = outcome
        .elapsed_ms
        .map(|ms| format_duration(Duration::from_millis(ms)))
        .unwrap_or_default();

    format!(
        "  {mark} #{:<4} {} ({}, {elapsed})",
        outcome.index, outcome.file_name, outcome.status
    )
}

/// Print the end-of-run summary.
pub fn print_summary(report: &RunReport) {
    let total = report.clients.len();
    let verdict = match report.verdict() {
        Verdict::Passed => "PASSED",
        Verdict::LaunchFailed => "LAUNCH FAILED",
        Verdict::ClientsFailed => "CLIENTS FAILED",
        Verdict::ServerFailed => "SERVER FAILED",
    };

    println!();
    println!("Variant:  {} (pid {})", report.variant, report.server.pid);
    println!(
        "Clients:  {}/{total} succeeded",
        report.succeeded_count()
    );
    println!(
        "Server:   {} ({:?})",
        report.server.status, report.server.stop
    );
    println!(
        "Duration: {}",
        format_duration(Duration::from_millis(report.duration_ms))
    );
    println!("Result:   {verdict}");
}

/// Print an error box for every failed child, with the tail of its log when
/// output was captured.
pub fn print_failures(report: &RunReport) {
    if let Some(failure) = &report.launch_failure {
        let title = format!(
            "Client #{} ({}) could not be launched",
            failure.index, failure.file_name
        );
        let detail = format!(
            "{}\n\nLater fixtures were not launched; {} client(s) ran.",
            failure.error,
            report.clients.len()
        );
        print_error_box(&title, Some(&detail));
    }

    for client in report.failed_clients() {
        let title = format!(
            "Client #{} ({}) failed: {}",
            client.index, client.file_name, client.status
        );
        print_error_box(&title, log_excerpt(client.log_path.as_deref()).as_deref());
    }

    if !report.server.is_clean() {
        let title = format!(
            "Server did not stop cleanly: {} ({:?})",
            report.server.status, report.server.stop
        );
        print_error_box(&title, log_excerpt(report.server.log_path.as_deref()).as_deref());
    }
}

fn log_excerpt(path: Option<&Path>) -> Option<String> {
    let path = path?;
    match tail_log(path, FAILURE_LOG_TAIL_LINES) {
        Ok(lines) if lines.is_empty() => Some(format!("{} is empty", path.display())),
        Ok(lines) => Some(format!(
            "Last {} lines of {}:\n{}",
            lines.len(),
            path.display(),
            lines.join("\n")
        )),
        Err(e) => Some(format!("{e:#}")),
    }
}
