//! Per-child log files.
//!
//! When a log directory is configured every child writes stdout and stderr
//! to its own file, and failed clients can be diagnosed by reading the tail
//! of that file.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::HarnessError;

/// Create the log directory if needed.
///
/// # Errors
///
/// Returns [`HarnessError::Config`] if the directory cannot be created.
pub fn prepare_log_dir(dir: &Path) -> crate::error::Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        HarnessError::config(format!(
            "failed to create log directory {}: {e}",
            dir.display()
        ))
    })
}

#[must_use]
pub fn server_log_path(dir: &Path) -> PathBuf {
    dir.join("server.log")
}

/// Log path for one client, e.g. `client-0007-my_book.pdf.log`.
#[must_use]
pub fn client_log_path(dir: &Path, index: usize, file_name: &str) -> PathBuf {
    dir.join(format!("client-{index:04}-{}.log", sanitize(file_name)))
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Reads the last N lines from a log file.
pub fn tail_log(log_path: &Path, lines: usize) -> Result<Vec<String>> {
    let file = File::open(log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    let reader = BufReader::new(file);
    let all_lines: Vec<String> = reader
        .lines()
        .collect::<std::io::Result<_>>()
        .context("Failed to read log file")?;

    let start = all_lines.len().saturating_sub(lines);
    Ok(all_lines[start..].to_vec())
}
