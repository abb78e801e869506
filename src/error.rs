//! Harness error types.
//!
//! Every failure the harness can observe is one of these variants. Discovery
//! and configuration errors happen before any process exists; launch and
//! readiness errors abort the run early; child exit statuses are collected by
//! the completion barrier and only turned into [`HarnessError::ClientsFailed`]
//! once every client has been joined.

use std::path::PathBuf;
use std::time::Duration;

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HarnessError {
    /// Invalid or missing run parameters.
    #[error("configuration error: {0}")]
    Config(String),

    /// The content root (or an entry below it) could not be read.
    #[error("cannot read {path:?}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fixture glob could not be built from the content root.
    #[error("invalid fixture pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    /// A child process could not be created.
    #[error("failed to launch {role} ({program}): {source}")]
    Launch {
        role: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The server never accepted a connection within the probe budget.
    #[error("server at {target} not ready after {attempts} attempts ({elapsed:?}): {reason}")]
    Readiness {
        target: String,
        attempts: u32,
        elapsed: Duration,
        reason: String,
    },

    /// The server terminated before it became ready.
    #[error("server exited before becoming ready: {status}")]
    ServerExitedEarly { status: String },

    /// Waiting on a child failed at the OS level.
    #[error("failed to wait for {role} (pid {pid}): {source}")]
    Wait {
        role: String,
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    /// Delivering a stop signal to a child failed.
    #[error("failed to signal pid {pid}: {reason}")]
    Signal { pid: u32, reason: String },

    /// At least one client terminated unsuccessfully.
    #[error("{failed} of {total} clients failed (first: {first})")]
    ClientsFailed {
        failed: usize,
        total: usize,
        first: String,
    },
}

impl HarnessError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn discovery(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Discovery {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors raised before any process was launched.
    #[must_use]
    pub const fn is_pre_launch(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Discovery { .. } | Self::Pattern { .. }
        )
    }
}
