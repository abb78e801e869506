//! Types describing a child process: how to launch it and how it ended.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::error::{HarnessError, Result};

/// Program plus arguments for one child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Build a command from a configured argv prefix and positional arguments.
    ///
    /// The first prefix element is the program; the rest are leading
    /// arguments placed before `positional`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] if the prefix is empty.
    pub fn from_prefix(prefix: &[String], positional: Vec<String>) -> Result<Self> {
        let (program, leading) = prefix
            .split_first()
            .ok_or_else(|| HarnessError::config("command cannot be empty"))?;

        let mut args = leading.to_vec();
        args.extend(positional);

        Ok(Self {
            program: program.clone(),
            args,
        })
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// What a child is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ProcessRole {
    Server,
    Client { index: usize, file_name: String },
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Client { index, file_name } => write!(f, "client #{index} ({file_name})"),
        }
    }
}

/// Where a child's stdout and stderr go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildOutput {
    /// Share the harness's stdio.
    Inherit,
    Null,
    /// Both streams appended to one file.
    File(PathBuf),
}

/// Termination status of a child, captured once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TerminationStatus {
    Pending,
    Exited { code: i32 },
    Signaled { signal: i32 },
    /// The OS wait itself failed; the child is treated as finished.
    WaitFailed { reason: String },
}

impl TerminationStatus {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Exited { code: 0 })
    }
}

impl From<ExitStatus> for TerminationStatus {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Exited { code };
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signaled { signal };
            }
        }

        Self::Exited { code: -1 }
    }
}

impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "still running"),
            Self::Exited { code } => write!(f, "exit code {code}"),
            Self::Signaled { signal } => write!(f, "killed by signal {signal}"),
            Self::WaitFailed { reason } => write!(f, "wait failed: {reason}"),
        }
    }
}
