//! Owned handle to a launched child process.
//!
//! A [`ProcessHandle`] captures the child's termination status exactly once.
//! Every later [`ProcessHandle::wait`] returns the stored status immediately
//! instead of asking the OS about a process that has already been reaped.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tracing::debug;

use super::types::{ChildOutput, CommandSpec, ProcessRole, TerminationStatus};
use crate::error::{HarnessError, Result};

#[derive(Debug)]
pub struct ProcessHandle {
    role: ProcessRole,
    pid: u32,
    child: Child,
    status: TerminationStatus,
    spawned_at: Instant,
    elapsed: Option<Duration>,
    log_path: Option<PathBuf>,
}

impl ProcessHandle {
    /// Launch a child without waiting for it.
    ///
    /// The child is killed if the handle is dropped while still running, so
    /// an aborted run never leaks processes.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Launch`] if the log file cannot be created or
    /// the program cannot be started.
    pub fn spawn(spec: &CommandSpec, role: ProcessRole, output: ChildOutput) -> Result<Self> {
        let launch_error = |source: std::io::Error| HarnessError::Launch {
            role: role.to_string(),
            program: spec.program.clone(),
            source,
        };

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let log_path = match output {
            ChildOutput::Inherit => None,
            ChildOutput::Null => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
                None
            },
            ChildOutput::File(path) => {
                let log_file = File::create(&path).map_err(launch_error)?;
                cmd.stdout(log_file.try_clone().map_err(launch_error)?)
                    .stderr(log_file);
                Some(path)
            },
        };

        let child = cmd.spawn().map_err(launch_error)?;
        // Only None once the child has been reaped, which cannot have happened yet
        let pid = child.id().unwrap_or_default();

        debug!(%role, pid, command = %spec, "Spawned child");

        Ok(Self {
            role,
            pid,
            child,
            status: TerminationStatus::Pending,
            spawned_at: Instant::now(),
            elapsed: None,
            log_path,
        })
    }

    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    #[must_use]
    pub const fn role(&self) -> &ProcessRole {
        &self.role
    }

    /// Status captured so far; `Pending` until the child has been joined.
    #[must_use]
    pub const fn status(&self) -> &TerminationStatus {
        &self.status
    }

    /// Time from spawn to the moment termination was observed.
    #[must_use]
    pub const fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Block until the child terminates and return its status.
    ///
    /// Returns immediately if the status was already captured or the child
    /// exited before this call. Cancel-safe.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Wait`] if the OS wait fails.
    pub async fn wait(&mut self) -> Result<TerminationStatus> {
        if !self.status.is_pending() {
            return Ok(self.status.clone());
        }

        let status = self.child.wait().await.map_err(|source| HarnessError::Wait {
            role: self.role.to_string(),
            pid: self.pid,
            source,
        })?;

        Ok(self.record(status.into()))
    }

    /// Mark the handle as finished after a failed OS wait.
    pub(crate) fn record_wait_failure(&mut self, reason: String) -> TerminationStatus {
        self.record(TerminationStatus::WaitFailed { reason })
    }

    fn record(&mut self, status: TerminationStatus) -> TerminationStatus {
        self.elapsed = Some(self.spawned_at.elapsed());
        self.status = status;
        self.status.clone()
    }

    /// Ask the child to stop (SIGINT on unix, a hard kill elsewhere).
    ///
    /// Does nothing if the child has already been joined.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Signal`] if the signal cannot be delivered.
    pub fn interrupt(&mut self) -> Result<()> {
        if !self.status.is_pending() {
            return Ok(());
        }

        #[cfg(unix)]
        {
            use nix::sys::signal::{Signal, kill};
            use nix::unistd::Pid;

            let raw = i32::try_from(self.pid).map_err(|_| HarnessError::Signal {
                pid: self.pid,
                reason: "pid out of range".to_string(),
            })?;

            match kill(Pid::from_raw(raw), Signal::SIGINT) {
                // Already gone but not yet reaped
                Ok(()) | Err(nix::errno::Errno::ESRCH) => Ok(()),
                Err(e) => Err(HarnessError::Signal {
                    pid: self.pid,
                    reason: e.to_string(),
                }),
            }
        }

        #[cfg(not(unix))]
        {
            self.child.start_kill().map_err(|e| HarnessError::Signal {
                pid: self.pid,
                reason: e.to_string(),
            })
        }
    }

    /// Forcefully terminate the child and join it.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Signal`] if the kill cannot be issued, or
    /// [`HarnessError::Wait`] if joining fails.
    pub async fn kill(&mut self) -> Result<TerminationStatus> {
        if !self.status.is_pending() {
            return Ok(self.status.clone());
        }

        if let Err(e) = self.child.start_kill() {
            // InvalidInput means the child already exited; wait reaps it below
            if e.kind() != std::io::ErrorKind::InvalidInput {
                return Err(HarnessError::Signal {
                    pid: self.pid,
                    reason: e.to_string(),
                });
            }
        }

        self.wait().await
    }
}
