//! Run report: what every child did and when each phase happened.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::ServerVariant;
use crate::error::HarnessError;
use crate::process::{ProcessHandle, ProcessRole, TerminationStatus};

const SIGINT: i32 = 2;

/// Milestones of a run, in the order they must occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    ServerStarted,
    ServerReady,
    ClientsLaunched,
    ClientsJoined,
    Settled,
    ServerJoined,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEvent {
    pub phase: Phase,
    /// Milliseconds since the run began.
    pub at_ms: u64,
}

/// Ordered record of phase transitions.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    #[serde(skip)]
    origin: Instant,
    events: Vec<TimelineEvent>,
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            events: Vec::new(),
        }
    }

    pub fn mark(&mut self, phase: Phase) {
        self.events.push(TimelineEvent {
            phase,
            at_ms: duration_ms(self.origin.elapsed()),
        });
    }

    #[must_use]
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Index of the first occurrence of `phase`.
    #[must_use]
    pub fn position(&self, phase: Phase) -> Option<usize> {
        self.events.iter().position(|e| e.phase == phase)
    }

    /// True if `before` was recorded and precedes `after`.
    #[must_use]
    pub fn precedes(&self, before: Phase, after: Phase) -> bool {
        matches!(
            (self.position(before), self.position(after)),
            (Some(a), Some(b)) if a < b
        )
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Final state of one client.
#[derive(Debug, Clone, Serialize)]
pub struct ClientOutcome {
    pub index: usize,
    pub file_name: String,
    pub pid: u32,
    pub status: TerminationStatus,
    pub elapsed_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl ClientOutcome {
    #[must_use]
    pub fn from_handle(handle: &ProcessHandle) -> Self {
        let (index, file_name) = match handle.role() {
            ProcessRole::Client { index, file_name } => (*index, file_name.clone()),
            ProcessRole::Server => (0, String::new()),
        };

        Self {
            index,
            file_name,
            pid: handle.pid(),
            status: handle.status().clone(),
            elapsed_ms: handle.elapsed().map(duration_ms),
            log_path: handle.log_path().map(PathBuf::from),
        }
    }

    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.status.is_success()
    }
}

/// How the server came to terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopMethod {
    /// Exited on its own within the allowed time.
    Exited,
    /// Stopped after SIGINT.
    Interrupted,
    /// Killed after ignoring SIGINT.
    Killed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerOutcome {
    pub pid: u32,
    pub status: TerminationStatus,
    pub stop: StopMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl ServerOutcome {
    /// A server is clean if it exited successfully, or died from the SIGINT
    /// the harness sent. A killed server is never clean.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        match self.stop {
            StopMethod::Exited => self.status.is_success(),
            StopMethod::Interrupted => {
                self.status.is_success()
                    || self.status == TerminationStatus::Signaled { signal: SIGINT }
            },
            StopMethod::Killed => false,
        }
    }
}

/// A client that never started; later fixtures were not launched either.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchOutcome {
    pub index: usize,
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    LaunchFailed,
    ClientsFailed,
    ServerFailed,
}

/// Everything observed during one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub variant: ServerVariant,
    pub server: ServerOutcome,
    /// Ordered by client index. Only clients that were actually launched.
    pub clients: Vec<ClientOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_failure: Option<LaunchOutcome>,
    pub timeline: Timeline,
}

impl RunReport {
    /// An incomplete swarm outranks client failures, which outrank an
    /// unclean server.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        if self.launch_failure.is_some() {
            Verdict::LaunchFailed
        } else if self.clients.iter().any(|c| !c.succeeded()) {
            Verdict::ClientsFailed
        } else if !self.server.is_clean() {
            Verdict::ServerFailed
        } else {
            Verdict::Passed
        }
    }

    pub fn failed_clients(&self) -> impl Iterator<Item = &ClientOutcome> {
        self.clients.iter().filter(|c| !c.succeeded())
    }

    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.clients.iter().filter(|c| c.succeeded()).count()
    }

    /// Aggregated client failure, naming the lowest-index failed client.
    #[must_use]
    pub fn client_failure(&self) -> Option<HarnessError> {
        let first = self.failed_clients().next()?;
        Some(clients_failed(&self.clients, first))
    }
}

pub(crate) fn clients_failed(outcomes: &[ClientOutcome], first: &ClientOutcome) -> HarnessError {
    HarnessError::ClientsFailed {
        failed: outcomes.iter().filter(|o| !o.succeeded()).count(),
        total: outcomes.len(),
        first: format!("{} {}", first.file_name, first.status),
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
