//! Client swarm launcher.
//!
//! One client per fixture, all launched back to back without waiting on any
//! of them. The harness itself never throttles clients; `max_clients` is an
//! admission limit enforced by the multiplexed server.

use tracing::{debug, info, warn};

use super::report::LaunchOutcome;
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::fixtures::Fixture;
use crate::process::{ChildOutput, CommandSpec, ProcessHandle, ProcessRole, client_log_path};

/// A client that could not be launched.
#[derive(Debug)]
pub struct LaunchFailure {
    pub index: usize,
    pub file_name: String,
    pub error: HarnessError,
}

impl LaunchFailure {
    #[must_use]
    pub fn outcome(&self) -> LaunchOutcome {
        LaunchOutcome {
            index: self.index,
            file_name: self.file_name.clone(),
            error: self.error.to_string(),
        }
    }
}

/// Clients launched for one run.
#[derive(Debug)]
pub struct Swarm {
    pub clients: Vec<ProcessHandle>,
    /// Set when launching stopped early; `clients` holds what did start.
    pub failure: Option<LaunchFailure>,
}

impl Swarm {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Launch one client per fixture with `address port file_name max_size`.
///
/// Stops at the first launch failure. Clients already running are kept in
/// the returned [`Swarm`] so they can still be joined.
#[must_use]
pub fn launch_all(config: &HarnessConfig, fixtures: &[Fixture]) -> Swarm {
    let mut clients = Vec::with_capacity(fixtures.len());

    for (index, fixture) in fixtures.iter().enumerate() {
        match launch_one(config, index, fixture) {
            Ok(handle) => {
                debug!(index, file = %fixture.file_name, pid = handle.pid(), "Client launched");
                clients.push(handle);
            },
            Err(error) => {
                warn!(
                    index,
                    file = %fixture.file_name,
                    launched = clients.len(),
                    error = %error,
                    "Client launch failed, not launching the rest"
                );
                return Swarm {
                    clients,
                    failure: Some(LaunchFailure {
                        index,
                        file_name: fixture.file_name.clone(),
                        error,
                    }),
                };
            },
        }
    }

    info!(count = clients.len(), "All clients launched");
    Swarm {
        clients,
        failure: None,
    }
}

fn launch_one(
    config: &HarnessConfig,
    index: usize,
    fixture: &Fixture,
) -> crate::error::Result<ProcessHandle> {
    let spec = CommandSpec::from_prefix(&config.client, config.client_args(&fixture.file_name))?;
    let output = match &config.logs.dir {
        Some(dir) => ChildOutput::File(client_log_path(dir, index, &fixture.file_name)),
        None => ChildOutput::Inherit,
    };
    let role = ProcessRole::Client {
        index,
        file_name: fixture.file_name.clone(),
    };

    ProcessHandle::spawn(&spec, role, output)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixtures(names: &[&str]) -> Vec<Fixture> {
        names
            .iter()
            .map(|n| Fixture {
                path: PathBuf::from("/books").join(n),
                file_name: (*n).to_string(),
            })
            .collect()
    }

    fn config(client: &[&str]) -> HarnessConfig {
        HarnessConfig {
            client: client.iter().map(ToString::to_string).collect(),
            ..HarnessConfig::default()
        }
    }

    #[tokio::test]
    async fn test_launches_one_client_per_fixture() {
        let config = config(&["sh", "-c", "exit 0", "client"]);
        let mut swarm = launch_all(&config, &fixtures(&["a.pdf", "b.pdf", "c.pdf"]));

        assert!(swarm.is_complete());
        assert_eq!(swarm.clients.len(), 3);
        for (i, handle) in swarm.clients.iter_mut().enumerate() {
            assert!(matches!(handle.role(), ProcessRole::Client { index, .. } if *index == i));
            assert!(handle.wait().await.unwrap().is_success());
        }
    }

    #[tokio::test]
    async fn test_no_fixtures_no_clients() {
        let swarm = launch_all(&config(&["true"]), &[]);
        assert!(swarm.is_complete());
        assert!(swarm.clients.is_empty());
    }

    #[tokio::test]
    async fn test_launch_failure_is_recorded() {
        let swarm = launch_all(
            &config(&["/definitely/not/a/client"]),
            &fixtures(&["a.pdf", "b.pdf"]),
        );

        assert!(swarm.clients.is_empty());
        let failure = swarm.failure.expect("launch failure must be recorded");
        assert_eq!(failure.index, 0);
        assert_eq!(failure.file_name, "a.pdf");
        assert!(matches!(failure.error, HarnessError::Launch { .. }));

        let outcome = failure.outcome();
        assert_eq!(outcome.index, 0);
        assert!(outcome.error.contains("/definitely/not/a/client"));
    }
}
