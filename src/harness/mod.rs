//! The load-test run itself.
//!
//! A run has two phases. Discover and launch: fixtures are collected, the
//! server is started and probed, then one client per fixture is launched.
//! Wait and shut down: every client is joined in completion order, the
//! harness settles, and only then is the server joined.
//!
//! - [`server`] - Server supervision and readiness probing
//! - [`swarm`] - Client launching
//! - [`barrier`] - Unordered join of all clients
//! - [`shutdown`] - Settle delay and server join with escalation
//! - [`report`] - Outcomes and phase timeline

pub mod barrier;
pub mod report;
pub mod server;
pub mod shutdown;
pub mod swarm;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::{HarnessConfig, ProbeKind};
use crate::error::Result;
use crate::fixtures::{self, Fixture};
use crate::process::prepare_log_dir;
use barrier::await_all;
use shutdown::shutdown;

pub use barrier::{BarrierOutcome, ClientsJoined};
pub use report::{
    ClientOutcome, LaunchOutcome, Phase, RunReport, ServerOutcome, StopMethod, Timeline,
    TimelineEvent, Verdict,
};
pub use server::{Readiness, ServerSupervisor};
pub use swarm::{LaunchFailure, Swarm, launch_all};

/// Run the harness once.
///
/// # Errors
///
/// See [`run_with`].
pub async fn run(config: &HarnessConfig) -> Result<RunReport> {
    run_with(config, |_| {}).await
}

/// Run the harness once, calling `on_client_exit` as each client finishes.
///
/// Client failures do not make the run fail: they are recorded in the
/// returned [`RunReport`]. Neither does a client that cannot be launched:
/// launching stops there, the clients already running are joined, the
/// server is shut down, and the report carries the failure in
/// [`RunReport::launch_failure`]. Errors are reserved for the harness itself.
///
/// # Errors
///
/// - [`HarnessError::Config`](crate::error::HarnessError::Config) or
///   [`HarnessError::Discovery`](crate::error::HarnessError::Discovery)
///   before any process is started
/// - [`HarnessError::Launch`](crate::error::HarnessError::Launch) if the
///   server cannot be spawned, or if a client could not be launched and the
///   server shutdown then failed as well
/// - [`HarnessError::Wait`](crate::error::HarnessError::Wait) or
///   [`HarnessError::Signal`](crate::error::HarnessError::Signal) if the
///   server cannot be joined
/// - [`HarnessError::Readiness`](crate::error::HarnessError::Readiness) or
///   [`HarnessError::ServerExitedEarly`](crate::error::HarnessError::ServerExitedEarly)
///   if the server never accepted connections
pub async fn run_with<F>(config: &HarnessConfig, on_client_exit: F) -> Result<RunReport>
where
    F: FnMut(&ClientOutcome),
{
    config.validate()?;
    let started_at = Utc::now();
    let mut timeline = Timeline::new();

    // Discovery errors must surface before anything is spawned
    let fixtures: Vec<Fixture> =
        fixtures::discover(&config.content_root, &config.fixtures.extension)?
            .collect::<Result<_>>()?;
    info!(
        count = fixtures.len(),
        root = %config.content_root.display(),
        extension = %config.fixtures.extension,
        "Fixtures discovered"
    );

    if let Some(dir) = &config.logs.dir {
        prepare_log_dir(dir)?;
    }

    let mut server = ServerSupervisor::spawn(config)?;
    timeline.mark(Phase::ServerStarted);

    if config.readiness.probe == ProbeKind::Tcp {
        server.wait_ready(config).await?;
        timeline.mark(Phase::ServerReady);
    }

    let Swarm {
        mut clients,
        failure: launch_failure,
    } = launch_all(config, &fixtures);
    timeline.mark(Phase::ClientsLaunched);

    let barrier = await_all(&mut clients, on_client_exit).await;
    timeline.mark(Phase::ClientsJoined);
    info!(joined = barrier.outcomes().len(), "Clients finished");

    if let Some(err) = barrier.failure() {
        warn!(error = %err, "Client failures recorded");
    }
    let (outcomes, joined) = barrier.into_parts();

    let variant = server.variant();
    let server_outcome =
        match shutdown(server, joined, &config.shutdown_policy(), &mut timeline).await {
            Ok(outcome) => outcome,
            Err(err) => match launch_failure {
                // The launch error is what broke the run; keep it visible
                Some(failure) => {
                    warn!(error = %err, "Server shutdown failed after a client launch failure");
                    return Err(failure.error);
                },
                None => return Err(err),
            },
        };

    let launch_failure = launch_failure.map(|failure| {
        warn!(
            index = failure.index,
            file = %failure.file_name,
            launched = outcomes.len(),
            "Run incomplete, a client could not be launched"
        );
        failure.outcome()
    });

    Ok(RunReport {
        started_at,
        duration_ms: report::duration_ms(timeline.elapsed()),
        variant,
        server: server_outcome,
        clients: outcomes,
        launch_failure,
        timeline,
    })
}
