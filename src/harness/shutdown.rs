//! Shutdown sequencing: settle, then join the server.

use std::time::Duration;
use tracing::{info, warn};

use super::barrier::ClientsJoined;
use super::report::{Phase, ServerOutcome, StopMethod, Timeline};
use super::server::ServerSupervisor;
use crate::config::ShutdownPolicy;
use crate::error::Result;
use crate::process::{ProcessHandle, TerminationStatus};

/// Settle, then join the server, escalating if it does not exit in time.
///
/// Taking [`ClientsJoined`] means this can only run after the completion
/// barrier returned. With no exit timeout the server is joined
/// unconditionally, which hangs for as long as the server keeps running.
/// Otherwise an overdue server gets SIGINT, then SIGKILL after the grace
/// period.
///
/// # Errors
///
/// Returns [`HarnessError::Wait`](crate::error::HarnessError::Wait) if the
/// server cannot be joined, or
/// [`HarnessError::Signal`](crate::error::HarnessError::Signal) if it cannot
/// be killed.
pub(crate) async fn shutdown(
    mut server: ServerSupervisor,
    _joined: ClientsJoined,
    policy: &ShutdownPolicy,
    timeline: &mut Timeline,
) -> Result<ServerOutcome> {
    if !policy.settle.is_zero() {
        info!(settle_ms = policy.settle.as_millis() as u64, "Settling before server join");
        tokio::time::sleep(policy.settle).await;
    }
    timeline.mark(Phase::Settled);

    let handle = server.handle_mut();
    let (status, stop) = match policy.exit_timeout {
        None => (handle.wait().await?, StopMethod::Exited),
        Some(limit) => match tokio::time::timeout(limit, handle.wait()).await {
            Ok(status) => (status?, StopMethod::Exited),
            Err(_) => {
                warn!(
                    pid = handle.pid(),
                    timeout_ms = limit.as_millis() as u64,
                    "Server still running, sending SIGINT"
                );
                escalate(handle, policy.stop_grace).await?
            },
        },
    };
    timeline.mark(Phase::ServerJoined);

    info!(pid = handle.pid(), %status, ?stop, "Server joined");

    Ok(ServerOutcome {
        pid: handle.pid(),
        status,
        stop,
        log_path: handle.log_path().map(Into::into),
    })
}

async fn escalate(
    handle: &mut ProcessHandle,
    grace: Duration,
) -> Result<(TerminationStatus, StopMethod)> {
    if let Err(e) = handle.interrupt() {
        warn!(error = %e, "SIGINT failed, killing server");
        return Ok((handle.kill().await?, StopMethod::Killed));
    }

    match tokio::time::timeout(grace, handle.wait()).await {
        Ok(status) => Ok((status?, StopMethod::Interrupted)),
        Err(_) => {
            warn!(
                pid = handle.pid(),
                grace_ms = grace.as_millis() as u64,
                "Server ignored SIGINT, killing it"
            );
            Ok((handle.kill().await?, StopMethod::Killed))
        },
    }
}
