//! Completion barrier: join every client, in whatever order they finish.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{debug, warn};

use super::report::{ClientOutcome, clients_failed};
use crate::error::HarnessError;
use crate::process::ProcessHandle;

/// Proof that the completion barrier has returned.
///
/// Only [`await_all`] creates one, and the shutdown sequence requires it.
/// Both are crate-private, so outside the crate a token only exists inside
/// [`run_with`](crate::harness::run_with), which hands the real client set
/// to the barrier before joining the server.
///
/// ```compile_fail
/// let _ = xferload::harness::barrier::await_all::<fn(&xferload::harness::ClientOutcome)>;
/// ```
#[derive(Debug)]
pub struct ClientsJoined {
    _private: (),
}

#[derive(Debug)]
pub struct BarrierOutcome {
    outcomes: Vec<ClientOutcome>,
    /// Index of the first client observed to fail, in completion order.
    first_failure: Option<usize>,
    joined: ClientsJoined,
}

impl BarrierOutcome {
    /// Outcomes ordered by client index.
    #[must_use]
    pub fn outcomes(&self) -> &[ClientOutcome] {
        &self.outcomes
    }

    /// Aggregated failure, if any client terminated unsuccessfully.
    #[must_use]
    pub fn failure(&self) -> Option<HarnessError> {
        let first = self.first_failure?;
        let outcome = self.outcomes.iter().find(|o| o.index == first)?;
        Some(clients_failed(&self.outcomes, outcome))
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<ClientOutcome>, ClientsJoined) {
        (self.outcomes, self.joined)
    }
}

/// Wait for every handle to terminate, each exactly once.
///
/// Handles are polled concurrently and `on_exit` is called as each one
/// finishes. Clients that exited before the barrier was entered complete
/// immediately. A failed OS wait is recorded on the handle and counts as
/// termination, so the barrier always returns once every child is gone.
pub(crate) async fn await_all<F>(clients: &mut [ProcessHandle], mut on_exit: F) -> BarrierOutcome
where
    F: FnMut(&ClientOutcome),
{
    let total = clients.len();
    let mut pending: FuturesUnordered<_> = clients
        .iter_mut()
        .map(|handle| async move {
            if let Err(e) = handle.wait().await {
                warn!(role = %handle.role(), error = %e, "Wait failed");
                handle.record_wait_failure(e.to_string());
            }
            ClientOutcome::from_handle(handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(total);
    let mut first_failure = None;

    while let Some(outcome) = pending.next().await {
        if outcome.succeeded() {
            debug!(
                index = outcome.index,
                file = %outcome.file_name,
                remaining = total - outcomes.len() - 1,
                "Client finished"
            );
        } else {
            warn!(
                index = outcome.index,
                file = %outcome.file_name,
                status = %outcome.status,
                "Client failed"
            );
            first_failure.get_or_insert(outcome.index);
        }

        on_exit(&outcome);
        outcomes.push(outcome);
    }

    outcomes.sort_by_key(|o| o.index);

    BarrierOutcome {
        outcomes,
        first_failure,
        joined: ClientsJoined { _private: () },
    }
}
