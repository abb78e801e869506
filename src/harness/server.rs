//! Server supervision: launch the single server child and wait until it
//! accepts connections.

use std::cell::Cell;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::config::{HarnessConfig, ProbeKind, ServerVariant};
use crate::error::{HarnessError, Result};
use crate::process::{
    ChildOutput, CommandSpec, ProcessHandle, ProcessRole, TerminationStatus, server_log_path,
};
use crate::reliability::retry::{RetryConfig, is_transient_io_error, retry_async};

/// Owns the server process for the duration of a run.
#[derive(Debug)]
pub struct ServerSupervisor {
    handle: ProcessHandle,
    variant: ServerVariant,
}

/// Outcome of a successful readiness probe.
#[derive(Debug, Clone, Copy)]
pub struct Readiness {
    pub attempts: u32,
    pub elapsed: Duration,
}

enum ProbeEnd {
    Ready,
    GaveUp(io::Error),
    ServerExited(Result<TerminationStatus>),
}

impl ServerSupervisor {
    /// Launch the server without waiting for it to listen.
    ///
    /// Arguments are `address port content_root [max_clients]`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] for an empty command or
    /// [`HarnessError::Launch`] if the process cannot be created.
    pub fn spawn(config: &HarnessConfig) -> Result<Self> {
        let spec = CommandSpec::from_prefix(&config.server, config.server_args())?;
        let output = match &config.logs.dir {
            Some(dir) => ChildOutput::File(server_log_path(dir)),
            None => ChildOutput::Inherit,
        };

        let handle = ProcessHandle::spawn(&spec, ProcessRole::Server, output)?;
        let variant = config.server_variant();

        info!(
            pid = handle.pid(),
            %variant,
            address = %config.address,
            port = config.port,
            "Server started"
        );

        Ok(Self { handle, variant })
    }

    /// Launch the server and, unless probing is disabled, wait until it is
    /// ready.
    ///
    /// # Errors
    ///
    /// See [`spawn`](Self::spawn) and [`wait_ready`](Self::wait_ready).
    pub async fn start(config: &HarnessConfig) -> Result<Self> {
        let mut server = Self::spawn(config)?;
        if config.readiness.probe == ProbeKind::Tcp {
            server.wait_ready(config).await?;
        }
        Ok(server)
    }

    /// Probe the server port with exponential backoff until a TCP connection
    /// succeeds.
    ///
    /// The probe races against the server process itself: if the server exits
    /// first, probing stops immediately. If the retry budget runs out the
    /// server is killed.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::ServerExitedEarly`] if the server terminated
    /// - [`HarnessError::Readiness`] if it never accepted a connection
    pub async fn wait_ready(&mut self, config: &HarnessConfig) -> Result<Readiness> {
        let target = config.probe_target()?;
        let started = Instant::now();
        let attempts = Cell::new(0u32);
        let retry = config.retry_config();

        debug!(
            %target,
            max_retries = retry.max_retries,
            budget_ms = retry.worst_case_wait().as_millis() as u64,
            "Probing server"
        );

        let probe = probe_tcp(target, config.connect_timeout(), retry, &attempts);

        let end = tokio::select! {
            result = probe => match result {
                Ok(()) => ProbeEnd::Ready,
                Err(e) => ProbeEnd::GaveUp(e),
            },
            status = self.handle.wait() => ProbeEnd::ServerExited(status),
        };

        let elapsed = started.elapsed();
        match end {
            ProbeEnd::Ready => {
                info!(
                    %target,
                    attempts = attempts.get(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Server ready"
                );
                Ok(Readiness {
                    attempts: attempts.get(),
                    elapsed,
                })
            },
            ProbeEnd::GaveUp(e) => {
                warn!(%target, error = %e, "Server never became ready, killing it");
                if let Err(kill_err) = self.handle.kill().await {
                    warn!(error = %kill_err, "Failed to kill unready server");
                }
                Err(HarnessError::Readiness {
                    target: target.to_string(),
                    attempts: attempts.get(),
                    elapsed,
                    reason: e.to_string(),
                })
            },
            ProbeEnd::ServerExited(status) => Err(HarnessError::ServerExitedEarly {
                status: status?.to_string(),
            }),
        }
    }

    #[must_use]
    pub const fn variant(&self) -> ServerVariant {
        self.variant
    }

    #[must_use]
    pub const fn handle(&self) -> &ProcessHandle {
        &self.handle
    }

    pub(crate) const fn handle_mut(&mut self) -> &mut ProcessHandle {
        &mut self.handle
    }
}

/// Connect to `target` until it accepts, counting attempts in `attempts`.
async fn probe_tcp(
    target: SocketAddr,
    connect_timeout: Duration,
    retry: RetryConfig,
    attempts: &Cell<u32>,
) -> io::Result<()> {
    retry_async(
        retry,
        || {
            attempts.set(attempts.get() + 1);
            connect_once(target, connect_timeout)
        },
        is_transient_io_error,
    )
    .await
}

async fn connect_once(target: SocketAddr, connect_timeout: Duration) -> io::Result<()> {
    match tokio::time::timeout(connect_timeout, TcpStream::connect(target)).await {
        // The probe connection is closed right away
        Ok(stream) => stream.map(drop),
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("connect to {target} timed out after {connect_timeout:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_succeeds_against_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let target = listener.local_addr().unwrap();
        let attempts = Cell::new(0);

        probe_tcp(
            target,
            Duration::from_millis(200),
            RetryConfig::new(2, Duration::from_millis(10), Duration::from_millis(50)),
            &attempts,
        )
        .await
        .unwrap();
        assert_eq!(attempts.get(), 1);
    }

    #[tokio::test]
    async fn test_probe_retries_until_listener_appears() {
        // Reserve a port, release it, then bind it again after a delay
        let target = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let late_listener = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            let listener = TcpListener::bind(target).await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(listener);
        });

        let attempts = Cell::new(0);
        let retry = RetryConfig::new(30, Duration::from_millis(20), Duration::from_millis(50));

        probe_tcp(target, Duration::from_millis(200), retry, &attempts)
            .await
            .unwrap();
        assert!(attempts.get() > 1);

        late_listener.abort();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_start_without_probe_returns_immediately() {
        let mut config = HarnessConfig {
            server: vec!["sh".into(), "-c".into(), "exit 0".into(), "server".into()],
            max_clients: Some(16),
            ..HarnessConfig::default()
        };
        config.readiness.probe = ProbeKind::None;

        let mut server = ServerSupervisor::start(&config).await.unwrap();
        assert_eq!(server.variant(), ServerVariant::Multiplexed { max_clients: 16 });
        assert_eq!(server.handle().role(), &ProcessRole::Server);
        assert!(server.handle_mut().wait().await.unwrap().is_success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_wait_ready_detects_server_exit() {
        let target = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let mut config = HarnessConfig {
            address: "127.0.0.1".to_string(),
            port: target.port(),
            server: vec!["sh".into(), "-c".into(), "exit 5".into(), "server".into()],
            ..HarnessConfig::default()
        };
        config.readiness.max_retries = 100;

        let mut server = ServerSupervisor::spawn(&config).unwrap();
        let err = server.wait_ready(&config).await.unwrap_err();
        assert!(matches!(err, HarnessError::ServerExitedEarly { .. }));
    }

    #[tokio::test]
    async fn test_probe_gives_up() {
        let target = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let attempts = Cell::new(0);
        let retry = RetryConfig::new(2, Duration::from_millis(5), Duration::from_millis(20));

        let err = probe_tcp(target, Duration::from_millis(100), retry, &attempts)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
        assert_eq!(attempts.get(), 3);
    }
}
