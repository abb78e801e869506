//! Default values shared by the configuration loader and the CLI.

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "xferload.toml";

/// Address the server binds to and clients connect to.
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 55001;

/// Largest file a client agrees to receive (bytes).
pub const DEFAULT_MAX_TRANSFER_SIZE: u64 = 1_000_000_000;

/// Fixture extension, without the leading dot.
pub const DEFAULT_FIXTURE_EXTENSION: &str = "pdf";

/// Delay between the last client exiting and joining the server.
pub const DEFAULT_SETTLE_MS: u64 = 1000;

/// How long to wait for the server to exit on its own before interrupting it.
pub const DEFAULT_EXIT_TIMEOUT_MS: u64 = 30_000;

/// Grace period between SIGINT and SIGKILL.
pub const DEFAULT_STOP_GRACE_MS: u64 = 5000;

// Readiness probe
pub const DEFAULT_PROBE_MAX_RETRIES: u32 = 20;
pub const DEFAULT_PROBE_INITIAL_DELAY_MS: u64 = 25;
pub const DEFAULT_PROBE_MAX_DELAY_MS: u64 = 500;
pub const DEFAULT_PROBE_CONNECT_TIMEOUT_MS: u64 = 250;

/// Lines of a child's log shown when it fails.
pub const FAILURE_LOG_TAIL_LINES: usize = 10;
