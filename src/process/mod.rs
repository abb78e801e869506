//! Child process management for the harness.
//!
//! Every child (the server and each client) is represented by an owned
//! [`ProcessHandle`] whose termination status is captured exactly once.
//!
//! ## Module Structure
//!
//! - [`types`]: Launch specs, roles and termination statuses
//! - [`handle`]: Spawning, joining and stopping a child
//! - [`logs`]: Per-child log files and log tailing

pub mod handle;
pub mod logs;
pub mod types;

pub use handle::ProcessHandle;
pub use logs::{client_log_path, prepare_log_dir, server_log_path, tail_log};
pub use types::{ChildOutput, CommandSpec, ProcessRole, TerminationStatus};
