//! xferload - load-test harness for file-transfer servers.
//!
//! Starts one server process, launches one client process per fixture file
//! against it, joins every client in whatever order they finish, then
//! settles and joins the server.
//!
//! ```no_run
//! use xferload::config::{ConfigOverrides, HarnessConfig};
//!
//! # async fn demo() -> xferload::error::Result<()> {
//! let (config, _warnings) = HarnessConfig::build(None, ConfigOverrides::default())?;
//! let report = xferload::harness::run(&config).await?;
//! println!("{} of {} clients succeeded", report.succeeded_count(), report.clients.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod fixtures;
pub mod harness;
pub mod process;
pub mod reliability;
pub mod ui;
pub mod utils;

pub use config::{ConfigOverrides, HarnessConfig};
pub use error::{HarnessError, Result};
pub use harness::{RunReport, Verdict, run, run_with};
