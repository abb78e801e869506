//! Reliability primitives.
//!
//! - [`retry`] - Exponential backoff used by the server readiness probe

pub mod retry;

pub use retry::{RetryConfig, is_transient_io_error, retry_async};
