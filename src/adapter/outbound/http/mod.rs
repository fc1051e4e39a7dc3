//! HTTP transport adapters.
//!
//! - [`ReqwestTransport`] - the real network stack
//! - [`RetryingTransport`] - status-based retry with exponential backoff

mod client;
mod retry;

pub use client::ReqwestTransport;
pub use retry::{is_retryable_status, RetryPolicy, RetryingTransport};
