//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`transport`] - [`ScriptedTransport`](transport::ScriptedTransport), a
//!   URL-routed fake [`HttpTransport`](crate::port::HttpTransport).
//! - [`domain`] - Builders for postings, credentials and GraphQL payloads.
//! - [`collaborators`] - Recording notifier, scripted analyzer and in-memory
//!   credential persistence.

pub mod collaborators;
pub mod domain;
pub mod transport;
