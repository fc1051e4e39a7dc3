//! Jobsniper - marketplace job poller.
//!
//! Polls the Upwork GraphQL API for configured searches, drops postings it
//! has already handled, optionally scores new ones with an LLM and pushes
//! the qualifying ones to a notification service.
//!
//! # Modules
//!
//! - [`domain`] - Postings, budgets, search criteria, credentials
//! - [`port`] - Traits the application depends on
//! - [`application`] - The poll loop
//! - [`adapter`] - CLI and outbound integrations
//! - [`infrastructure`] - Configuration, wiring and process runtime
//! - [`error`] - Error types with a fatal/recoverable split

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
