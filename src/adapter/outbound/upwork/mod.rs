//! Upwork marketplace adapter.
//!
//! - [`CredentialStore`] - current token pair plus durable rotation
//! - [`TokenManager`] - OAuth2 refresh-token grant with throttling
//! - [`UpworkClient`] - GraphQL client with auth-aware retry

mod auth;
mod client;
mod credentials;
mod dto;
mod query;

pub use auth::{RefreshOutcome, TokenConfig, TokenManager, DEFAULT_TOKEN_URL};
pub use client::{Organization, UpworkClient, API_VERSION, DEFAULT_GRAPHQL_URL, USER_AGENT};
pub use credentials::CredentialStore;
