//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - the command line
//! - [`outbound`] - marketplace API, HTTP, storage, LLM and notifications

pub mod inbound;
pub mod outbound;
