//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies such as the HTTP
//! stack, durable storage, the marketplace, scoring and notifications.

pub mod analyzer;
pub mod credential;
pub mod ledger;
pub mod llm;
pub mod marketplace;
pub mod notifier;
pub mod transport;
