//! Outbound adapters (driven side).

pub mod analyzer;
pub mod atomic;
pub mod credential;
pub mod http;
pub mod ledger;
pub mod llm;
pub mod notifier;
pub mod upwork;
