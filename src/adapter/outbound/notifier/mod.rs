//! Notification adapters.
//!
//! Implements the `port::PostingNotifier` trait for push backends.

pub mod format;
mod pushover;

pub use pushover::{
    PushoverConfig, PushoverNotifier, API_URL as PUSHOVER_API_URL, PUSHOVER_API_TOKEN,
    PUSHOVER_USER_KEY,
};
