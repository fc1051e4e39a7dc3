//! Infrastructure configuration modules.

pub mod llm;
pub mod logging;
pub mod polling;
pub mod pushover;
pub mod settings;
pub mod upwork;

pub use settings::Config;
