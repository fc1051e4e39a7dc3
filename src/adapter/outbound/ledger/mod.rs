//! Seen-posting ledger adapters.

mod json_file;

pub use json_file::JsonFileLedger;
