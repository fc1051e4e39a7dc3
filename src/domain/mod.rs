//! Marketplace-agnostic domain types.

mod analysis;
mod credentials;
mod criterion;
mod id;
mod money;
mod posting;

pub use analysis::{Analysis, MAX_SCORE};
pub use credentials::Credentials;
pub use criterion::SearchCriterion;
pub use id::PostingId;
pub use money::{Budget, Money};
pub use posting::{newest_first, ClientProfile, Posting};
