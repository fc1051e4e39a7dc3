//! Posting analysis port.

use async_trait::async_trait;

use crate::domain::{Analysis, Posting};
use crate::error::Result;

/// Scores and summarizes postings.
#[async_trait]
pub trait PostingAnalyzer: Send + Sync {
    /// Return the provider name for logging.
    fn name(&self) -> &'static str;

    /// Analyze a posting.
    ///
    /// # Errors
    ///
    /// Any failure; the poller proceeds without a score.
    async fn analyze(&self, posting: &Posting) -> Result<Analysis>;
}
