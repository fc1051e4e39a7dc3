//! Job source port.

use async_trait::async_trait;

use crate::domain::{Posting, PostingId, SearchCriterion};
use crate::error::Result;

/// Source of job postings.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Search postings matching `criterion`, newest first.
    ///
    /// # Errors
    ///
    /// Authentication errors are fatal to the caller; everything else is
    /// recoverable.
    async fn search_jobs(&self, criterion: &SearchCriterion) -> Result<Vec<Posting>>;

    /// Fetch extended fields for one posting.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`](crate::error::ApiError::NotFound) when
    /// the server has no such posting.
    async fn posting_details(&self, id: &PostingId) -> Result<Posting>;
}
