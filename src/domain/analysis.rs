//! Scoring results produced by the analysis collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::PostingId;

/// Highest possible score.
pub const MAX_SCORE: u8 = 10;

/// Structured analysis of a posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub posting_id: PostingId,
    pub summary: String,
    /// Score from 0 to [`MAX_SCORE`].
    pub score: u8,
    pub proposal_script: String,
    pub reasoning: Option<String>,
    pub analyzed_at: DateTime<Utc>,
}

impl Analysis {
    /// True when the score reaches `threshold`.
    #[must_use]
    pub fn meets(&self, threshold: u8) -> bool {
        self.score >= threshold
    }
}
