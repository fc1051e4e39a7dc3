//! Job postings as carried through the pipeline.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::PostingId;
use super::money::{Budget, Money};

/// Public job page prefix; postings link to `<prefix>~<ciphertext>`.
const JOB_URL_PREFIX: &str = "https://www.upwork.com/jobs/";

/// Reputation data about the client who posted a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub total_hires: Option<u32>,
    pub total_posted_jobs: Option<u32>,
    pub total_reviews: Option<u32>,
    /// Average feedback score (0-5).
    pub total_feedback: Option<f64>,
    pub verification_status: Option<String>,
    pub total_spent: Option<Money>,
    pub country: Option<String>,
}

impl ClientProfile {
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verification_status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("VERIFIED"))
    }

    /// Hires as a percentage of posted jobs, when both are known.
    #[must_use]
    pub fn hire_rate(&self) -> Option<f64> {
        let posted = self.total_posted_jobs.filter(|p| *p > 0)?;
        Some(f64::from(self.total_hires.unwrap_or(0)) / f64::from(posted) * 100.0)
    }
}

/// A single job posting.
///
/// Only `id` carries semantics (it is the dedup key); everything else is
/// read-only data handed to the analysis and notification collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub id: PostingId,
    pub title: String,
    pub description: Option<String>,
    pub budget: Budget,
    pub client: Option<ClientProfile>,
    pub created_at: Option<DateTime<Utc>>,
    pub total_applicants: Option<u32>,
    pub skills: Vec<String>,
    pub experience_level: Option<String>,
    pub duration: Option<String>,
    pub category: Option<String>,
    pub ciphertext: Option<String>,
}

impl Posting {
    /// Create a posting with only an identifier and title set.
    pub fn new(id: PostingId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            budget: Budget::Unspecified,
            client: None,
            created_at: None,
            total_applicants: None,
            skills: Vec::new(),
            experience_level: None,
            duration: None,
            category: None,
            ciphertext: None,
        }
    }

    /// True when the description is missing or blank.
    #[must_use]
    pub fn lacks_description(&self) -> bool {
        self.description
            .as_deref()
            .map_or(true, |d| d.trim().is_empty())
    }

    /// Public URL of the job page, when the ciphertext is known.
    #[must_use]
    pub fn url(&self) -> Option<String> {
        let cipher = self.ciphertext.as_deref()?.trim();
        if cipher.is_empty() {
            return None;
        }
        if cipher.starts_with('~') {
            Some(format!("{JOB_URL_PREFIX}{cipher}"))
        } else {
            Some(format!("{JOB_URL_PREFIX}~{cipher}"))
        }
    }
}

/// Order postings newest first; postings without a timestamp sort last.
pub fn newest_first(a: &Posting, b: &Posting) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
