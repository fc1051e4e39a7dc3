//! Search criteria iterated by the poller.

use serde::Deserialize;

/// One saved marketplace search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchCriterion {
    /// Title expression to match.
    pub query: String,
    /// Minimum hourly rate for hourly postings.
    #[serde(default = "default_hourly_rate_min")]
    pub hourly_rate_min: u32,
    /// Minimum budget for fixed-price postings.
    #[serde(default = "default_budget_min")]
    pub budget_min: u32,
    /// Page size requested from the server.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl SearchCriterion {
    pub fn new(query: impl Into<String>, hourly_rate_min: u32, budget_min: u32, limit: u32) -> Self {
        Self {
            query: query.into(),
            hourly_rate_min,
            budget_min,
            limit,
        }
    }
}

impl Default for SearchCriterion {
    fn default() -> Self {
        Self::new(
            "wordpress",
            default_hourly_rate_min(),
            default_budget_min(),
            default_limit(),
        )
    }
}

fn default_hourly_rate_min() -> u32 {
    30
}

fn default_budget_min() -> u32 {
    500
}

fn default_limit() -> u32 {
    10
}
