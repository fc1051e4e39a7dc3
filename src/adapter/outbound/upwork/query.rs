//! GraphQL documents and variable builders.

use serde_json::{json, Value};

use crate::domain::{PostingId, SearchCriterion};

macro_rules! posting_fields {
    () => {
        "id
        title
        description
        ciphertext
        createdDateTime
        experienceLevel
        duration
        totalApplicants
        category
        amount { rawValue currency displayValue }
        hourlyBudgetMin { rawValue currency displayValue }
        hourlyBudgetMax { rawValue currency displayValue }
        skills { name }
        client {
          totalHires
          totalPostedJobs
          totalReviews
          totalFeedback
          verificationStatus
          totalSpent { rawValue currency displayValue }
          location { country }
        }"
    };
}

pub(super) const SEARCH_JOBS: &str = concat!(
    "query SearchJobs(
  $marketPlaceJobFilter: MarketplaceJobPostingsSearchFilter
  $searchType: MarketplaceJobPostingSearchType
  $sortAttributes: [MarketplaceJobPostingSearchSortAttribute]
) {
  marketplaceJobPostingsSearch(
    marketPlaceJobFilter: $marketPlaceJobFilter
    searchType: $searchType
    sortAttributes: $sortAttributes
  ) {
    totalCount
    edges {
      node {
        ",
    posting_fields!(),
    "
      }
    }
    pageInfo { hasNextPage endCursor }
  }
}"
);

pub(super) const POSTING_DETAILS: &str = concat!(
    "query PostingDetails($id: ID!) {
  job: marketplaceJobPosting(id: $id) {
    ",
    posting_fields!(),
    "
  }
}"
);

pub(super) const ORGANIZATION: &str = "query Organization {
  organization {
    id
    name
  }
}";

/// Variables for [`SEARCH_JOBS`]; results are requested newest first.
pub(super) fn search_variables(criterion: &SearchCriterion) -> Value {
    json!({
        "marketPlaceJobFilter": {
            "titleExpression_eq": criterion.query,
            "hourlyRate_eq": { "rangeStart": criterion.hourly_rate_min },
            "budgetRange_eq": { "rangeStart": criterion.budget_min },
            "pagination_eq": { "first": criterion.limit, "after": "0" }
        },
        "searchType": "USER_JOBS_SEARCH",
        "sortAttributes": [{ "field": "RECENCY" }]
    })
}

pub(super) fn details_variables(id: &PostingId) -> Value {
    json!({ "id": id.as_str() })
}
