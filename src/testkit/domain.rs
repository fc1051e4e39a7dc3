//! Builders for domain values and GraphQL payloads used across tests.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::domain::{Credentials, Posting, PostingId};

/// Create a [`PostingId`], panicking on blank input.
pub fn posting_id(id: &str) -> PostingId {
    PostingId::parse(id).expect("non-empty posting id")
}

/// Create a minimal posting.
pub fn posting(id: &str, title: &str) -> Posting {
    let mut posting = Posting::new(posting_id(id), title);
    posting.description = Some(format!("Description for {title}"));
    posting
}

/// Create a posting with a creation timestamp.
pub fn posting_at(id: &str, created_at: DateTime<Utc>) -> Posting {
    let mut posting = posting(id, id);
    posting.created_at = Some(created_at);
    posting
}

/// Complete credentials suitable for refresh grants.
pub fn credentials() -> Credentials {
    Credentials {
        client_id: "client-id".into(),
        client_secret: "client-secret".into(),
        access_token: "access-0".into(),
        refresh_token: "refresh-0".into(),
    }
}

/// A search-result node as the marketplace returns it.
pub fn posting_node(id: &str, created: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Posting {id}"),
        "description": format!("We need help with {id}"),
        "ciphertext": format!("~0{id}"),
        "createdDateTime": created,
        "experienceLevel": "INTERMEDIATE",
        "duration": "ONE_TO_THREE_MONTHS",
        "totalApplicants": 4,
        "category": "Web Development",
        "amount": { "rawValue": "0.0", "currency": "USD", "displayValue": "$0.00" },
        "hourlyBudgetMin": { "rawValue": "30.0", "currency": "USD", "displayValue": "$30.00" },
        "hourlyBudgetMax": { "rawValue": "60.0", "currency": "USD", "displayValue": "$60.00" },
        "skills": [{ "name": "WordPress" }, { "name": "PHP" }],
        "client": {
            "totalHires": 5,
            "totalPostedJobs": 8,
            "totalReviews": 4,
            "totalFeedback": 4.9,
            "verificationStatus": "VERIFIED",
            "totalSpent": { "rawValue": "12000", "currency": "USD", "displayValue": "$12,000" },
            "location": { "country": "United States" }
        }
    })
}

/// Wrap nodes in a `marketplaceJobPostingsSearch` response body.
pub fn search_body(nodes: Vec<Value>) -> String {
    let edges: Vec<Value> = nodes.into_iter().map(|node| json!({ "node": node })).collect();
    json!({
        "data": {
            "marketplaceJobPostingsSearch": {
                "totalCount": edges.len(),
                "edges": edges,
                "pageInfo": { "hasNextPage": false, "endCursor": null }
            }
        }
    })
    .to_string()
}

/// A GraphQL error response body.
pub fn graphql_error_body(messages: &[&str]) -> String {
    let errors: Vec<Value> = messages.iter().map(|m| json!({ "message": m })).collect();
    json!({ "data": null, "errors": errors }).to_string()
}

/// A token endpoint success body.
pub fn token_body(access: &str, refresh: Option<&str>) -> String {
    match refresh {
        Some(refresh) => json!({
            "access_token": access,
            "refresh_token": refresh,
            "token_type": "Bearer",
            "expires_in": 86400
        }),
        None => json!({ "access_token": access, "token_type": "Bearer", "expires_in": 86400 }),
    }
    .to_string()
}
