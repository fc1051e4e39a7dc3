//! Upwork GraphQL client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::auth::{RefreshOutcome, TokenManager};
use super::dto::{DetailsData, OrganizationData, SearchData};
use super::query;
use crate::adapter::outbound::http::is_retryable_status;
use crate::domain::{newest_first, Posting, PostingId, SearchCriterion};
use crate::error::{ApiError, Error, Result};
use crate::port::{HttpRequest, HttpResponse, HttpTransport, JobSource};

/// Upwork GraphQL endpoint.
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.upwork.com/graphql";

/// Value of the `Upwork-API-Version` header.
pub const API_VERSION: &str = "1.0";

/// Value of the `User-Agent` header on GraphQL calls.
pub const USER_AGENT: &str = concat!("jobsniper/", env!("CARGO_PKG_VERSION"));

/// Longest response body excerpt carried into error messages.
const BODY_EXCERPT: usize = 300;

/// The authenticated organization, as returned by `organization()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

/// How a single GraphQL exchange ended.
enum Exchange {
    Data(Value),
    AuthRejected(String),
}

/// GraphQL client with transport retry underneath and one auth retry on top.
pub struct UpworkClient {
    endpoint: String,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<TokenManager>,
}

impl UpworkClient {
    /// `transport` should already retry transient failures (see
    /// [`RetryingTransport`](crate::adapter::outbound::http::RetryingTransport)).
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<TokenManager>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
            tokens,
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Execute a GraphQL operation and return its `data` object.
    ///
    /// A 401, or a 200 whose errors mention an expired token, triggers one
    /// forced token refresh and one replay of the request. A second auth
    /// failure, or a failed refresh, ends in [`ApiError::Authentication`].
    ///
    /// # Errors
    ///
    /// - [`ApiError::Authentication`] when the token cannot be made to work
    /// - [`ApiError::Transient`] when the network or server kept failing
    /// - [`ApiError::GraphQl`] for application errors (messages joined)
    /// - [`ApiError::Status`] / [`ApiError::InvalidResponse`] otherwise
    pub async fn execute(&self, document: &str, variables: Value) -> Result<Value> {
        let payload = json!({ "query": document, "variables": variables });
        let mut auth_retry_left = true;

        loop {
            let token = self.tokens.get_valid_token().await;
            let request = self.request(&token, payload.clone());
            let response = self.transport.send(request).await.map_err(wrap_transport)?;

            let reason = match classify(response)? {
                Exchange::Data(data) => return Ok(data),
                Exchange::AuthRejected(reason) => reason,
            };

            if !auth_retry_left {
                warn!(endpoint = %self.endpoint, reason = %reason, "Authentication failed after token refresh");
                return Err(ApiError::Authentication(format!(
                    "{reason} (after token refresh)"
                ))
                .into());
            }
            auth_retry_left = false;

            info!(endpoint = %self.endpoint, reason = %reason, "Access token rejected, refreshing");
            match self.tokens.force_refresh().await {
                RefreshOutcome::Refreshed => {
                    debug!("Token refreshed, replaying request");
                }
                RefreshOutcome::Failed { message } => {
                    return Err(ApiError::Authentication(format!(
                        "{reason}; token refresh failed: {message}"
                    ))
                    .into());
                }
            }
        }
    }

    /// Fetch the organization behind the current token.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute), plus
    /// [`ApiError::InvalidResponse`] when the organization is missing.
    pub async fn organization(&self) -> Result<Organization> {
        let data: OrganizationData = decode(self.execute(query::ORGANIZATION, json!({})).await?)?;
        let node = data
            .organization
            .ok_or_else(|| ApiError::InvalidResponse("no organization in response".into()))?;
        Ok(Organization {
            id: node.id.unwrap_or_default(),
            name: node.name.unwrap_or_default(),
        })
    }

    fn request(&self, token: &str, payload: Value) -> HttpRequest {
        HttpRequest::json(self.endpoint.clone(), payload)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("Upwork-API-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
            .header("X-Requested-With", "XMLHttpRequest")
    }
}

#[async_trait]
impl JobSource for UpworkClient {
    async fn search_jobs(&self, criterion: &SearchCriterion) -> Result<Vec<Posting>> {
        let data: SearchData = decode(
            self.execute(query::SEARCH_JOBS, query::search_variables(criterion))
                .await?,
        )?;

        let Some(connection) = data.search else {
            return Ok(Vec::new());
        };
        let edges = connection.edges.unwrap_or_default();
        debug!(
            criterion = %criterion.query,
            total = connection.total_count,
            returned = edges.len(),
            "Search results received"
        );

        let mut postings: Vec<Posting> = edges
            .into_iter()
            .filter_map(|edge| edge.node)
            .filter_map(|node| {
                let posting = node.into_posting();
                if posting.is_none() {
                    warn!(criterion = %criterion.query, "Dropping search result without an id");
                }
                posting
            })
            .collect();
        // Server-side recency sort is not relied upon.
        postings.sort_by(newest_first);
        Ok(postings)
    }

    async fn posting_details(&self, id: &PostingId) -> Result<Posting> {
        let data: DetailsData = decode(
            self.execute(query::POSTING_DETAILS, query::details_variables(id))
                .await?,
        )?;
        data.job
            .and_then(|node| node.into_posting())
            .ok_or_else(|| ApiError::NotFound(id.to_string()).into())
    }
}

/// Transport errors that escaped retry become transient API errors.
fn wrap_transport(err: Error) -> Error {
    match err {
        Error::Connection(msg) => ApiError::Transient(msg).into(),
        other => other,
    }
}

fn classify(response: HttpResponse) -> Result<Exchange> {
    if response.status == 401 {
        return Ok(Exchange::AuthRejected("HTTP 401".into()));
    }
    if !response.is_success() {
        let body = excerpt(&response.body).to_string();
        return Err(if is_retryable_status(response.status) {
            ApiError::Transient(format!("HTTP {}: {body}", response.status))
        } else {
            ApiError::Status {
                status: response.status,
                body,
            }
        }
        .into());
    }

    let mut body: Value = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::InvalidResponse(format!("body is not JSON: {e}")))?;

    let messages = error_messages(&body);
    if !messages.is_empty() {
        let joined = messages.join(", ");
        if messages.iter().any(|m| is_token_expiry(m)) {
            return Ok(Exchange::AuthRejected(joined));
        }
        return Err(ApiError::GraphQl(joined).into());
    }

    match body.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => Ok(Exchange::Data(data)),
        _ => Err(ApiError::InvalidResponse("response has no data".into()).into()),
    }
}

fn error_messages(body: &Value) -> Vec<String> {
    body.get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown error")
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn is_token_expiry(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("token") && lower.contains("expired")
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|e| ApiError::InvalidResponse(format!("unexpected data shape: {e}")).into())
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
