//! Wire types for marketplace GraphQL responses.
//!
//! The server omits or nulls fields freely, so everything is optional here
//! and normalized into domain types by [`PostingNode::into_posting`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::domain::{Budget, ClientProfile, Money, Posting, PostingId};

#[derive(Debug, Deserialize)]
pub(super) struct SearchData {
    #[serde(rename = "marketplaceJobPostingsSearch")]
    pub search: Option<SearchConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchConnection {
    pub total_count: Option<u64>,
    pub edges: Option<Vec<Edge>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Edge {
    pub node: Option<PostingNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DetailsData {
    pub job: Option<PostingNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OrganizationData {
    pub organization: Option<OrganizationNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OrganizationNode {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PostingNode {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub ciphertext: Option<String>,
    pub created_date_time: Option<String>,
    pub experience_level: Option<String>,
    pub duration: Option<String>,
    pub total_applicants: Option<u32>,
    pub category: Option<CategoryDto>,
    pub amount: Option<MoneyDto>,
    pub hourly_budget_min: Option<MoneyDto>,
    pub hourly_budget_max: Option<MoneyDto>,
    pub skills: Option<Vec<SkillDto>>,
    pub client: Option<ClientDto>,
}

/// Category arrives either as a plain string or as `{ name }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum CategoryDto {
    Name(String),
    Object { name: Option<String> },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MoneyDto {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub raw_value: Option<Decimal>,
    pub currency: Option<String>,
    pub display_value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SkillDto {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ClientDto {
    pub total_hires: Option<u32>,
    pub total_posted_jobs: Option<u32>,
    pub total_reviews: Option<u32>,
    pub total_feedback: Option<f64>,
    pub verification_status: Option<String>,
    pub total_spent: Option<MoneyDto>,
    pub location: Option<LocationDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LocationDto {
    pub country: Option<String>,
}

/// Accept a decimal encoded as a JSON string or number; anything else is `None`.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => parse_decimal(&s),
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        _ => None,
    })
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

impl From<MoneyDto> for Money {
    fn from(dto: MoneyDto) -> Self {
        Money {
            amount: dto.raw_value,
            currency: dto.currency,
            display: dto.display_value,
        }
    }
}

impl From<ClientDto> for ClientProfile {
    fn from(dto: ClientDto) -> Self {
        ClientProfile {
            total_hires: dto.total_hires,
            total_posted_jobs: dto.total_posted_jobs,
            total_reviews: dto.total_reviews,
            total_feedback: dto.total_feedback,
            verification_status: dto.verification_status,
            total_spent: dto.total_spent.map(Money::from),
            country: dto.location.and_then(|l| l.country),
        }
    }
}

impl PostingNode {
    /// Convert into a domain posting; `None` when the node has no id.
    pub fn into_posting(self) -> Option<Posting> {
        let id = self.id.and_then(PostingId::parse)?;

        let created_at = self
            .created_date_time
            .as_deref()
            .and_then(|raw| match DateTime::parse_from_rfc3339(raw) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(e) => {
                    warn!(posting_id = %id, value = raw, error = %e, "Unparsable posting timestamp");
                    None
                }
            });

        let budget = Budget::classify(
            self.hourly_budget_min.map(Money::from),
            self.hourly_budget_max.map(Money::from),
            self.amount.map(Money::from),
        );

        let mut posting = Posting::new(id, self.title.unwrap_or_default());
        posting.description = self.description;
        posting.ciphertext = self.ciphertext;
        posting.created_at = created_at;
        posting.experience_level = self.experience_level;
        posting.duration = self.duration;
        posting.total_applicants = self.total_applicants;
        posting.budget = budget;
        posting.client = self.client.map(ClientProfile::from);
        posting.category = self.category.and_then(|c| match c {
            CategoryDto::Name(name) => Some(name),
            CategoryDto::Object { name } => name,
        });
        posting.skills = self
            .skills
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| s.name)
            .filter(|s| !s.trim().is_empty())
            .collect();
        Some(posting)
    }
}
