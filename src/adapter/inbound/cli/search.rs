//! One-shot search printed as a table.
//!
//! Results are not recorded in the ledger, so a later `run` still notifies
//! about them.

use std::path::Path;

use chrono::Utc;
use serde_json::json;
use tabled::{Table, Tabled};

use super::command::SearchArgs;
use super::output;
use crate::adapter::outbound::notifier::format::{posted_ago, truncate};
use crate::domain::{Posting, SearchCriterion};
use crate::error::{ConfigError, Result};
use crate::infrastructure::bootstrap::{build_http, connect};
use crate::infrastructure::config::Config;
use crate::port::JobSource;

const TITLE_WIDTH: usize = 60;

#[derive(Tabled)]
struct PostingRow {
    #[tabled(rename = "Posted")]
    posted: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Budget")]
    budget: String,
    #[tabled(rename = "Applicants")]
    applicants: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl PostingRow {
    fn from_posting(posting: &Posting) -> Self {
        let now = Utc::now();
        Self {
            posted: match posting.created_at {
                Some(_) => posted_ago(posting.created_at, now),
                None => "-".to_string(),
            },
            title: truncate(&posting.title, TITLE_WIDTH),
            budget: posting.budget.to_string(),
            applicants: posting
                .total_applicants
                .map_or_else(|| "-".to_string(), |n| n.to_string()),
            id: posting.id.to_string(),
        }
    }
}

/// Run one search with the given filters.
pub async fn execute(config_path: &Path, args: &SearchArgs) -> Result<()> {
    if args.limit == 0 {
        return Err(ConfigError::InvalidValue {
            field: "limit",
            reason: "must be greater than 0".into(),
        }
        .into());
    }

    let config = Config::load(config_path)?;
    config.init_logging();

    let client = connect(&config, build_http(&config))?;
    let criterion = SearchCriterion::new(
        args.query.clone(),
        args.hourly_min,
        args.budget_min,
        args.limit,
    );
    let postings = client.search_jobs(&criterion).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "search",
            "query": criterion.query,
            "postings": postings.iter().map(posting_json).collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    output::header();
    output::section(&format!("Results for '{}'", criterion.query));
    if postings.is_empty() {
        output::warning("No postings matched");
        return Ok(());
    }

    let rows: Vec<PostingRow> = postings.iter().map(PostingRow::from_posting).collect();
    output::lines(&Table::new(rows).to_string());
    output::field("Found", postings.len());
    Ok(())
}

fn posting_json(posting: &Posting) -> serde_json::Value {
    json!({
        "id": posting.id.as_str(),
        "title": posting.title,
        "budget": posting.budget.to_string(),
        "created_at": posting.created_at.map(|at| at.to_rfc3339()),
        "total_applicants": posting.total_applicants,
        "skills": posting.skills,
        "url": posting.url(),
    })
}
