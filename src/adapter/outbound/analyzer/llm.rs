//! LLM-powered posting analyzer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::domain::{Analysis, Posting, MAX_SCORE};
use crate::error::Result;
use crate::port::{Llm, PostingAnalyzer};

const SYSTEM_PROMPT: &str =
    "You are an expert freelancer and proposal writer who helps evaluate Upwork job postings.";

/// Score used when the reply carries no parsable number.
const DEFAULT_SCORE: u8 = 5;

const NO_SUMMARY: &str = "Job analysis summary not available";
const NO_PROPOSAL: &str = "Proposal script not generated";
const NO_REASONING: &str = "Scoring reasoning not provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    Score,
    Proposal,
    Reasoning,
}

impl Section {
    const ALL: [(Section, &'static str); 4] = [
        (Section::Summary, "SUMMARY:"),
        (Section::Score, "SCORE:"),
        (Section::Proposal, "PROPOSAL_SCRIPT:"),
        (Section::Reasoning, "REASONING:"),
    ];

    /// Match a section header, returning the text after it.
    fn header(line: &str) -> Option<(Section, &str)> {
        Self::ALL.iter().find_map(|(section, marker)| {
            let head = line.get(..marker.len())?;
            head.eq_ignore_ascii_case(marker)
                .then(|| (*section, line[marker.len()..].trim()))
        })
    }
}

/// Scores postings by prompting an LLM for a sectioned reply.
pub struct LlmAnalyzer {
    llm: Arc<dyn Llm>,
}

impl LlmAnalyzer {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }

    fn build_prompt(posting: &Posting) -> String {
        let description = posting
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("N/A");
        let skills = if posting.skills.is_empty() {
            "N/A".to_string()
        } else {
            posting.skills.join(", ")
        };
        let client = posting.client.as_ref().map_or_else(
            || "N/A".to_string(),
            |c| {
                format!(
                    "{} reviews, Spent: {}, Hires: {}, Verification: {}",
                    c.total_reviews.unwrap_or(0),
                    c.total_spent
                        .as_ref()
                        .map_or_else(|| "N/A".to_string(), ToString::to_string),
                    c.total_hires
                        .map_or_else(|| "N/A".to_string(), |h| h.to_string()),
                    c.verification_status.as_deref().unwrap_or("N/A"),
                )
            },
        );

        format!(
            r"You are an expert proposal writer analyzing a job posting.

Job Post:
---
Title: {title}
Description: {description}
Budget: {budget}
Skills Required: {skills}
Client Info: {client}
---

Please provide your analysis in the following format:

SUMMARY:
[A concise 2-3 sentence summary of what the job entails]

SCORE:
[A score from 0-10 based on job quality, budget reasonableness, client reliability and project clarity]

PROPOSAL_SCRIPT:
[A compelling 30-second video proposal script that would win this job]

REASONING:
[Briefly explain the score, highlighting the key factors]",
            title = posting.title,
            budget = posting.budget,
        )
    }
}

/// Parsed reply sections.
#[derive(Debug, PartialEq, Eq)]
struct Reply {
    summary: String,
    score: u8,
    proposal_script: String,
    reasoning: String,
}

fn parse_reply(text: &str) -> Reply {
    let mut summary = Vec::new();
    let mut proposal = Vec::new();
    let mut reasoning = Vec::new();
    let mut score = None;
    let mut current = None;

    for line in text.lines().map(str::trim) {
        let rest = match Section::header(line) {
            Some((section, rest)) => {
                current = Some(section);
                rest
            }
            None => line,
        };
        if rest.is_empty() {
            continue;
        }
        match current {
            Some(Section::Summary) => summary.push(rest),
            Some(Section::Proposal) => proposal.push(rest),
            Some(Section::Reasoning) => reasoning.push(rest),
            Some(Section::Score) if score.is_none() => score = first_integer(rest),
            Some(Section::Score) | None => {}
        }
    }

    let joined = |parts: Vec<&str>, fallback: &str| {
        if parts.is_empty() {
            fallback.to_string()
        } else {
            parts.join(" ")
        }
    };

    Reply {
        summary: joined(summary, NO_SUMMARY),
        score: score.map_or(DEFAULT_SCORE, |s: u64| {
            u8::try_from(s.min(u64::from(MAX_SCORE))).unwrap_or(MAX_SCORE)
        }),
        proposal_script: joined(proposal, NO_PROPOSAL),
        reasoning: joined(reasoning, NO_REASONING),
    }
}

fn first_integer(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    Some(digits.parse().unwrap_or(u64::MAX))
}

#[async_trait]
impl PostingAnalyzer for LlmAnalyzer {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn analyze(&self, posting: &Posting) -> Result<Analysis> {
        let prompt = Self::build_prompt(posting);
        let text = self.llm.complete(SYSTEM_PROMPT, &prompt).await?;
        debug!(provider = self.llm.name(), posting_id = %posting.id, "LLM analysis complete");

        let reply = parse_reply(&text);
        info!(posting_id = %posting.id, score = reply.score, "Posting analyzed");
        Ok(Analysis {
            posting_id: posting.id.clone(),
            summary: reply.summary,
            score: reply.score,
            proposal_script: reply.proposal_script,
            reasoning: Some(reply.reasoning),
            analyzed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Budget, ClientProfile, Money};
    use crate::testkit::domain::posting;
    use rust_decimal_macros::dec;

    struct CannedLlm(&'static str);

    #[async_trait]
    impl Llm for CannedLlm {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn parses_all_sections_with_continuations() {
        let reply = parse_reply(
            "SUMMARY: Build a WordPress site.\nNeeds WooCommerce.\n\nSCORE: 8/10\n\
             PROPOSAL_SCRIPT:\nHi there,\nI build shops.\nreasoning: Clear scope.",
        );

        assert_eq!(
            reply,
            Reply {
                summary: "Build a WordPress site. Needs WooCommerce.".into(),
                score: 8,
                proposal_script: "Hi there, I build shops.".into(),
                reasoning: "Clear scope.".into(),
            }
        );
    }

    #[test]
    fn score_is_clamped_and_defaults() {
        assert_eq!(parse_reply("SCORE: 42").score, 10);
        assert_eq!(parse_reply("SCORE:\n7").score, 7);
        assert_eq!(parse_reply("SCORE: high").score, DEFAULT_SCORE);
        assert_eq!(parse_reply("nothing useful").score, DEFAULT_SCORE);
        assert_eq!(parse_reply("SCORE: 99999999999999999999999").score, 10);
    }

    #[test]
    fn missing_sections_get_fallbacks() {
        let reply = parse_reply("SCORE: 3");
        assert_eq!(reply.summary, NO_SUMMARY);
        assert_eq!(reply.proposal_script, NO_PROPOSAL);
        assert_eq!(reply.reasoning, NO_REASONING);
    }

    #[test]
    fn prompt_includes_posting_facts() {
        let mut p = posting("abc", "WooCommerce store");
        p.skills = vec!["WordPress".into(), "PHP".into()];
        p.budget = Budget::Fixed(Money::new(dec!(750)));
        p.client = Some(ClientProfile {
            total_reviews: Some(12),
            verification_status: Some("VERIFIED".into()),
            ..Default::default()
        });

        let prompt = LlmAnalyzer::build_prompt(&p);

        assert!(prompt.contains("Title: WooCommerce store"));
        assert!(prompt.contains("Budget: Fixed: $750"));
        assert!(prompt.contains("Skills Required: WordPress, PHP"));
        assert!(prompt.contains("12 reviews"));
        assert!(prompt.contains("Verification: VERIFIED"));
    }

    #[tokio::test]
    async fn analyze_builds_analysis_for_posting() {
        let analyzer = LlmAnalyzer::new(Arc::new(CannedLlm("SUMMARY: ok\nSCORE: 9")));
        let analysis = analyzer.analyze(&posting("abc", "Site")).await.unwrap();

        assert_eq!(analysis.posting_id.as_str(), "abc");
        assert_eq!(analysis.score, 9);
        assert!(analysis.meets(7));
    }
}
