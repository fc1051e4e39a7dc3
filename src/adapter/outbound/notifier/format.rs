//! Message formatting for push notifications.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;

use crate::domain::{Analysis, ClientProfile, Posting};

/// Longest description excerpt included in a message.
pub const DESCRIPTION_LIMIT: usize = 250;

/// Longest proposal script excerpt included in a message.
const PROPOSAL_LIMIT: usize = 300;

/// Score from which a notification is sent with high priority.
pub const HIGH_PRIORITY_SCORE: u8 = 8;

/// Notification title.
pub fn title(analysis: Option<&Analysis>) -> String {
    match analysis {
        Some(a) => format!("New Job Match! ({}/10)", a.score),
        None => "New Job Match!".to_string(),
    }
}

/// Pushover priority: 1 for high scores, else 0.
pub fn priority(analysis: Option<&Analysis>) -> i8 {
    match analysis {
        Some(a) if a.score >= HIGH_PRIORITY_SCORE => 1,
        _ => 0,
    }
}

/// HTML message body.
pub fn message(posting: &Posting, analysis: Option<&Analysis>, now: DateTime<Utc>) -> String {
    let mut lines = vec![format!("<b>{}</b>", escape_html(&posting.title)), String::new()];

    if let Some(a) = analysis {
        lines.push(format!("<b>AI Score: {}/10</b>", a.score));
        lines.push(escape_html(&a.summary));
        lines.push(String::new());
    }

    lines.push(escape_html(&posting.budget.to_string()));
    lines.extend(client_lines(posting.client.as_ref()));
    let applicants = posting
        .total_applicants
        .map_or_else(|| "?".to_string(), |n| n.to_string());
    lines.push(format!(
        "{} • {applicants} proposals",
        posted_ago(posting.created_at, now)
    ));

    match analysis.filter(|a| !a.proposal_script.trim().is_empty()) {
        Some(a) => {
            lines.push(String::new());
            lines.push("<b>Proposal Script:</b>".to_string());
            lines.push(format!(
                "<i>{}</i>",
                escape_html(&truncate(&a.proposal_script, PROPOSAL_LIMIT))
            ));
        }
        None => {
            let description = clean_description(posting.description.as_deref().unwrap_or(""));
            if !description.is_empty() {
                lines.push(String::new());
                lines.push(escape_html(&description));
            }
        }
    }

    lines.join("\n")
}

fn client_lines(client: Option<&ClientProfile>) -> Vec<String> {
    let Some(client) = client else {
        return vec!["New client (no info)".to_string()];
    };
    let mut lines = Vec::new();

    let mut badges = Vec::new();
    if client.is_verified() {
        badges.push("Verified client".to_string());
    }
    if let Some(rating) = client.total_feedback.filter(|r| *r > 0.0) {
        badges.push(format!("{rating:.1} rating"));
    }
    if !badges.is_empty() {
        lines.push(badges.join(" • "));
    }

    let mut stats = Vec::new();
    if let Some(posted) = client.total_posted_jobs.filter(|p| *p > 0) {
        stats.push(format!("{posted} jobs"));
    }
    if let Some(hires) = client.total_hires.filter(|h| *h > 0) {
        stats.push(format!("{hires} hires"));
    }
    if let Some(rate) = client.hire_rate() {
        stats.push(format!("{rate:.0}% hire rate"));
    }
    if !stats.is_empty() {
        lines.push(stats.join(" • "));
    }

    if let Some(spent) = client.total_spent.as_ref() {
        match spent.amount.and_then(|a| a.to_f64()) {
            Some(amount) => lines.push(format!("{} total spent", compact_usd(amount))),
            None => {
                if let Some(display) = spent.display.as_deref().filter(|d| !d.is_empty()) {
                    lines.push(format!("{display} total spent"));
                }
            }
        }
    }
    lines
}

fn compact_usd(amount: f64) -> String {
    if amount >= 1_000_000.0 {
        format!("${:.1}M", amount / 1_000_000.0)
    } else if amount >= 1_000.0 {
        format!("${:.0}K", amount / 1_000.0)
    } else {
        format!("${amount:.0}")
    }
}

/// Relative age of a posting, e.g. `3 hours ago`.
pub fn posted_ago(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created_at) = created_at else {
        return "Just now".to_string();
    };
    let elapsed = now.signed_duration_since(created_at);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };
    if elapsed.num_days() > 0 {
        plural(elapsed.num_days(), "day")
    } else if elapsed.num_hours() > 0 {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_minutes().max(0), "minute")
    }
}

/// Strip tags, decode common entities, collapse whitespace and truncate at a
/// word boundary.
pub fn clean_description(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= DESCRIPTION_LIMIT {
        return collapsed;
    }
    let head: String = collapsed.chars().take(DESCRIPTION_LIMIT).collect();
    let cut = head.rsplit_once(' ').map_or(head.as_str(), |(before, _)| before);
    format!("{cut}...")
}

/// Truncate to `max_chars` characters, appending an ellipsis when cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Escape text for Pushover's HTML subset.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Budget, Money};
    use crate::testkit::domain::posting;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn analysis(score: u8) -> Analysis {
        Analysis {
            posting_id: crate::testkit::domain::posting_id("abc"),
            summary: "Short summary".into(),
            score,
            proposal_script: "Hi, I'm your developer.".into(),
            reasoning: None,
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn clean_description_strips_tags_and_collapses_whitespace() {
        let cleaned = clean_description("<p>Build&nbsp;a <b>shop</b></p>\n\n  with   WooCommerce &amp; Stripe");
        assert_eq!(cleaned, "Build a shop with WooCommerce & Stripe");
    }

    #[test]
    fn clean_description_truncates_on_word_boundary() {
        let long = "word ".repeat(100);
        let cleaned = clean_description(&long);

        assert!(cleaned.ends_with("..."));
        assert!(cleaned.chars().count() <= DESCRIPTION_LIMIT + 3);
        assert!(!cleaned.trim_end_matches("...").ends_with(' '));
    }

    #[test]
    fn priority_is_raised_for_high_scores_only() {
        assert_eq!(priority(None), 0);
        assert_eq!(priority(Some(&analysis(7))), 0);
        assert_eq!(priority(Some(&analysis(8))), 1);
        assert_eq!(title(Some(&analysis(9))), "New Job Match! (9/10)");
    }

    #[test]
    fn message_prefers_proposal_over_description() {
        let mut p = posting("abc", "Shop <setup>");
        p.budget = Budget::Fixed(Money::new(dec!(750)));
        let now = Utc::now();
        p.created_at = Some(now - Duration::hours(2));

        let with_analysis = message(&p, Some(&analysis(8)), now);
        assert!(with_analysis.contains("<b>Shop &lt;setup&gt;</b>"));
        assert!(with_analysis.contains("AI Score: 8/10"));
        assert!(with_analysis.contains("Proposal Script"));
        assert!(with_analysis.contains("2 hours ago"));
        assert!(!with_analysis.contains("Description for"));

        let plain = message(&p, None, now);
        assert!(plain.contains("Description for Shop"));
        assert!(plain.contains("New client (no info)"));
        assert!(plain.contains("Fixed: $750"));
    }

    #[test]
    fn client_lines_summarize_reputation() {
        let client = ClientProfile {
            total_hires: Some(3),
            total_posted_jobs: Some(4),
            total_feedback: Some(4.87),
            verification_status: Some("VERIFIED".into()),
            total_spent: Some(Money::new(dec!(12000))),
            ..Default::default()
        };
        let lines = client_lines(Some(&client));

        assert_eq!(lines[0], "Verified client • 4.9 rating");
        assert_eq!(lines[1], "4 jobs • 3 hires • 75% hire rate");
        assert_eq!(lines[2], "$12K total spent");
    }
}
