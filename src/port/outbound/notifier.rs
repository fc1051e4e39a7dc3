//! Notifier port for new postings.

use async_trait::async_trait;
use tracing::info;

use crate::domain::{Analysis, Posting};
use crate::error::Result;

/// Delivers a qualifying posting to the user.
///
/// Calls are made one at a time, in discovery order.
#[async_trait]
pub trait PostingNotifier: Send + Sync {
    /// Return the notifier name for logging.
    fn name(&self) -> &'static str;

    /// Deliver a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery failed. Failures are logged by the
    /// caller and never stop polling.
    async fn notify(&self, posting: &Posting, analysis: Option<&Analysis>) -> Result<()>;
}

/// A logging notifier that logs postings via tracing.
pub struct LogNotifier;

#[async_trait]
impl PostingNotifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, posting: &Posting, analysis: Option<&Analysis>) -> Result<()> {
        info!(
            posting_id = %posting.id,
            title = %posting.title,
            budget = %posting.budget,
            score = analysis.map(|a| a.score),
            url = posting.url().as_deref().unwrap_or("-"),
            "New posting"
        );
        Ok(())
    }
}
