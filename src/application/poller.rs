//! Poll loop: search, deduplicate, score, notify, record.
//!
//! One cycle runs one search criterion (round-robin over the configured
//! list) and processes the returned postings strictly in order. Every new
//! posting is marked seen once handling finishes, whatever happened to its
//! analysis or notification, so a flaky collaborator never causes repeats
//! or endless retries.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::domain::{Analysis, Posting, SearchCriterion, MAX_SCORE};
use crate::error::{ConfigError, Error, Result};
use crate::port::{JobSource, PostingAnalyzer, PostingNotifier, SeenLedger};

/// Poll loop timing and notification threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Pause between cycles.
    pub interval: Duration,
    /// Pause between postings within a cycle.
    pub posting_delay: Duration,
    /// Minimum analysis score for a notification.
    pub min_score: u8,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            posting_delay: Duration::from_secs(1),
            min_score: 7,
        }
    }
}

/// Counters for one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub criterion: String,
    pub found: usize,
    pub new: usize,
    pub notified: usize,
    pub below_threshold: usize,
    pub failed_notifications: usize,
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}': {} found, {} new, {} notified",
            self.criterion, self.found, self.new, self.notified
        )
    }
}

/// Drives the search/notify loop.
pub struct Poller {
    source: Arc<dyn JobSource>,
    ledger: Arc<dyn SeenLedger>,
    analyzer: Option<Arc<dyn PostingAnalyzer>>,
    notifier: Arc<dyn PostingNotifier>,
    criteria: Vec<SearchCriterion>,
    config: PollerConfig,
    next: usize,
}

impl Poller {
    /// Create a poller over a non-empty list of criteria.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `criteria` is empty or the
    /// threshold exceeds the maximum score.
    pub fn new(
        source: Arc<dyn JobSource>,
        ledger: Arc<dyn SeenLedger>,
        notifier: Arc<dyn PostingNotifier>,
        criteria: Vec<SearchCriterion>,
        config: PollerConfig,
    ) -> Result<Self> {
        if criteria.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "searches",
                reason: "at least one search criterion is required".into(),
            }
            .into());
        }
        if config.min_score > MAX_SCORE {
            return Err(ConfigError::InvalidValue {
                field: "min_score",
                reason: format!("must be at most {MAX_SCORE}"),
            }
            .into());
        }
        Ok(Self {
            source,
            ledger,
            analyzer: None,
            notifier,
            criteria,
            config,
            next: 0,
        })
    }

    /// Score postings before deciding whether to notify.
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Arc<dyn PostingAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Run until shutdown is requested or a fatal error occurs.
    ///
    /// Recoverable errors abandon the current cycle only.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error (authentication or configuration).
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            criteria = self.criteria.len(),
            interval_secs = self.config.interval.as_secs(),
            min_score = self.config.min_score,
            analyzer = self.analyzer.as_ref().map(|a| a.name()),
            notifier = self.notifier.name(),
            "Poller starting"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.run_cycle(&mut shutdown).await {
                Ok(report) => info!(
                    criterion = %report.criterion,
                    found = report.found,
                    new = report.new,
                    notified = report.notified,
                    below_threshold = report.below_threshold,
                    failed_notifications = report.failed_notifications,
                    "Poll cycle complete"
                ),
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "Fatal error, stopping poller");
                    return Err(e);
                }
                Err(e) => warn!(error = %e, "Poll cycle failed, continuing"),
            }

            debug!(secs = self.config.interval.as_secs(), "Waiting before next cycle");
            if wait_or_shutdown(self.config.interval, &mut shutdown).await {
                break;
            }
        }

        info!("Poller stopped");
        Ok(())
    }

    /// Run one cycle against the next criterion.
    ///
    /// # Errors
    ///
    /// Returns the search error, or a fatal error hit while fetching
    /// posting details (after that posting was recorded).
    pub async fn run_cycle(&mut self, shutdown: &mut watch::Receiver<bool>) -> Result<CycleReport> {
        let criterion = self.advance().clone();
        let mut report = CycleReport {
            criterion: criterion.query.clone(),
            ..CycleReport::default()
        };
        debug!(criterion = %criterion.query, "Searching");

        let postings = self.source.search_jobs(&criterion).await?;
        report.found = postings.len();

        let mut first = true;
        for posting in postings {
            if *shutdown.borrow() {
                info!(criterion = %criterion.query, "Shutdown requested, ending cycle early");
                break;
            }
            if !self.ledger.is_new(posting.id.as_str()) {
                continue;
            }
            if !first
                && !self.config.posting_delay.is_zero()
                && wait_or_shutdown(self.config.posting_delay, shutdown).await
            {
                break;
            }
            first = false;
            report.new += 1;
            self.process(posting, &mut report).await?;
        }

        Ok(report)
    }

    fn advance(&mut self) -> &SearchCriterion {
        let idx = self.next % self.criteria.len();
        self.next = (idx + 1) % self.criteria.len();
        &self.criteria[idx]
    }

    async fn process(&self, summary: Posting, report: &mut CycleReport) -> Result<()> {
        let id = summary.id.clone();
        info!(posting_id = %id, title = %summary.title, "New posting");

        let (posting, fatal) = self.complete(summary).await;
        let analysis = self.analyze(&posting).await;

        if Self::qualifies(analysis.as_ref(), self.config.min_score) {
            match self.notifier.notify(&posting, analysis.as_ref()).await {
                Ok(()) => report.notified += 1,
                Err(e) => {
                    report.failed_notifications += 1;
                    warn!(
                        posting_id = %id,
                        notifier = self.notifier.name(),
                        error = %e,
                        "Notification failed"
                    );
                }
            }
        } else {
            report.below_threshold += 1;
            debug!(
                posting_id = %id,
                score = analysis.as_ref().map(|a| a.score),
                min_score = self.config.min_score,
                "Below notification threshold"
            );
        }

        if let Err(e) = self.ledger.mark_seen(id.as_str()) {
            error!(posting_id = %id, error = %e, "Failed to record posting as seen");
        }

        fatal.map_or(Ok(()), Err)
    }

    /// Fetch full details when the search result came without a
    /// description. Falls back to the summary record on failure; a fatal
    /// failure is handed back so the caller can stop after recording.
    async fn complete(&self, summary: Posting) -> (Posting, Option<Error>) {
        if !summary.lacks_description() {
            return (summary, None);
        }
        match self.source.posting_details(&summary.id).await {
            Ok(full) => (full, None),
            Err(e) => {
                warn!(posting_id = %summary.id, error = %e, "Failed to fetch posting details");
                let fatal = e.is_fatal().then_some(e);
                (summary, fatal)
            }
        }
    }

    async fn analyze(&self, posting: &Posting) -> Option<Analysis> {
        let analyzer = self.analyzer.as_ref()?;
        match analyzer.analyze(posting).await {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                warn!(
                    posting_id = %posting.id,
                    analyzer = analyzer.name(),
                    error = %e,
                    "Analysis failed, continuing without a score"
                );
                None
            }
        }
    }

    /// Postings without a score always qualify.
    fn qualifies(analysis: Option<&Analysis>, min_score: u8) -> bool {
        analysis.map_or(true, |a| a.meets(min_score))
    }
}

/// Deadline used when `now + duration` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Sleep for `duration`, returning early with `true` if shutdown is
/// requested or the shutdown sender is gone.
async fn wait_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let now = Instant::now();
    let deadline = now
        .checked_add(duration)
        .unwrap_or_else(|| now + FAR_FUTURE);
    loop {
        if *shutdown.borrow() {
            return true;
        }
        tokio::select! {
            () = sleep_until(deadline) => return false,
            result = shutdown.changed() => {
                if result.is_err() {
                    info!("Shutdown channel closed");
                    return true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::posting;

    #[test]
    fn unscored_postings_qualify() {
        assert!(Poller::qualifies(None, 10));
    }

    #[test]
    fn scored_postings_must_reach_threshold() {
        let mut analysis = Analysis {
            posting_id: posting("a", "a").id,
            summary: String::new(),
            score: 6,
            proposal_script: String::new(),
            reasoning: None,
            analyzed_at: chrono::Utc::now(),
        };
        assert!(!Poller::qualifies(Some(&analysis), 7));
        analysis.score = 7;
        assert!(Poller::qualifies(Some(&analysis), 7));
    }

    #[tokio::test]
    async fn wait_returns_early_on_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        let waiter = tokio::spawn(async move {
            let started = Instant::now();
            let stopped = wait_or_shutdown(Duration::from_secs(60), &mut rx).await;
            (stopped, started.elapsed())
        });
        tx.send(true).unwrap();

        let (stopped, elapsed) = waiter.await.unwrap();
        assert!(stopped);
        assert!(elapsed < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn wait_completes_without_shutdown() {
        let (_tx, mut rx) = watch::channel(false);
        assert!(!wait_or_shutdown(Duration::from_millis(10), &mut rx).await);
    }

    #[tokio::test]
    async fn huge_wait_is_capped_and_still_interruptible() {
        let (tx, mut rx) = watch::channel(false);
        let waiter = tokio::spawn(async move {
            wait_or_shutdown(Duration::from_secs(u64::MAX), &mut rx).await
        });
        tokio::task::yield_now().await;
        tx.send(true).unwrap();

        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn closed_channel_counts_as_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        assert!(wait_or_shutdown(Duration::from_secs(60), &mut rx).await);
    }
}
