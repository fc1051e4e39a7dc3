//! Fake collaborators: notifier, analyzer and credential persistence.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::domain::{Analysis, Posting, PostingId};
use crate::error::{Error, PersistenceError, Result};
use crate::port::{CredentialPersistence, PostingAnalyzer, PostingNotifier};

/// Thread-safe notification collector for assertions in tests.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    delivered: Arc<Mutex<Vec<(PostingId, Option<u8>)>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier that records each call and then reports failure.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.delivered.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Posting ids in delivery order.
    pub fn ids(&self) -> Vec<String> {
        self.delivered
            .lock()
            .iter()
            .map(|(id, _)| id.to_string())
            .collect()
    }

    /// Scores passed along with each delivery.
    pub fn scores(&self) -> Vec<Option<u8>> {
        self.delivered
            .lock()
            .iter()
            .map(|(_, score)| *score)
            .collect()
    }
}

#[async_trait]
impl PostingNotifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn notify(&self, posting: &Posting, analysis: Option<&Analysis>) -> Result<()> {
        self.delivered
            .lock()
            .push((posting.id.clone(), analysis.map(|a| a.score)));
        if self.fail {
            return Err(Error::Connection("notification service unavailable".into()));
        }
        Ok(())
    }
}

/// Analyzer returning queued scores; `None` entries produce errors.
///
/// When the queue is empty every call fails.
#[derive(Clone, Default)]
pub struct ScriptedAnalyzer {
    scores: Arc<Mutex<VecDeque<Option<u8>>>>,
    calls: Arc<Mutex<usize>>,
}

impl ScriptedAnalyzer {
    pub fn new(scores: Vec<Option<u8>>) -> Self {
        Self {
            scores: Arc::new(Mutex::new(scores.into())),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl PostingAnalyzer for ScriptedAnalyzer {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn analyze(&self, posting: &Posting) -> Result<Analysis> {
        *self.calls.lock() += 1;
        let next = self.scores.lock().pop_front();
        match next.flatten() {
            Some(score) => Ok(Analysis {
                posting_id: posting.id.clone(),
                summary: format!("Summary of {}", posting.title),
                score,
                proposal_script: "Hi, I can help.".into(),
                reasoning: None,
                analyzed_at: Utc::now(),
            }),
            None => Err(Error::Connection("analysis backend unavailable".into())),
        }
    }
}

/// In-memory [`CredentialPersistence`] that records every save.
#[derive(Clone, Default)]
pub struct MemoryCredentials {
    saved: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// All saved `(access, refresh)` pairs in order.
    pub fn saved(&self) -> Vec<(String, String)> {
        self.saved.lock().clone()
    }
}

impl CredentialPersistence for MemoryCredentials {
    fn save(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        if self.fail {
            return Err(PersistenceError::Write {
                path: "memory".into(),
                source: std::io::Error::other("read-only store"),
            }
            .into());
        }
        self.saved
            .lock()
            .push((access_token.to_string(), refresh_token.to_string()));
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}
