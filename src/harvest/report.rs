use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::harvest::outcome::CandidateOutcome;

/// Per-keyword progress: `Init → SearchFetched → Extracting → Iterating → Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordState {
    Init,
    SearchFetched,
    Extracting,
    Iterating,
    Done,
}

/// Candidates skipped, by the stage that stopped them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub fetch: usize,
    pub decode: usize,
    pub rejected: usize,
    pub persist: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.fetch + self.decode + self.rejected + self.persist
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordReport {
    pub keyword: String,
    pub state: KeywordState,
    /// The output directory could not be created.
    pub setup_failed: bool,
    pub search_failed: bool,
    pub candidates_found: usize,
    pub attempted: usize,
    /// Source images accepted; a multi-face image counts once.
    pub accepted: usize,
    pub skipped: SkipCounts,
    pub written: Vec<PathBuf>,
}

impl KeywordReport {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            state: KeywordState::Init,
            setup_failed: false,
            search_failed: false,
            candidates_found: 0,
            attempted: 0,
            accepted: 0,
            skipped: SkipCounts::default(),
            written: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: CandidateOutcome) {
        self.attempted += 1;
        match outcome {
            CandidateOutcome::Accepted { paths } => {
                self.accepted += 1;
                self.written.extend(paths);
            }
            CandidateOutcome::FetchFailed(_) => self.skipped.fetch += 1,
            CandidateOutcome::DecodeFailed(_) => self.skipped.decode += 1,
            CandidateOutcome::Rejected(_) => self.skipped.rejected += 1,
            CandidateOutcome::PersistFailed(_) => self.skipped.persist += 1,
        }
    }

    pub fn artifacts_written(&self) -> usize {
        self.written.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub mode: &'static str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub keywords: Vec<KeywordReport>,
}

impl BatchReport {
    pub fn total_accepted(&self) -> usize {
        self.keywords.iter().map(|k| k.accepted).sum()
    }
}
