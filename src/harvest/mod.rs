//! Keyword batch orchestration.

pub mod orchestrator;
pub mod outcome;
pub mod report;

pub use orchestrator::Harvester;
pub use outcome::CandidateOutcome;
pub use report::{BatchReport, KeywordReport, KeywordState, SkipCounts};
