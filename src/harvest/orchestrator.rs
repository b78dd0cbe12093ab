use std::sync::Arc;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::decoder;
use crate::extractor::{CandidateUrl, UrlExtractor};
use crate::fetcher::Fetcher;
use crate::harvest::outcome::CandidateOutcome;
use crate::harvest::report::{BatchReport, KeywordReport, KeywordState};
use crate::policy::{AcceptancePolicy, Decision, Policy};
use crate::sink::JpegSink;

/// Drives keywords through search, extraction and the candidate pipeline.
///
/// Everything runs on the calling task, one keyword and one candidate at a
/// time. Per-candidate failures are recorded and skipped; only quota or
/// candidate exhaustion ends a keyword.
pub struct Harvester {
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    extractor: UrlExtractor,
    policy: Policy,
    sink: JpegSink,
}

impl Harvester {
    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>, policy: Policy) -> Self {
        let extractor = UrlExtractor::from_config(&config);
        let sink = JpegSink::from_config(&config);
        Self {
            config,
            fetcher,
            extractor,
            policy,
            sink,
        }
    }

    /// Process every configured keyword in order.
    pub async fn run(&self) -> BatchReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            %run_id,
            keywords = self.config.keywords().len(),
            quota = self.config.quota(),
            policy = self.policy.name(),
            "starting harvest"
        );

        let mut keywords = Vec::with_capacity(self.config.keywords().len());
        for keyword in self.config.keywords() {
            keywords.push(self.run_keyword(keyword).await);
        }

        let report = BatchReport {
            run_id,
            mode: self.policy.name(),
            started_at,
            finished_at: Utc::now(),
            keywords,
        };
        info!(
            %run_id,
            accepted = report.total_accepted(),
            "harvest finished"
        );
        report
    }

    /// Run one keyword to completion. Never fails; problems end up in the
    /// returned report.
    pub async fn run_keyword(&self, keyword: &str) -> KeywordReport {
        let span = info_span!("keyword", keyword);
        self.run_keyword_inner(keyword).instrument(span).await
    }

    async fn run_keyword_inner(&self, keyword: &str) -> KeywordReport {
        let mut report = KeywordReport::new(keyword);

        if let Err(e) = self.sink.ensure_dirs(keyword, self.policy.mode()) {
            error!(error = %e, "could not prepare output directory, skipping keyword");
            report.setup_failed = true;
            return finish(report);
        }

        info!("searching");
        let page = match self.fetcher.search(keyword).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "search failed, skipping keyword");
                report.search_failed = true;
                return finish(report);
            }
        };
        advance(&mut report, KeywordState::SearchFetched);

        advance(&mut report, KeywordState::Extracting);
        let candidates = self.extractor.extract(&page.body_utf8);
        report.candidates_found = candidates.len();
        info!(candidates = candidates.len(), "found image urls");

        advance(&mut report, KeywordState::Iterating);
        let quota = self.config.quota();
        for (position, candidate) in candidates.iter().enumerate() {
            if report.accepted >= quota {
                debug!(
                    remaining = candidates.len() - position,
                    "quota reached, leaving remaining candidates"
                );
                break;
            }

            let outcome = self.process_candidate(keyword, report.accepted, candidate).await;
            log_outcome(candidate, &outcome);
            report.record(outcome);

            if report.accepted < quota {
                sleep(self.config.cooldown()).await;
            }
        }

        finish(report)
    }

    /// Fetch, decode, evaluate and persist one candidate.
    async fn process_candidate(
        &self,
        keyword: &str,
        accepted_so_far: usize,
        candidate: &CandidateUrl,
    ) -> CandidateOutcome {
        debug!(url = %candidate, "attempting download");

        let payload = match self.fetcher.fetch_image(candidate.as_str()).await {
            Ok(payload) => payload,
            Err(e) => return CandidateOutcome::FetchFailed(e),
        };

        let decoded = match decoder::decode(&payload.body) {
            Ok(decoded) => decoded,
            Err(e) => return CandidateOutcome::DecodeFailed(e),
        };
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            bytes = payload.content_length(),
            "decoded candidate"
        );

        match self.policy.evaluate(&decoded) {
            Decision::Reject(reason) => CandidateOutcome::Rejected(reason),
            Decision::Accept(artifacts) => {
                match self.sink.persist(keyword, accepted_so_far, &artifacts) {
                    Ok(paths) => CandidateOutcome::Accepted { paths },
                    Err(e) => CandidateOutcome::PersistFailed(e),
                }
            }
        }
    }
}

fn advance(report: &mut KeywordReport, state: KeywordState) {
    debug!(from = ?report.state, to = ?state, "keyword state");
    report.state = state;
}

fn finish(mut report: KeywordReport) -> KeywordReport {
    advance(&mut report, KeywordState::Done);
    info!(
        accepted = report.accepted,
        attempted = report.attempted,
        written = report.artifacts_written(),
        "keyword done"
    );
    report
}

fn log_outcome(candidate: &CandidateUrl, outcome: &CandidateOutcome) {
    match outcome {
        CandidateOutcome::Accepted { paths } => {
            info!(url = %candidate, files = paths.len(), "saved");
        }
        CandidateOutcome::Rejected(reason) => {
            info!(url = %candidate, %reason, "skipping image");
        }
        CandidateOutcome::FetchFailed(e) => {
            warn!(url = %candidate, error = %e, "download failed");
        }
        CandidateOutcome::DecodeFailed(e) => {
            warn!(url = %candidate, error = %e, "not a usable image");
        }
        CandidateOutcome::PersistFailed(e) => {
            error!(url = %candidate, path = %e.path.display(), error = %e, "could not save image");
        }
    }
}
