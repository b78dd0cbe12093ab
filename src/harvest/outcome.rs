use std::path::PathBuf;

use crate::decoder::DecodeError;
use crate::fetcher::FetchError;
use crate::policy::RejectReason;
use crate::sink::PersistError;

/// What happened to one candidate. Everything except `Accepted` is a skip.
#[derive(Debug)]
pub enum CandidateOutcome {
    Accepted { paths: Vec<PathBuf> },
    FetchFailed(FetchError),
    DecodeFailed(DecodeError),
    Rejected(RejectReason),
    PersistFailed(PersistError),
}
