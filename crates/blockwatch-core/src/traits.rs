use std::future::Future;
use std::path::PathBuf;

use crate::domains::Domain;
use crate::error::AppError;
use crate::models::{Evidence, ProbeOutcome, Verdict};

/// Performs one classified request for a domain.
///
/// Implementations swallow transport errors into
/// [`ProbeOutcome::TransientError`]; a probe never fails the batch.
pub trait Prober: Send + Sync + Clone + 'static {
    fn probe(&self, domain: &Domain) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Persists captured block pages.
pub trait EvidenceStore: Send + Sync + Clone + 'static {
    /// Save the evidence and return where it was written.
    fn save(&self, evidence: &Evidence) -> impl Future<Output = Result<PathBuf, AppError>> + Send;
}

/// Append-only destination for verdicts.
///
/// Called concurrently from many pipelines; each call must emit one
/// complete, non-interleaved record.
pub trait ResultSink: Send + Sync + Clone + 'static {
    fn record(&self, verdict: &Verdict) -> Result<(), AppError>;
}

/// An EvidenceStore that discards everything.
#[derive(Debug, Clone)]
pub struct NullEvidenceStore;

impl EvidenceStore for NullEvidenceStore {
    async fn save(&self, _evidence: &Evidence) -> Result<PathBuf, AppError> {
        Ok(PathBuf::new())
    }
}
