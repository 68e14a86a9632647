use std::path::Path;
use std::time::Duration;

use crate::models::{ProbeFailure, Verdict};
use crate::progress::{ProgressSnapshot, ScanSummary};

/// Events emitted during a scan for monitoring/logging.
#[derive(Debug, Clone)]
pub enum ScanEvent<'a> {
    Started {
        total: usize,
        concurrency: usize,
    },
    AttemptFailed {
        domain: &'a str,
        attempt: u32,
        failure: &'a ProbeFailure,
        will_retry: bool,
    },
    AttemptClean {
        domain: &'a str,
        attempt: u32,
        will_retry: bool,
    },
    Backoff {
        domain: &'a str,
        attempt: u32,
        delay: Duration,
    },
    BlockDetected {
        domain: &'a str,
        attempt: u32,
    },
    EvidenceSaved {
        domain: &'a str,
        path: &'a Path,
    },
    EvidenceFailed {
        domain: &'a str,
        error: &'a str,
    },
    PipelinePanicked {
        domain: &'a str,
    },
    Completed {
        verdict: &'a Verdict,
    },
    Progress {
        snapshot: &'a ProgressSnapshot,
    },
    Finished {
        summary: &'a ScanSummary,
    },
}

/// Trait for receiving scan events (decoupled logging).
pub trait ScanReporter: Send + Sync {
    fn report(&self, event: ScanEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingScanReporter;

impl ScanReporter for TracingScanReporter {
    fn report(&self, event: ScanEvent<'_>) {
        match event {
            ScanEvent::Started { total, concurrency } => {
                tracing::info!(%total, %concurrency, "Scan started");
            }
            ScanEvent::AttemptFailed {
                domain,
                attempt,
                failure,
                will_retry,
            } => {
                tracing::debug!(%domain, %attempt, %failure, %will_retry, "Probe attempt failed");
            }
            ScanEvent::AttemptClean {
                domain,
                attempt,
                will_retry,
            } => {
                tracing::debug!(%domain, %attempt, %will_retry, "No block signature");
            }
            ScanEvent::Backoff {
                domain,
                attempt,
                delay,
            } => {
                tracing::trace!(%domain, %attempt, delay_ms = %delay.as_millis(), "Backing off");
            }
            ScanEvent::BlockDetected { domain, attempt } => {
                tracing::info!(%domain, %attempt, "Block signature detected");
            }
            ScanEvent::EvidenceSaved { domain, path } => {
                tracing::debug!(%domain, path = %path.display(), "Evidence saved");
            }
            ScanEvent::EvidenceFailed { domain, error } => {
                tracing::warn!(%domain, %error, "Failed to save evidence");
            }
            ScanEvent::PipelinePanicked { domain } => {
                tracing::error!(%domain, "Probe pipeline panicked");
            }
            ScanEvent::Completed { verdict } => {
                tracing::trace!(
                    domain = %verdict.domain,
                    is_blocked = %verdict.is_blocked,
                    attempts = %verdict.attempts,
                    "Verdict recorded"
                );
            }
            ScanEvent::Progress { snapshot } => {
                tracing::info!(
                    completed = %snapshot.completed,
                    total = %snapshot.total,
                    blocked = %snapshot.blocked,
                    rate = %format!("{:.0}", snapshot.rate()),
                    "Progress"
                );
            }
            ScanEvent::Finished { summary } => {
                tracing::info!(
                    completed = %summary.completed,
                    blocked = %summary.blocked,
                    elapsed_secs = %format!("{:.1}", summary.elapsed.as_secs_f64()),
                    "Scan complete"
                );
            }
        }
    }
}

/// Reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ScanReporter for NullReporter {}
