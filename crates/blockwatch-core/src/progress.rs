//! Shared scan counters and progress telemetry.
//!
//! [`ScanState`] is the only mutable state shared by every pipeline besides
//! the result sink. All updates are atomic, so completions never contend on a
//! lock, and the rate-limited progress check is a single compare-exchange.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

use crate::models::Verdict;

/// Process-wide counters for one scan.
#[derive(Debug)]
pub struct ScanState {
    total: u64,
    completed: AtomicU64,
    blocked: AtomicU64,
    inconclusive: AtomicU64,
    started: Instant,
    report_interval: Duration,
    /// Milliseconds since `started` at the last progress emission.
    last_report_ms: AtomicU64,
}

impl ScanState {
    pub fn new(total: usize, report_interval: Duration) -> Self {
        Self {
            total: total as u64,
            completed: AtomicU64::new(0),
            blocked: AtomicU64::new(0),
            inconclusive: AtomicU64::new(0),
            started: Instant::now(),
            report_interval,
            last_report_ms: AtomicU64::new(0),
        }
    }

    /// Count a verdict. Returns the new completed count.
    pub fn record(&self, verdict: &Verdict) -> u64 {
        if verdict.is_blocked {
            self.blocked.fetch_add(1, Ordering::Relaxed);
        } else if !verdict.conclusive {
            self.inconclusive.fetch_add(1, Ordering::Relaxed);
        }
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns true at most once per report interval.
    ///
    /// Concurrent callers race on a compare-exchange; exactly one wins.
    pub fn should_report(&self) -> bool {
        let now = self.started.elapsed().as_millis() as u64;
        let last = self.last_report_ms.load(Ordering::Acquire);
        if now.saturating_sub(last) < self.report_interval.as_millis() as u64 {
            return false;
        }
        self.last_report_ms
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed.load(Ordering::Relaxed),
            total: self.total,
            blocked: self.blocked.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        }
    }

    /// Freeze the counters into a final summary.
    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            total: self.total,
            completed: self.completed.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            inconclusive: self.inconclusive.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        }
    }
}

/// Point-in-time view of scan progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub completed: u64,
    pub total: u64,
    pub blocked: u64,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 * 100.0 / self.total as f64
    }

    /// Completions per second.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.completed as f64 / secs
        } else {
            0.0
        }
    }

    pub fn eta(&self) -> Duration {
        let rate = self.rate();
        if rate <= 0.0 {
            return Duration::ZERO;
        }
        let remaining = self.total.saturating_sub(self.completed) as f64;
        Duration::from_secs_f64(remaining / rate)
    }
}

/// Frozen totals at the end of a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSummary {
    pub total: u64,
    pub completed: u64,
    pub blocked: u64,
    /// Non-block verdicts where no attempt got any response.
    pub inconclusive: u64,
    pub elapsed: Duration,
}

impl ScanSummary {
    /// Average checks per second over the whole run.
    pub fn average_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total as f64 / secs
        } else {
            0.0
        }
    }
}
