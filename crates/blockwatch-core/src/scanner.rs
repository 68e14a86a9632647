use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};

use crate::domains::Domain;
use crate::error::AppError;
use crate::models::Verdict;
use crate::progress::{ScanState, ScanSummary};
use crate::report::{ScanEvent, ScanReporter};
use crate::retry::{DomainChecker, RetryPolicy};
use crate::traits::{EvidenceStore, Prober, ResultSink};

/// Configuration for a scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum domain pipelines in flight at once.
    pub concurrency: usize,
    pub retry: RetryPolicy,
    /// Written to the `isp_name` column and used in evidence file names.
    pub isp_label: String,
    /// Minimum time between progress events.
    pub progress_interval: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: 500,
            retry: RetryPolicy::default(),
            isp_label: "ES_DigiSpain".to_string(),
            progress_interval: Duration::from_secs(2),
        }
    }
}

impl ScanConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_isp_label(mut self, label: impl Into<String>) -> Self {
        self.isp_label = label.into();
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.concurrency == 0 {
            return Err(AppError::ConfigError("concurrency must be at least 1".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::ConfigError("max_attempts must be at least 1".into()));
        }
        if self.isp_label.is_empty() {
            return Err(AppError::ConfigError("ISP label must not be empty".into()));
        }
        Ok(())
    }
}

/// A spawned pipeline the scheduler has not reaped yet.
struct PendingTask {
    domain: Domain,
    /// Set once the task's verdict is in the sink.
    recorded: Arc<AtomicBool>,
}

/// Bounded-parallelism scan over a fixed domain list.
///
/// Every domain gets one retrying pipeline; at most `concurrency` run at a
/// time. Each pipeline writes its own verdict to the sink as soon as it
/// finishes, so completion order is unconstrained and a slow domain never
/// holds back the others.
pub struct Scanner<P, E, S>
where
    P: Prober,
    E: EvidenceStore,
    S: ResultSink,
{
    checker: DomainChecker<P, E>,
    sink: S,
    config: ScanConfig,
}

impl<P, E, S> Scanner<P, E, S>
where
    P: Prober,
    E: EvidenceStore,
    S: ResultSink,
{
    pub fn new(prober: P, evidence: E, sink: S, config: ScanConfig) -> Result<Self, AppError> {
        config.validate()?;
        let checker = DomainChecker::new(
            prober,
            evidence,
            config.retry.clone(),
            config.isp_label.clone(),
        );
        Ok(Self {
            checker,
            sink,
            config,
        })
    }

    /// Check every domain and return once all verdicts are recorded.
    ///
    /// Only a sink failure aborts the batch; per-domain problems become
    /// `is_blocked = false` verdicts.
    pub async fn run<R: ScanReporter + 'static>(
        &self,
        domains: Vec<Domain>,
        reporter: Arc<R>,
    ) -> Result<ScanSummary, AppError> {
        let state = Arc::new(ScanState::new(
            domains.len(),
            self.config.progress_interval,
        ));
        let limiter = Arc::new(Semaphore::new(self.config.concurrency));
        let mut tasks = JoinSet::new();
        let mut pending: HashMap<Id, PendingTask> = HashMap::new();

        shielded(|| {
            reporter.report(ScanEvent::Started {
                total: domains.len(),
                concurrency: self.config.concurrency,
            })
        });

        for domain in domains {
            let permit = Arc::clone(&limiter)
                .acquire_owned()
                .await
                .map_err(|e| AppError::Generic(format!("Concurrency limiter closed: {e}")))?;

            while let Some(joined) = tasks.try_join_next_with_id() {
                self.reap(joined, &mut pending, &state, reporter.as_ref())?;
            }

            let checker = self.checker.clone();
            let sink = self.sink.clone();
            let state = Arc::clone(&state);
            let reporter = Arc::clone(&reporter);
            let recorded = Arc::new(AtomicBool::new(false));
            let task_recorded = Arc::clone(&recorded);
            let task_domain = domain.clone();

            let handle = tasks.spawn(async move {
                let _permit = permit;
                let result = checker.check(&task_domain, reporter.as_ref()).await;
                let verdict = Verdict {
                    domain: task_domain,
                    isp_label: checker.isp_label().to_string(),
                    is_blocked: result.blocked,
                    attempts: result.attempts,
                    conclusive: result.conclusive,
                };
                sink.record(&verdict)?;
                state.record(&verdict);
                task_recorded.store(true, Ordering::Release);
                announce(&verdict, &state, reporter.as_ref());
                Ok::<_, AppError>(())
            });
            pending.insert(handle.id(), PendingTask { domain, recorded });
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            self.reap(joined, &mut pending, &state, reporter.as_ref())?;
        }

        let summary = state.summary();
        shielded(|| reporter.report(ScanEvent::Finished { summary: &summary }));
        Ok(summary)
    }

    /// Handle one finished pipeline task.
    ///
    /// A pipeline that panicked before its verdict reached the sink still
    /// owes its domain one; it is recorded here as not blocked and
    /// inconclusive. Reporter calls made here cannot take the scan down.
    fn reap<R: ScanReporter + ?Sized>(
        &self,
        joined: Result<(Id, Result<(), AppError>), JoinError>,
        pending: &mut HashMap<Id, PendingTask>,
        state: &ScanState,
        reporter: &R,
    ) -> Result<(), AppError> {
        match joined {
            Ok((id, result)) => {
                pending.remove(&id);
                result
            }
            Err(join_err) => {
                let Some(task) = pending.remove(&join_err.id()) else {
                    return Ok(());
                };
                shielded(|| {
                    reporter.report(ScanEvent::PipelinePanicked {
                        domain: task.domain.as_str(),
                    })
                });
                if task.recorded.load(Ordering::Acquire) {
                    return Ok(());
                }

                let verdict = Verdict {
                    domain: task.domain,
                    isp_label: self.config.isp_label.clone(),
                    is_blocked: false,
                    attempts: 0,
                    conclusive: false,
                };
                self.sink.record(&verdict)?;
                state.record(&verdict);
                shielded(|| announce(&verdict, state, reporter));
                Ok(())
            }
        }
    }
}

/// Report a recorded verdict and emit progress if the interval elapsed.
fn announce<R: ScanReporter + ?Sized>(verdict: &Verdict, state: &ScanState, reporter: &R) {
    reporter.report(ScanEvent::Completed { verdict });

    if state.should_report() {
        let snapshot = state.snapshot();
        reporter.report(ScanEvent::Progress {
            snapshot: &snapshot,
        });
    }
}

/// Run reporter callbacks on the scheduler task; a panic there is logged
/// and swallowed.
fn shielded(f: impl FnOnce()) {
    if std::panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
        tracing::error!("Scan reporter panicked; continuing scan");
    }
}
