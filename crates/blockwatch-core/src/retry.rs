use std::time::Duration;

use crate::domains::Domain;
use crate::models::{Evidence, ProbeOutcome};
use crate::report::{ScanEvent, ScanReporter};
use crate::traits::{EvidenceStore, Prober};

/// Bounded retry with a fixed inter-attempt delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Probes per domain, including the first.
    pub max_attempts: u32,
    /// Sleep between attempts. Not applied after the last one.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Returns true if another attempt follows `attempt` (1-indexed).
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Result of checking one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResult {
    /// True only if some attempt saw the blocking signature.
    pub blocked: bool,
    pub attempts: u32,
    /// False when every attempt failed before getting a response.
    pub conclusive: bool,
}

/// Runs a [`Prober`] under a [`RetryPolicy`] and captures evidence on block.
#[derive(Clone)]
pub struct DomainChecker<P, E> {
    prober: P,
    evidence: E,
    policy: RetryPolicy,
    isp_label: String,
}

impl<P: Prober, E: EvidenceStore> DomainChecker<P, E> {
    pub fn new(prober: P, evidence: E, policy: RetryPolicy, isp_label: impl Into<String>) -> Self {
        Self {
            prober,
            evidence,
            policy,
            isp_label: isp_label.into(),
        }
    }

    pub fn isp_label(&self) -> &str {
        &self.isp_label
    }

    /// Probe `domain` sequentially until a block is seen or attempts run out.
    ///
    /// A `false` result means "no block detected", which includes domains
    /// that never answered; see [`CheckResult::conclusive`].
    pub async fn check<R: ScanReporter + ?Sized>(
        &self,
        domain: &Domain,
        reporter: &R,
    ) -> CheckResult {
        let mut conclusive = false;
        let mut attempts = 0;

        for attempt in 1..=self.policy.max_attempts {
            attempts = attempt;
            let will_retry = self.policy.has_next(attempt);

            match self.prober.probe(domain).await {
                ProbeOutcome::Blocked(body) => {
                    reporter.report(ScanEvent::BlockDetected {
                        domain: domain.as_str(),
                        attempt,
                    });
                    self.save_evidence(domain, attempt, body, reporter).await;
                    return CheckResult {
                        blocked: true,
                        attempts: attempt,
                        conclusive: true,
                    };
                }
                ProbeOutcome::NotBlocked => {
                    conclusive = true;
                    reporter.report(ScanEvent::AttemptClean {
                        domain: domain.as_str(),
                        attempt,
                        will_retry,
                    });
                }
                ProbeOutcome::TransientError(failure) => {
                    reporter.report(ScanEvent::AttemptFailed {
                        domain: domain.as_str(),
                        attempt,
                        failure: &failure,
                        will_retry,
                    });
                }
            }

            if will_retry {
                reporter.report(ScanEvent::Backoff {
                    domain: domain.as_str(),
                    attempt,
                    delay: self.policy.delay,
                });
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        CheckResult {
            blocked: false,
            attempts,
            conclusive,
        }
    }

    async fn save_evidence<R: ScanReporter + ?Sized>(
        &self,
        domain: &Domain,
        attempt: u32,
        body: String,
        reporter: &R,
    ) {
        let evidence = Evidence {
            domain: domain.clone(),
            isp_label: self.isp_label.clone(),
            attempt,
            body,
        };

        match self.evidence.save(&evidence).await {
            Ok(path) => reporter.report(ScanEvent::EvidenceSaved {
                domain: domain.as_str(),
                path: &path,
            }),
            Err(e) => {
                let error = e.to_string();
                reporter.report(ScanEvent::EvidenceFailed {
                    domain: domain.as_str(),
                    error: &error,
                });
            }
        }
    }
}
