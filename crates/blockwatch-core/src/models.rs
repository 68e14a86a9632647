use std::fmt;

use crate::domains::Domain;

/// Why a single probe attempt produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The per-attempt deadline expired.
    Timeout,
    /// TCP, TLS, DNS or proxy handshake failed.
    Connect(String),
    /// The request could not be sent.
    Request(String),
    /// The response body could not be read or decoded.
    Body(String),
    /// The domain does not form a valid URL.
    InvalidUrl(String),
    /// Anything else the transport reported.
    Other(String),
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::Timeout => write!(f, "timeout"),
            ProbeFailure::Connect(msg) => write!(f, "connect: {msg}"),
            ProbeFailure::Request(msg) => write!(f, "request: {msg}"),
            ProbeFailure::Body(msg) => write!(f, "body: {msg}"),
            ProbeFailure::InvalidUrl(msg) => write!(f, "invalid url: {msg}"),
            ProbeFailure::Other(msg) => write!(f, "{msg}"),
        }
    }
}

/// Classified result of one probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A 200 response whose body contains the blocking signature.
    Blocked(String),
    /// Any response without the signature, including redirects and non-200s.
    NotBlocked,
    /// No response at all. Recoverable by retrying.
    TransientError(ProbeFailure),
}

impl ProbeOutcome {
    /// Returns true if the attempt reached a server (or the ISP's substitute).
    pub fn got_response(&self) -> bool {
        !matches!(self, ProbeOutcome::TransientError(_))
    }
}

/// Final per-domain record. Written to the sink exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub domain: Domain,
    pub isp_label: String,
    pub is_blocked: bool,
    /// Number of probe attempts made (1..=max_attempts).
    pub attempts: u32,
    /// False when no attempt received any HTTP response.
    pub conclusive: bool,
}

impl Verdict {
    /// Label written to the `is_blocked` column.
    ///
    /// With `report_inconclusive` off this is always `True` or `False`, the
    /// format downstream tooling expects.
    pub fn status_label(&self, report_inconclusive: bool) -> &'static str {
        if self.is_blocked {
            "True"
        } else if report_inconclusive && !self.conclusive {
            "Inconclusive"
        } else {
            "False"
        }
    }
}

/// Captured response body proving a block, keyed by domain and attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    pub domain: Domain,
    pub isp_label: String,
    pub attempt: u32,
    pub body: String,
}
