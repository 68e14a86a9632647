pub mod domains;
pub mod error;
pub mod models;
pub mod progress;
pub mod report;
pub mod retry;
pub mod scanner;
pub mod traits;


pub use domains::{Domain, load_domains, load_domains_from_path};
pub use error::AppError;
pub use models::{Evidence, ProbeFailure, ProbeOutcome, Verdict};
pub use progress::{ProgressSnapshot, ScanState, ScanSummary};
pub use report::{NullReporter, ScanEvent, ScanReporter, TracingScanReporter};
pub use retry::{CheckResult, DomainChecker, RetryPolicy};
pub use scanner::{ScanConfig, Scanner};
pub use traits::{EvidenceStore, NullEvidenceStore, Prober, ResultSink};
