use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use blockwatch_core::error::AppError;
use blockwatch_core::models::Verdict;
use blockwatch_core::traits::ResultSink;
use serde::Serialize;

/// Column names of the results file.
pub const HEADER: [&str; 3] = ["domain", "isp_name", "is_blocked"];

#[derive(Serialize)]
struct VerdictRow<'a> {
    domain: &'a str,
    isp_name: &'a str,
    is_blocked: &'a str,
}

/// Streams verdicts to CSV, one flushed row per call.
///
/// The writer sits behind a mutex so concurrent pipelines each emit a whole
/// row; a crash mid-scan leaves every completed verdict on disk.
pub struct CsvResultSink<W: Write + Send + 'static = File> {
    writer: Arc<Mutex<csv::Writer<W>>>,
    report_inconclusive: bool,
}

impl<W: Write + Send + 'static> Clone for CsvResultSink<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
            report_inconclusive: self.report_inconclusive,
        }
    }
}

impl CsvResultSink<File> {
    /// Create (or truncate) the results file and write the header.
    pub fn create(path: &Path) -> Result<Self, AppError> {
        let file = File::create(path).map_err(|e| {
            AppError::OutputError(format!("Cannot create {}: {e}", path.display()))
        })?;
        Self::from_writer(file)
    }
}

impl<W: Write + Send + 'static> CsvResultSink<W> {
    pub fn from_writer(inner: W) -> Result<Self, AppError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(HEADER).map_err(output_error)?;
        writer.flush().map_err(|e| AppError::OutputError(e.to_string()))?;

        Ok(Self {
            writer: Arc::new(Mutex::new(writer)),
            report_inconclusive: false,
        })
    }

    /// Write `Inconclusive` instead of `False` when no attempt got a response.
    pub fn with_inconclusive(mut self, enabled: bool) -> Self {
        self.report_inconclusive = enabled;
        self
    }
}

impl<W: Write + Send + 'static> ResultSink for CsvResultSink<W> {
    fn record(&self, verdict: &Verdict) -> Result<(), AppError> {
        let row = VerdictRow {
            domain: verdict.domain.as_str(),
            isp_name: &verdict.isp_label,
            is_blocked: verdict.status_label(self.report_inconclusive),
        };

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| AppError::OutputError("Result writer poisoned".into()))?;
        writer.serialize(row).map_err(output_error)?;
        writer
            .flush()
            .map_err(|e| AppError::OutputError(e.to_string()))
    }
}

fn output_error(e: csv::Error) -> AppError {
    AppError::OutputError(e.to_string())
}
