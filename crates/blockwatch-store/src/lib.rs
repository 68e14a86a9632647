pub mod csv_sink;
pub mod evidence;

pub use csv_sink::CsvResultSink;
pub use evidence::FsEvidenceStore;
