use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::AppError;

/// A host name to probe.
///
/// Non-empty, contains at least one `.` and does not start with `.`.
/// Identity is the exact string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    /// Parse one line of a domain list. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let domain = raw.trim();
        if domain.is_empty() || !domain.contains('.') || domain.starts_with('.') {
            return None;
        }
        Some(Self(domain.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Read a domain list, one domain per line.
///
/// Malformed lines are dropped and duplicates collapse to their first
/// occurrence, so the result preserves first-seen order.
pub fn load_domains<R: BufRead>(reader: R) -> Result<Vec<Domain>, AppError> {
    let mut seen = HashSet::new();
    let mut domains = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(|e| AppError::InputError(format!("Failed to read line: {e}")))?;
        if let Some(domain) = Domain::parse(&line)
            && seen.insert(domain.clone())
        {
            domains.push(domain);
        }
    }

    Ok(domains)
}

/// Open and read a domain list file.
pub fn load_domains_from_path(path: &Path) -> Result<Vec<Domain>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::InputError(format!("Cannot open domain file {}: {e}", path.display()))
    })?;
    let domains = load_domains(BufReader::new(file))?;
    tracing::info!(count = domains.len(), "Loaded unique domains");
    Ok(domains)
}
