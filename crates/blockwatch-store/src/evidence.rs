use std::path::{Path, PathBuf};

use blockwatch_core::error::AppError;
use blockwatch_core::models::Evidence;
use blockwatch_core::traits::EvidenceStore;

/// Writes captured block pages to `<root>/<domain>/<isp>_attempt<N>.html`.
#[derive(Debug, Clone)]
pub struct FsEvidenceStore {
    root: PathBuf,
}

impl FsEvidenceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `evidence` is stored. Never outside `root`.
    pub fn path_for(&self, evidence: &Evidence) -> PathBuf {
        self.root
            .join(path_component(evidence.domain.as_str()))
            .join(format!(
                "{}_attempt{}.html",
                path_component(&evidence.isp_label),
                evidence.attempt
            ))
    }
}

impl EvidenceStore for FsEvidenceStore {
    async fn save(&self, evidence: &Evidence) -> Result<PathBuf, AppError> {
        let path = self.path_for(evidence);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::EvidenceError(format!("Cannot create {}: {e}", dir.display()))
            })?;
        }

        tokio::fs::write(&path, evidence.body.as_bytes())
            .await
            .map_err(|e| AppError::EvidenceError(format!("Cannot write {}: {e}", path.display())))?;

        tracing::debug!(
            path = %path.display(),
            bytes = evidence.body.len(),
            "Evidence written"
        );
        Ok(path)
    }
}

/// Make a value safe to use as a single path component.
fn path_component(value: &str) -> String {
    match value {
        "" | "." | ".." => "_".to_string(),
        _ => value.replace(['/', '\\'], "_"),
    }
}
