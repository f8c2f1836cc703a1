//! End-of-run summary
//!
//! Collects what the pipeline did, including the per-view failures that
//! did not stop it.

use serde::{Deserialize, Serialize};

/// Pipeline stage a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Publish,
    Promote,
    Cleanup,
}

/// A recoverable failure on one content view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFailure {
    pub view_id: u64,
    pub view_name: String,
    pub stage: Stage,
    pub reason: String,
}

/// A version left in place because it is still deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedVersion {
    pub view_name: String,
    pub version: String,
    pub version_id: u64,
}

/// What one pipeline run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Publish tasks completed
    pub published: usize,
    /// Promotion tasks completed
    pub promoted: usize,
    /// Version deletions accepted
    pub deleted: usize,
    pub blocked: Vec<BlockedVersion>,
    pub failures: Vec<ArtifactFailure>,
}

impl PipelineReport {
    /// Whether any view failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub(crate) fn fail(&mut self, view_id: u64, view_name: &str, stage: Stage, reason: impl Into<String>) {
        self.failures.push(ArtifactFailure {
            view_id,
            view_name: view_name.to_string(),
            stage,
            reason: reason.into(),
        });
    }

    /// Human-readable closing lines
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Summary: {} published, {} promoted, {} versions deleted, {} versions kept in environments.",
            self.published,
            self.promoted,
            self.deleted,
            self.blocked.len()
        )];
        for failure in &self.failures {
            lines.push(format!(
                "Failed {:?} of '{}' (id:{}): {}",
                failure.stage, failure.view_name, failure.view_id, failure.reason
            ));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        let report = PipelineReport::default();
        assert!(!report.has_failures());
        assert_eq!(report.summary_lines().len(), 1);
    }

    #[test]
    fn test_failures_are_listed() {
        let mut report = PipelineReport {
            published: 2,
            ..Default::default()
        };
        report.fail(4, "Prod-CV", Stage::Publish, "locked");

        assert!(report.has_failures());
        let lines = report.summary_lines();
        assert!(lines[0].starts_with("Summary: 2 published"));
        assert_eq!(lines[1], "Failed Publish of 'Prod-CV' (id:4): locked");
    }

    #[test]
    fn test_stage_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Stage::Cleanup).unwrap(), "\"cleanup\"");
    }
}
