//! Content view version retention
//!
//! Decides which versions of one content view may be deleted:
//! - The newest `keep` versions (in server order) are always kept
//! - Every older version is deleted, unless it is still live in a
//!   lifecycle environment, in which case it is reported as blocked
//!
//! The walk is a single pass over the list exactly as the server returned
//! it (newest first). Nothing is re-sorted, and a keep slot once used is
//! never given back.

use cv_api::ContentViewVersion;
use serde::{Deserialize, Serialize};

/// Retention policy for content view versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Newest versions exempt from deletion
    pub keep: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { keep: 3 }
    }
}

impl RetentionPolicy {
    /// Create a count-based retention policy.
    pub fn keep_last_n(keep: usize) -> Self {
        Self { keep }
    }

    /// Number of versions outside the retention window.
    pub fn obsolete_count(&self, total: usize) -> usize {
        total.saturating_sub(self.keep)
    }

    /// Classify every version.
    pub fn plan(&self, versions: &[ContentViewVersion]) -> RetentionPlan {
        let mut remaining_keep = self.keep;
        let mut entries = Vec::with_capacity(versions.len());

        for version in versions {
            let decision = if remaining_keep > 0 {
                remaining_keep -= 1;
                RetentionDecision::Keep
            } else if version.is_deployed() {
                RetentionDecision::Blocked
            } else {
                RetentionDecision::Delete
            };
            entries.push(RetentionEntry {
                version: version.clone(),
                decision,
            });
        }

        RetentionPlan { entries }
    }
}

/// What happens to one version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionDecision {
    /// Inside the retention window
    Keep,
    /// Outside the window and not deployed
    Delete,
    /// Outside the window but live in an environment
    Blocked,
}

/// A version with its decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionEntry {
    pub version: ContentViewVersion,
    pub decision: RetentionDecision,
}

/// Decisions for a whole version history, in server order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    pub entries: Vec<RetentionEntry>,
}

impl RetentionPlan {
    /// Versions to delete, oldest last (server order)
    pub fn deletions(&self) -> impl Iterator<Item = &ContentViewVersion> {
        self.with_decision(RetentionDecision::Delete)
    }

    /// Versions that would be deleted but are still deployed
    pub fn blocked(&self) -> impl Iterator<Item = &ContentViewVersion> {
        self.with_decision(RetentionDecision::Blocked)
    }

    /// Entries outside the retention window, in server order
    pub fn candidates(&self) -> impl Iterator<Item = &RetentionEntry> {
        self.entries
            .iter()
            .filter(|e| e.decision != RetentionDecision::Keep)
    }

    fn with_decision(&self, decision: RetentionDecision) -> impl Iterator<Item = &ContentViewVersion> {
        self.entries
            .iter()
            .filter(move |e| e.decision == decision)
            .map(|e| &e.version)
    }
}
