//! Response envelopes.

use serde::{Deserialize, Serialize};

use crate::records::TaskInput;

/// A paged collection read; paging counters are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection<T> {
    pub results: Vec<T>,
}

/// The count part of a filtered task search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCount {
    pub subtotal: u64,
}

/// Answer to a publish or promote call.
///
/// An accepted call returns the spawned task; a rejected one returns an
/// error body without an `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub input: TaskInput,
    #[serde(default, rename = "displayMessage")]
    pub display_message: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl TaskRef {
    /// Best available explanation for a rejected call.
    pub fn rejection_reason(&self) -> String {
        if let Some(ref message) = self.display_message {
            return message.clone();
        }
        if !self.errors.is_empty() {
            return self.errors.join("; ");
        }
        "no task id returned".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_count_requires_subtotal() {
        let count: TaskCount = serde_json::from_value(json!({"subtotal": 2, "total": 40})).unwrap();
        assert_eq!(count.subtotal, 2);
        assert!(serde_json::from_value::<TaskCount>(json!({"error": "oops"})).is_err());
    }

    #[test]
    fn test_rejected_publish() {
        let task: TaskRef = serde_json::from_value(json!({
            "displayMessage": "Content view is locked",
            "errors": ["locked"]
        }))
        .unwrap();
        assert!(task.id.is_none());
        assert_eq!(task.rejection_reason(), "Content view is locked");
        assert_eq!(TaskRef::default().rejection_reason(), "no task id returned");
    }

    #[test]
    fn test_accepted_publish() {
        let task: TaskRef = serde_json::from_value(json!({
            "id": "T1",
            "state": "planned",
            "input": {"content_view_version_id": 12}
        }))
        .unwrap();
        assert_eq!(task.id.as_deref(), Some("T1"));
        assert_eq!(task.input.content_view_version_id, Some(12));
    }
}
