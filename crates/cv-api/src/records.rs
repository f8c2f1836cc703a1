//! Records returned by the Katello and Foreman Tasks APIs.
//!
//! Only the fields the lifecycle reads are modelled; everything else in
//! the server's JSON is ignored on decode.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A lifecycle environment (deployment stage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub label: String,
}

impl Environment {
    /// Whether this is the baseline environment every view lives in.
    pub fn is_library(&self, library_label: &str) -> bool {
        self.label == library_label
    }
}

/// A content view, composite or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentView {
    pub id: u64,
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub composite: bool,
    /// Environments the view is currently promoted to (Library included).
    #[serde(default)]
    pub environments: Vec<Environment>,
}

impl ContentView {
    /// Whether this is the organization default view.
    pub fn is_default_organization_view(&self, default_label: &str) -> bool {
        self.label == default_label
    }
}

/// One published version of a content view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentViewVersion {
    pub id: u64,
    /// Display version, e.g. "12.0".
    pub version: String,
    /// Environments in which this version is live.
    #[serde(default)]
    pub environments: Vec<Environment>,
}

impl ContentViewVersion {
    /// Whether the version is assigned to any environment.
    pub fn is_deployed(&self) -> bool {
        !self.environments.is_empty()
    }
}

/// Execution state of a Foreman task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Running,
    Paused,
    Stopped,
    /// planning, planned, pending, scheduled, ...
    #[serde(other)]
    Other,
}

impl TaskState {
    /// Name used in task search expressions.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Running => "running",
            TaskState::Paused => "paused",
            TaskState::Stopped => "stopped",
            TaskState::Other => "other",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short reference to a content view embedded in task input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentViewRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Input payload of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    #[serde(default)]
    pub content_view: Option<ContentViewRef>,
    /// Version created by a publish task.
    #[serde(default)]
    pub content_view_version_id: Option<u64>,
}

impl TaskInput {
    /// Name of the content view the task works on, if known.
    pub fn content_view_name(&self) -> Option<&str> {
        self.content_view.as_ref().map(|cv| cv.name.as_str())
    }
}

/// Detailed task state as returned by the details endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub state: TaskState,
    /// Fraction in [0, 1]; some servers report a percentage instead.
    #[serde(default)]
    pub progress: f64,
    /// success, warning, error or pending.
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub input: TaskInput,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_task_state_is_other() {
        let task: Task = serde_json::from_value(json!({
            "id": "t-1",
            "state": "planning",
            "progress": 0.0
        }))
        .unwrap();
        assert_eq!(task.state, TaskState::Other);
        assert_eq!(task.input, TaskInput::default());
    }

    #[test]
    fn test_task_input_names_view() {
        let task: Task = serde_json::from_value(json!({
            "id": "t-2",
            "state": "stopped",
            "progress": 1.0,
            "result": "success",
            "input": {
                "content_view": {"id": 3, "name": "Prod-CV", "label": "Prod_CV"},
                "content_view_version_id": 77
            }
        }))
        .unwrap();
        assert_eq!(task.input.content_view_name(), Some("Prod-CV"));
        assert_eq!(task.input.content_view_version_id, Some(77));
    }

    #[test]
    fn test_version_deployment() {
        let version: ContentViewVersion = serde_json::from_value(json!({
            "id": 9,
            "version": "9.0",
            "environments": [{"id": 2, "name": "QA", "label": "QA"}]
        }))
        .unwrap();
        assert!(version.is_deployed());

        let bare: ContentViewVersion =
            serde_json::from_value(json!({"id": 8, "version": "8.0"})).unwrap();
        assert!(!bare.is_deployed());
    }

    #[test]
    fn test_default_view_and_library() {
        let view: ContentView = serde_json::from_value(json!({
            "id": 1,
            "name": "Default Organization View",
            "label": "Default_Organization_View",
            "environments": [{"id": 1, "label": "Library"}]
        }))
        .unwrap();
        assert!(view.is_default_organization_view(crate::DEFAULT_ORGANIZATION_VIEW));
        assert!(!view.is_default_organization_view("Custom_Default"));
        assert!(!view.composite);
        assert!(view.environments[0].is_library(crate::LIBRARY_LABEL));
        assert!(!view.environments[0].is_library("Base"));
    }
}
