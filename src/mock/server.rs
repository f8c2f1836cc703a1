//! Mock Server Implementation
//!
//! Answers API requests from the in-memory state.

use std::sync::{Arc, Mutex, MutexGuard};

use cv_api::{ContentView, ContentViewVersion, Environment, Method, TaskState};
use serde_json::{json, Value};

use crate::client::transport::{Transport, TransportError};

use super::failure::{FailureConfig, FailureInjector, FailureKind};
use super::route::Endpoint;
use super::state::{environment, MockState, TaskStep, LIBRARY_ID};

/// Base URL clients should use with the mock
pub const MOCK_BASE_URL: &str = "https://katello.mock";

/// A recorded request
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub method: Method,
    pub path: String,
    pub params: Value,
    /// None when the path matched no endpoint
    pub endpoint: Option<Endpoint>,
}

/// Configurable mock server for testing
///
/// Clones share state, so a test can keep one handle for configuration
/// and assertions while the client owns another.
#[derive(Clone, Default)]
pub struct MockServer {
    state: Arc<Mutex<MockState>>,
    failures: Arc<Mutex<FailureInjector>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockServer {
    /// Create an empty mock server
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // === Public API for test configuration ===

    /// Add a content view; environments are given by label, Library is
    /// added automatically. Returns the view.
    pub fn add_view(&self, id: u64, name: &str, composite: bool, environments: &[(u64, &str)]) -> ContentView {
        let mut envs: Vec<Environment> = vec![environment(LIBRARY_ID, cv_api::LIBRARY_LABEL)];
        envs.extend(environments.iter().map(|(env_id, label)| environment(*env_id, label)));
        let view = ContentView {
            id,
            name: name.to_string(),
            label: name.replace(['-', ' '], "_"),
            composite,
            environments: envs,
        };
        self.add_content_view(view.clone());
        view
    }

    /// Add a fully specified content view
    pub fn add_content_view(&self, view: ContentView) {
        let mut state = self.state();
        state.versions.entry(view.id).or_default();
        state.views.push(view);
    }

    /// Replace the version history of a view (newest first)
    pub fn set_versions(&self, view_id: u64, versions: Vec<ContentViewVersion>) {
        self.state().versions.insert(view_id, versions);
    }

    /// Script the states seen by the next publish or promote task
    pub fn script_next_task(&self, steps: Vec<TaskStep>) {
        self.state().task_scripts.push_back(steps);
    }

    /// Make publishing this view fail without a task
    pub fn reject_publish(&self, view_id: u64) {
        self.state().rejected_publishes.insert(view_id);
    }

    /// Make promotions into this environment fail without a task
    pub fn reject_promotion(&self, environment_id: u64) {
        self.state().rejected_promotions.insert(environment_id);
    }

    /// Queue answers for successive `state = running` searches
    pub fn queue_running_counts(&self, counts: impl IntoIterator<Item = Option<u64>>) {
        self.state().running_counts.extend(counts);
    }

    /// Queue answers for successive `state = paused` searches
    pub fn queue_paused_counts(&self, counts: impl IntoIterator<Item = Option<u64>>) {
        self.state().paused_counts.extend(counts);
    }

    /// Inject a failure for an endpoint
    pub fn inject_failure(&self, endpoint: Endpoint, config: FailureConfig) {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .inject(endpoint, config);
    }

    // === Inspection ===

    /// Every request served, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Requests to one endpoint, in order
    pub fn calls_to(&self, endpoint: Endpoint) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.endpoint == Some(endpoint))
            .collect()
    }

    /// Current versions of a view
    pub fn versions_of(&self, view_id: u64) -> Vec<ContentViewVersion> {
        self.state().versions.get(&view_id).cloned().unwrap_or_default()
    }

    /// task_ids of each bulk resume call
    pub fn bulk_resumes(&self) -> Vec<Vec<String>> {
        self.state().bulk_resumes.clone()
    }

    /// Number of details polls served for a task
    pub fn task_polls(&self, task_id: &str) -> u32 {
        self.state().tasks.get(task_id).map_or(0, |t| t.polls)
    }

    // === Request handling ===

    fn handle(&self, endpoint: Endpoint, id: Option<&str>, params: &Value) -> Value {
        let numeric_id = id.and_then(|s| s.parse::<u64>().ok());
        let mut state = self.state();

        match endpoint {
            Endpoint::ContentViews => {
                let composite = params.get("composite").and_then(Value::as_str) == Some("true");
                let mut views: Vec<ContentView> = state
                    .views
                    .iter()
                    .filter(|v| v.composite == composite)
                    .cloned()
                    .collect();
                views.sort_by(|a, b| a.name.cmp(&b.name));
                json!({ "total": state.views.len(), "subtotal": views.len(), "results": views })
            }

            Endpoint::Publish => {
                let Some(view_id) = numeric_id.filter(|id| state.view(*id).is_some()) else {
                    return json!({ "displayMessage": "Resource content_view not found" });
                };
                if state.rejected_publishes.contains(&view_id) {
                    return json!({
                        "displayMessage": "Another publish is already in progress",
                        "errors": ["locked"]
                    });
                }
                let version_id = state.publish(view_id);
                let input = state.view_input(view_id, Some(version_id));
                let script = state.next_script();
                let task_id = state.spawn_task(input.clone(), script);
                json!({ "id": task_id, "state": "planned", "input": input })
            }

            Endpoint::Promote => {
                let Some(version_id) = numeric_id else {
                    return json!({ "displayMessage": "Resource content_view_version not found" });
                };
                let Some(view_id) = state.owner_of(version_id) else {
                    return json!({ "displayMessage": "Resource content_view_version not found" });
                };
                let environment_ids: Vec<u64> = params
                    .get("environment_ids")
                    .and_then(Value::as_array)
                    .map(|ids| ids.iter().filter_map(Value::as_u64).collect())
                    .unwrap_or_default();
                if environment_ids.is_empty()
                    || environment_ids.iter().any(|e| state.rejected_promotions.contains(e))
                {
                    return json!({ "displayMessage": "Promotion was refused", "errors": ["refused"] });
                }
                for environment_id in &environment_ids {
                    state.promote(view_id, version_id, *environment_id);
                }
                let input = state.view_input(view_id, Some(version_id));
                let script = state.next_script();
                let task_id = state.spawn_task(input.clone(), script);
                json!({ "id": task_id, "state": "planned", "input": input })
            }

            Endpoint::Versions => {
                let versions = numeric_id
                    .and_then(|view_id| state.versions.get(&view_id).cloned())
                    .unwrap_or_default();
                json!({ "total": versions.len(), "subtotal": versions.len(), "results": versions })
            }

            Endpoint::DeleteVersion => {
                let Some(version_id) = numeric_id else {
                    return json!({ "displayMessage": "Resource content_view_version not found" });
                };
                let Some(view_id) = state.owner_of(version_id) else {
                    return json!({ "displayMessage": "Resource content_view_version not found" });
                };
                let versions = state.versions.entry(view_id).or_default();
                if versions.iter().any(|v| v.id == version_id && v.is_deployed()) {
                    return json!({
                        "displayMessage": "Version is promoted to a lifecycle environment"
                    });
                }
                versions.retain(|v| v.id != version_id);
                let input = state.view_input(view_id, Some(version_id));
                let task_id = state.spawn_task(input.clone(), vec![TaskStep::stopped()]);
                json!({ "id": task_id, "state": "planned", "input": input })
            }

            Endpoint::TaskSearch => {
                let search = params.get("search").and_then(Value::as_str).unwrap_or("");
                let count = if search.ends_with(TaskState::Paused.as_str()) {
                    state.paused_counts.pop_front()
                } else {
                    state.running_counts.pop_front()
                };
                match count.unwrap_or(Some(0)) {
                    Some(subtotal) => json!({ "total": 100, "subtotal": subtotal, "results": [] }),
                    None => json!({ "error": { "message": "search backend unavailable" } }),
                }
            }

            Endpoint::TaskDetails => {
                let task = match id {
                    Some(task_id) => state.tasks.get_mut(task_id),
                    None => None,
                };
                let Some(task) = task else {
                    return json!({ "displayMessage": "Resource task not found" });
                };
                let step = task.advance();
                let result = if step.state == TaskState::Stopped { "success" } else { "pending" };
                let state_name = match step.state {
                    TaskState::Other => "planned",
                    other => other.as_str(),
                };
                json!({
                    "id": task.id,
                    "state": state_name,
                    "progress": step.progress,
                    "result": result,
                    "input": task.input,
                })
            }

            Endpoint::BulkResume => {
                let task_ids: Vec<String> = params
                    .get("task_ids")
                    .and_then(Value::as_array)
                    .map(|ids| ids.iter().filter_map(|v| v.as_str().map(String::from)).collect())
                    .unwrap_or_default();
                state.bulk_resumes.push(task_ids.clone());
                json!({ "resumed": task_ids, "failed": [] })
            }
        }
    }
}

impl Transport for MockServer {
    fn fetch(&self, method: Method, path: &str, params: &Value) -> Result<Value, TransportError> {
        let route = Endpoint::route(method, path);
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(MockCall {
                method,
                path: path.to_string(),
                params: params.clone(),
                endpoint: route.as_ref().map(|(endpoint, _)| *endpoint),
            });

        let Some((endpoint, id)) = route else {
            return Ok(json!({ "displayMessage": format!("Route {} {} not found", method, path) }));
        };

        let injected = self
            .failures
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .check(endpoint);
        match injected {
            Some(FailureKind::Unavailable) => {
                Err(TransportError::Unavailable(format!("{} {}", method, path)))
            }
            Some(FailureKind::InvalidRequest) => {
                Err(TransportError::InvalidRequest(format!("{} {}", method, path)))
            }
            Some(FailureKind::Body(body)) => Ok(body),
            None => Ok(self.handle(endpoint, id.as_deref(), params)),
        }
    }
}
