//! Typed Katello API client
//!
//! One value is built at startup and borrowed by every component. All
//! calls are blocking and return decoded records.

use std::sync::Arc;

use cv_api::{paths, Collection, ContentView, ContentViewVersion, Method, Task, TaskCount, TaskRef, TaskState};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::transport::{Transport, TransportError};

/// API client errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Unexpected response from {path}: {message}")]
    Decode { path: String, message: String },
}

impl ApiError {
    /// True when the request itself was malformed
    pub fn is_misuse(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_misuse())
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Katello API client
pub struct KatelloClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl KatelloClient {
    /// Create a client over the given transport
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Server base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Web UI link operators can follow to inspect a task
    pub fn review_url(&self, task_id: &str) -> String {
        format!("{}{}", self.base_url, paths::task_review(task_id))
    }

    fn call<T: DeserializeOwned>(&self, method: Method, path: &str, params: Value) -> ApiResult<T> {
        let value = self.transport.fetch(method, path, &params)?;
        serde_json::from_value(value).map_err(|e| {
            debug!(%method, path, error = %e, "response did not decode");
            ApiError::Decode {
                path: path.to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Content views ordered by name; composite or non-composite only
    pub fn content_views(&self, composite: bool) -> ApiResult<Vec<ContentView>> {
        let filter = if composite { "composite" } else { "noncomposite" };
        let mut params = json!({ "order": "name ASC" });
        params[filter] = json!("true");
        let collection: Collection<ContentView> = self.call(Method::Read, paths::CONTENT_VIEWS, params)?;
        Ok(collection.results)
    }

    /// Ask the server to publish a new version of a content view
    pub fn publish(&self, content_view_id: u64) -> ApiResult<TaskRef> {
        self.call(Method::Create, &paths::publish(content_view_id), Value::Null)
    }

    /// Promote a version into one environment
    pub fn promote(&self, version_id: u64, environment_id: u64) -> ApiResult<TaskRef> {
        let params = json!({ "environment_ids": [environment_id] });
        self.call(Method::Create, &paths::promote(version_id), params)
    }

    /// Versions of a content view in server order (newest first)
    pub fn versions(&self, content_view_id: u64) -> ApiResult<Vec<ContentViewVersion>> {
        let collection: Collection<ContentViewVersion> =
            self.call(Method::Read, &paths::versions(content_view_id), Value::Null)?;
        Ok(collection.results)
    }

    /// Delete one content view version
    pub fn delete_version(&self, version_id: u64) -> ApiResult<TaskRef> {
        self.call(Method::Delete, &paths::version(version_id), Value::Null)
    }

    /// Current detail of one task
    pub fn task(&self, task_id: &str) -> ApiResult<Task> {
        self.call(Method::Read, &paths::task_details(task_id), Value::Null)
    }

    /// Number of tasks currently in `state`
    pub fn count_tasks(&self, state: TaskState) -> ApiResult<u64> {
        let params = json!({ "search": paths::state_search(state.as_str()) });
        let count: TaskCount = self.call(Method::Read, paths::TASKS, params)?;
        Ok(count.subtotal)
    }

    /// Resume paused tasks: the listed ones, or every paused task when
    /// `task_ids` is empty
    pub fn resume_tasks(&self, task_ids: &[String]) -> ApiResult<()> {
        let params = if task_ids.is_empty() {
            Value::Null
        } else {
            json!({ "task_ids": task_ids })
        };
        let _: Value = self.call(Method::Create, paths::TASKS_BULK_RESUME, params)?;
        Ok(())
    }
}
