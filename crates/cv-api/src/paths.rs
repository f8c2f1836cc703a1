//! Endpoint paths, relative to the server base URL.

/// Collection of content views.
pub const CONTENT_VIEWS: &str = "/katello/api/content_views";

/// Collection of Foreman tasks (supports `search`).
pub const TASKS: &str = "/foreman_tasks/api/tasks/";

/// Resume paused tasks; all of them, or only those listed in `task_ids`.
pub const TASKS_BULK_RESUME: &str = "/foreman_tasks/api/tasks/bulk_resume";

/// Publish a new version of a content view.
pub fn publish(content_view_id: u64) -> String {
    format!("{}/{}/publish", CONTENT_VIEWS, content_view_id)
}

/// Versions of a content view, newest first.
pub fn versions(content_view_id: u64) -> String {
    format!("{}/{}/content_view_versions", CONTENT_VIEWS, content_view_id)
}

/// A single content view version.
pub fn version(version_id: u64) -> String {
    format!("/katello/api/content_view_versions/{}", version_id)
}

/// Promote a content view version into environments.
pub fn promote(version_id: u64) -> String {
    format!("/katello/api/content_view_versions/{}/promote", version_id)
}

/// Detailed state of one task.
pub fn task_details(task_id: &str) -> String {
    format!("/foreman_tasks/api/tasks/{}/details", task_id)
}

/// Web UI page of a task, for operators.
pub fn task_review(task_id: &str) -> String {
    format!("/foreman_tasks/tasks/{}", task_id)
}

/// Search expression selecting tasks in the given state.
pub fn state_search(state: &str) -> String {
    format!("state = {}", state)
}
