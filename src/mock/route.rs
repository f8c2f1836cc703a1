//! Request routing for the mock server.

use cv_api::Method;

/// API endpoints the mock understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ContentViews,
    Publish,
    Versions,
    DeleteVersion,
    Promote,
    TaskSearch,
    TaskDetails,
    BulkResume,
}

impl Endpoint {
    /// Resolve a request to an endpoint and its path id, if any
    pub fn route(method: Method, path: &str) -> Option<(Endpoint, Option<String>)> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let id = |i: usize| segments.get(i).map(|s| s.to_string());

        match (method, segments.as_slice()) {
            (Method::Read, ["katello", "api", "content_views"]) => Some((Endpoint::ContentViews, None)),
            (Method::Create, ["katello", "api", "content_views", _, "publish"]) => {
                Some((Endpoint::Publish, id(3)))
            }
            (Method::Read, ["katello", "api", "content_views", _, "content_view_versions"]) => {
                Some((Endpoint::Versions, id(3)))
            }
            (Method::Delete, ["katello", "api", "content_view_versions", _]) => {
                Some((Endpoint::DeleteVersion, id(3)))
            }
            (Method::Create, ["katello", "api", "content_view_versions", _, "promote"]) => {
                Some((Endpoint::Promote, id(3)))
            }
            (Method::Read, ["foreman_tasks", "api", "tasks"]) => Some((Endpoint::TaskSearch, None)),
            (Method::Create, ["foreman_tasks", "api", "tasks", "bulk_resume"]) => {
                Some((Endpoint::BulkResume, None))
            }
            (Method::Read, ["foreman_tasks", "api", "tasks", _, "details"]) => {
                Some((Endpoint::TaskDetails, id(3)))
            }
            _ => None,
        }
    }

    /// Whether calls to this endpoint change server state
    pub fn is_mutation(&self) -> bool {
        matches!(self, Endpoint::Publish | Endpoint::Promote | Endpoint::DeleteVersion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_api::paths;

    #[test]
    fn test_routes_api_paths() {
        assert_eq!(
            Endpoint::route(Method::Create, &paths::publish(4)),
            Some((Endpoint::Publish, Some("4".to_string())))
        );
        assert_eq!(
            Endpoint::route(Method::Read, paths::TASKS),
            Some((Endpoint::TaskSearch, None))
        );
        assert_eq!(
            Endpoint::route(Method::Read, &paths::task_details("T9")),
            Some((Endpoint::TaskDetails, Some("T9".to_string())))
        );
        assert_eq!(
            Endpoint::route(Method::Delete, &paths::version(11)),
            Some((Endpoint::DeleteVersion, Some("11".to_string())))
        );
    }

    #[test]
    fn test_method_matters() {
        assert_eq!(Endpoint::route(Method::Read, &paths::publish(4)), None);
        assert_eq!(Endpoint::route(Method::Delete, paths::CONTENT_VIEWS), None);
    }
}
