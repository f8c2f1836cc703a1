//! Failure Injection for the Mock Server
//!
//! Supports configurable failure injection for testing error paths.

use std::collections::HashMap;

use serde_json::Value;

use super::route::Endpoint;

/// What an injected failure looks like to the client
#[derive(Debug, Clone, PartialEq)]
pub enum FailureKind {
    /// The transport fails (connection refused, timeout, ...)
    Unavailable,
    /// The server answers with this body instead of the real one
    Body(Value),
    /// The transport rejects the request as malformed
    InvalidRequest,
}

/// Failure configuration for an endpoint
#[derive(Debug, Clone)]
pub struct FailureConfig {
    /// Kind of failure to produce
    pub kind: FailureKind,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    /// Transport-level failure
    pub fn unavailable() -> Self {
        Self {
            kind: FailureKind::Unavailable,
            fail_count: None,
        }
    }

    /// Replace the answer with an arbitrary body
    pub fn body(value: Value) -> Self {
        Self {
            kind: FailureKind::Body(value),
            fail_count: None,
        }
    }

    /// Malformed request
    pub fn invalid_request() -> Self {
        Self {
            kind: FailureKind::InvalidRequest,
            fail_count: None,
        }
    }

    /// Set the number of times to fail before succeeding
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }
}

/// Failure injector for the mock server
#[derive(Debug, Default)]
pub struct FailureInjector {
    /// Per-endpoint failure configs
    configs: HashMap<Endpoint, FailureConfig>,
    /// Call counts per endpoint (for fail_count tracking)
    call_counts: HashMap<Endpoint, u32>,
}

impl FailureInjector {
    /// Create a new failure injector
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a failure for an endpoint
    pub fn inject(&mut self, endpoint: Endpoint, config: FailureConfig) {
        self.configs.insert(endpoint, config);
        self.call_counts.insert(endpoint, 0);
    }

    /// Clear failure injection for an endpoint
    pub fn clear(&mut self, endpoint: Endpoint) {
        self.configs.remove(&endpoint);
        self.call_counts.remove(&endpoint);
    }

    /// Check if a failure should occur for an endpoint
    pub fn check(&mut self, endpoint: Endpoint) -> Option<FailureKind> {
        let config = self.configs.get(&endpoint)?;
        let count = self.call_counts.entry(endpoint).or_insert(0);
        *count += 1;

        if let Some(limit) = config.fail_count {
            if *count > limit {
                return None;
            }
        }

        Some(config.kind.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_failure_by_default() {
        let mut injector = FailureInjector::new();
        assert!(injector.check(Endpoint::Publish).is_none());
    }

    #[test]
    fn test_fail_count() {
        let mut injector = FailureInjector::new();
        injector.inject(
            Endpoint::TaskSearch,
            FailureConfig::unavailable().with_fail_count(2),
        );

        assert_eq!(injector.check(Endpoint::TaskSearch), Some(FailureKind::Unavailable));
        assert_eq!(injector.check(Endpoint::TaskSearch), Some(FailureKind::Unavailable));
        assert!(injector.check(Endpoint::TaskSearch).is_none());
    }

    #[test]
    fn test_clear() {
        let mut injector = FailureInjector::new();
        injector.inject(Endpoint::Promote, FailureConfig::invalid_request());
        assert!(injector.check(Endpoint::Promote).is_some());

        injector.clear(Endpoint::Promote);
        assert!(injector.check(Endpoint::Promote).is_none());
    }
}
