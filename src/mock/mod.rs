//! Mock Katello Server
//!
//! An in-process stand-in for the Katello and Foreman Tasks APIs, used by
//! unit and integration tests. It implements `Transport`, so a
//! `KatelloClient` can be pointed at it directly.
//!
//! # Behaviour
//!
//! - Content views, versions and environments are held in memory
//! - Publishing creates a version that takes over the Library environment
//! - Promoting moves an environment onto the promoted version
//! - Task details follow a per-task script of states, one step per poll
//! - Task searches answer from queued running/paused counts (default 0)
//! - Failures can be injected per endpoint
//! - Every request is recorded for later assertions

mod failure;
mod route;
mod server;
mod state;

pub use failure::{FailureConfig, FailureInjector, FailureKind};
pub use route::Endpoint;
pub use server::{MockCall, MockServer, MOCK_BASE_URL};
pub use state::{environment, version, MockState, MockTask, TaskStep};
