//! Katello API Types
//!
//! Wire records and endpoint paths for the subset of the Katello and
//! Foreman Tasks APIs that the content view lifecycle needs.

pub mod method;
pub mod paths;
pub mod records;
pub mod response;

pub use method::Method;
pub use records::{ContentView, ContentViewRef, ContentViewVersion, Environment, Task, TaskInput, TaskState};
pub use response::{Collection, TaskCount, TaskRef};

/// Label of the baseline environment every content view belongs to.
pub const LIBRARY_LABEL: &str = "Library";

/// Label of the organization default view, which is never published or cleaned.
pub const DEFAULT_ORGANIZATION_VIEW: &str = "Default_Organization_View";

/// `per_page` value used to fetch whole collections in one read.
pub const UNLIMITED_PER_PAGE: &str = "999999999";
