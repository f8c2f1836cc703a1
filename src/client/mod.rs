//! Remote Service Client
//!
//! Talks to the Katello server: a `Transport` moves requests, and
//! `KatelloClient` turns them into typed calls.

pub mod api;
pub mod transport;

pub use api::{ApiError, ApiResult, KatelloClient};
pub use transport::{HttpConfig, HttpTransport, Transport, TransportError};
