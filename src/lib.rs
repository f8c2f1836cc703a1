//! Content view lifecycle for Katello/Foreman
//!
//! Publishes content views, promotes each new composite version through
//! its lifecycle environments, and deletes versions that fell out of the
//! retention window. Every mutation waits for the server's task queue to
//! drain first.

pub mod cli;
pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod mock;
pub mod pipeline;
pub mod progress;
pub mod queue;
pub mod retention;
pub mod summary;
pub mod task;
pub mod timing;

pub use client::{ApiError, HttpConfig, HttpTransport, KatelloClient, Transport, TransportError};
pub use config::{ConfigError, EffectiveConfig, Settings};
pub use console::{Console, MemoryConsole, TerminalConsole};
pub use error::{ExitCode, PipelineError, PipelineResult};
pub use pipeline::{LifecyclePipeline, Mode, PipelineConfig};
pub use retention::{RetentionDecision, RetentionPlan, RetentionPolicy};
pub use summary::{PipelineReport, Stage};
pub use timing::{PollingConfig, RecordingSleeper, Sleeper, ThreadSleeper};
