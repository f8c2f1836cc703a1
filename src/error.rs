//! Fatal error taxonomy and stable exit codes

use crate::client::ApiError;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Pipeline ran to completion (per-view failures may have been recorded)
    Success = 0,
    /// Task queue or task details unreachable after repeated failures
    ServerUnreachable = 1,
    /// A request was malformed before it reached the server
    FetchMisuse = 2,
    /// A task stayed paused beyond the resume budget
    TaskStuck = 3,
    /// Configuration could not be loaded or is invalid
    Config = 4,
    /// Invalid command-line usage
    Usage = 10,
}

impl ExitCode {
    /// Numeric code passed to `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Conditions that end the whole run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("task queue unreachable after {failures} failed polls")]
    QueueUnreachable { failures: u32 },

    #[error("task {task_id} unreachable after {failures} failed polls")]
    TaskUnreachable { task_id: String, failures: u32 },

    #[error("could not list content views: {0}")]
    Discovery(ApiError),

    #[error("malformed request: {0}")]
    FetchMisuse(ApiError),

    #[error("task {action} '{name}' still paused after {attempts} resume attempts (task {task_id})")]
    TaskStuck {
        task_id: String,
        action: String,
        name: String,
        attempts: u32,
    },
}

impl PipelineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            PipelineError::QueueUnreachable { .. } => ExitCode::ServerUnreachable,
            PipelineError::TaskUnreachable { .. } => ExitCode::ServerUnreachable,
            PipelineError::Discovery(_) => ExitCode::ServerUnreachable,
            PipelineError::FetchMisuse(_) => ExitCode::FetchMisuse,
            PipelineError::TaskStuck { .. } => ExitCode::TaskStuck,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Escalate malformed requests; hand every other API error back.
pub(crate) fn escalate_misuse(error: ApiError) -> PipelineResult<ApiError> {
    if error.is_misuse() {
        Err(PipelineError::FetchMisuse(error))
    } else {
        Ok(error)
    }
}
