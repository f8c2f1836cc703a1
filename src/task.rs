//! Task completion waiter
//!
//! Polls one Foreman task until it stops. A paused task is resumed a
//! bounded number of times; a task that keeps pausing is considered stuck
//! and ends the run.

use std::fmt;

use cv_api::TaskState;
use tracing::{debug, warn};

use crate::client::KatelloClient;
use crate::console::Console;
use crate::error::{escalate_misuse, PipelineError, PipelineResult};
use crate::progress;
use crate::timing::{PollingConfig, Sleeper};

/// What the awaited task does, for messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Publishing a new version
    Update,
    /// Promoting a version into an environment
    Promote,
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskAction::Update => f.write_str("update"),
            TaskAction::Promote => f.write_str("promote"),
        }
    }
}

/// A task that reached the stopped state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub task_id: String,
    /// Server-reported result (success, warning, error)
    pub result: Option<String>,
    /// Resumes issued while waiting
    pub resumes: u32,
}

/// Waits for single tasks to complete
pub struct TaskWaiter<'a> {
    client: &'a KatelloClient,
    console: &'a dyn Console,
    sleeper: &'a dyn Sleeper,
    polling: PollingConfig,
}

impl<'a> TaskWaiter<'a> {
    pub fn new(
        client: &'a KatelloClient,
        console: &'a dyn Console,
        sleeper: &'a dyn Sleeper,
        polling: PollingConfig,
    ) -> Self {
        Self {
            client,
            console,
            sleeper,
            polling,
        }
    }

    /// Block until `task_id` stops.
    ///
    /// `subject` names the content view in messages when the task input
    /// does not.
    pub fn await_task(&self, task_id: &str, action: TaskAction, subject: &str) -> PipelineResult<TaskOutcome> {
        let mut resumes: u32 = 0;
        let mut failures: u32 = 0;

        loop {
            let task = match self.client.task(task_id) {
                Ok(task) => task,
                Err(e) => {
                    let e = escalate_misuse(e)?;
                    failures += 1;
                    warn!(task_id, failures, error = %e, "task details unavailable");
                    if failures > self.polling.max_communication_errors {
                        self.console.persistent(&format!(
                            "CRITICAL: Could not get state of task {} from server, exiting.",
                            task_id
                        ));
                        return Err(PipelineError::TaskUnreachable {
                            task_id: task_id.to_string(),
                            failures,
                        });
                    }
                    self.sleeper.sleep(self.polling.error_interval);
                    continue;
                }
            };

            let name = task.input.content_view_name().unwrap_or(subject);
            self.console.transient(&progress::render(task.progress));
            debug!(task_id, state = %task.state, progress = task.progress, "task polled");

            match task.state {
                TaskState::Paused => {
                    if resumes >= self.polling.max_unpause {
                        self.console.persistent(&format!(
                            "Task {} '{}' failed {} times.",
                            action, name, resumes
                        ));
                        self.console.persistent(&format!(
                            "Please review at {}",
                            self.client.review_url(task_id)
                        ));
                        return Err(PipelineError::TaskStuck {
                            task_id: task_id.to_string(),
                            action: action.to_string(),
                            name: name.to_string(),
                            attempts: resumes,
                        });
                    }
                    if let Err(e) = self.client.resume_tasks(&[task_id.to_string()]) {
                        let e = escalate_misuse(e)?;
                        warn!(task_id, error = %e, "resume request failed");
                    }
                    resumes += 1;
                }
                TaskState::Stopped => {
                    self.console
                        .persistent(&format!("Task {} '{}' finished.", action, name));
                    return Ok(TaskOutcome {
                        task_id: task_id.to_string(),
                        result: task.result,
                        resumes,
                    });
                }
                TaskState::Running | TaskState::Other => {}
            }

            self.sleeper.sleep(self.polling.task_interval);
        }
    }
}
