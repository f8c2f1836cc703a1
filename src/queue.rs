//! Task queue gate
//!
//! Before every mutating call the pipeline waits here until the server has
//! no running and no paused tasks. Paused tasks found while waiting are
//! resumed in bulk. Repeated failures to read the queue end the run.

use cv_api::TaskState;
use tracing::{debug, warn};

use crate::client::KatelloClient;
use crate::console::Console;
use crate::error::{escalate_misuse, PipelineError, PipelineResult};
use crate::timing::{PollingConfig, Sleeper};

/// Waits for a quiescent task queue
pub struct QueueGate<'a> {
    client: &'a KatelloClient,
    console: &'a dyn Console,
    sleeper: &'a dyn Sleeper,
    polling: PollingConfig,
}

impl<'a> QueueGate<'a> {
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

    /// Block until one poll sees zero running and zero paused tasks.
    ///
    /// The failure counter covers this call only and is never reset by a
    /// successful poll.
    pub fn wait_until_quiescent(&self) -> PipelineResult<()> {
        let mut failures: u32 = 0;
        self.sleeper.sleep(self.polling.settle);

        loop {
            let running = self.count(TaskState::Running)?;
            let paused = self.count(TaskState::Paused)?;

            let delay = match (running, paused) {
                (Some(0), Some(0)) => {
                    self.console.clear_transient();
                    return Ok(());
                }
                (Some(running), Some(paused)) => {
                    debug!(running, paused, "task queue busy");
                    self.console.transient(&format!(
                        "Waiting for {} running and {} paused tasks to finish...",
                        running, paused
                    ));
                    if paused > 0 {
                        self.console.persistent(&format!("Unpausing {} tasks.", paused));
                        if let Err(e) = self.client.resume_tasks(&[]) {
                            let e = escalate_misuse(e)?;
                            warn!(error = %e, "bulk resume failed");
                        }
                    }
                    self.polling.busy_interval
                }
                _ => {
                    failures += 1;
                    if failures > self.polling.max_communication_errors {
                        self.console
                            .persistent("CRITICAL: Could not get response from server exiting.");
                        return Err(PipelineError::QueueUnreachable { failures });
                    }
                    self.polling.error_interval
                }
            };

            self.sleeper.sleep(delay);
        }
    }

    /// Tasks in `state`, or None when the server did not answer usefully
    fn count(&self, state: TaskState) -> PipelineResult<Option<u64>> {
        match self.client.count_tasks(state) {
            Ok(count) => Ok(Some(count)),
            Err(e) => {
                let e = escalate_misuse(e)?;
                warn!(%state, error = %e, "task count unavailable");
                Ok(None)
            }
        }
    }
}
