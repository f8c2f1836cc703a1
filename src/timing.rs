//! Poll timing for the task waiter and the queue gate
//!
//! All waiting is host-driven and blocking: the process has no other work
//! to yield to. Delays go through a `Sleeper` so tests can substitute a
//! recording fake and run without real sleeps.

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

/// Longest delay accepted for any poll interval
pub const MAX_INTERVAL_SECONDS: u64 = 3600;

/// Poll delays and retry budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// Pause once at the start of every queue gate (default: 5 s)
    pub settle: Duration,

    /// Delay between queue polls while tasks are active (default: 10 s)
    pub busy_interval: Duration,

    /// Delay after a failed poll (default: 5 s)
    pub error_interval: Duration,

    /// Delay between task detail polls (default: 3 s)
    pub task_interval: Duration,

    /// Failed polls tolerated; one more is fatal (default: 4)
    pub max_communication_errors: u32,

    /// Resumes of one paused task; the next pause is fatal (default: 3)
    pub max_unpause: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(5),
            busy_interval: Duration::from_secs(10),
            error_interval: Duration::from_secs(5),
            task_interval: Duration::from_secs(3),
            max_communication_errors: 4,
            max_unpause: 3,
        }
    }
}

impl PollingConfig {
    /// Default budgets with every delay set to zero
    pub fn immediate() -> Self {
        Self {
            settle: Duration::ZERO,
            busy_interval: Duration::ZERO,
            error_interval: Duration::ZERO,
            task_interval: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Validate delay bounds
    pub fn validate(&self) -> Result<(), PollingValidationError> {
        let intervals = [
            ("settle_seconds", self.settle),
            ("busy_seconds", self.busy_interval),
            ("error_seconds", self.error_interval),
            ("task_seconds", self.task_interval),
        ];
        for (name, value) in intervals {
            if value.as_secs() > MAX_INTERVAL_SECONDS {
                return Err(PollingValidationError::IntervalOutOfBounds {
                    name,
                    value: value.as_secs(),
                });
            }
        }
        if self.busy_interval.is_zero() && self.error_interval.is_zero() && self.task_interval.is_zero() {
            return Err(PollingValidationError::NoDelay);
        }
        Ok(())
    }
}

/// Polling validation errors
#[derive(Debug, thiserror::Error)]
pub enum PollingValidationError {
    #[error("polling.{name} must be in [0, 3600], got {value}")]
    IntervalOutOfBounds { name: &'static str, value: u64 },

    #[error("polling intervals cannot all be zero")]
    NoDelay,
}

/// Blocking delay between polls
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Records requested delays without sleeping
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested, in order
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Sum of all delays, i.e. the simulated elapsed time
    pub fn total(&self) -> Duration {
        self.slept().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap_or_else(|p| p.into_inner()).push(duration);
    }
}
