//! Operator console output
//!
//! Two kinds of line reach the operator:
//! - persistent lines, timestamped, one per line
//! - transient lines (progress, queue status), redrawn in place with `\r`

use std::cell::Cell;
use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Local;

/// Width transient lines are padded to, so shorter lines erase longer ones
pub const LINE_WIDTH: usize = 100;

/// Sink for operator-facing messages
pub trait Console {
    /// Append a timestamped line
    fn persistent(&self, message: &str);

    /// Overwrite the current line
    fn transient(&self, message: &str);

    /// Blank the current transient line
    fn clear_transient(&self);
}

/// Local time, ISO-8601, seconds precision
pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Console writing to stdout
#[derive(Debug, Default)]
pub struct TerminalConsole {
    /// A transient line is on screen and not yet terminated
    dirty: Cell<bool>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Console for TerminalConsole {
    fn persistent(&self, message: &str) {
        let newline = if self.dirty.replace(false) { "\n" } else { "" };
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{}{}: {}", newline, timestamp(), message);
    }

    fn transient(&self, message: &str) {
        let line = format!("{}: {}", timestamp(), message);
        let mut out = io::stdout().lock();
        let _ = write!(out, "{:<width$}\r", line, width = LINE_WIDTH);
        let _ = out.flush();
        self.dirty.set(true);
    }

    fn clear_transient(&self) {
        if self.dirty.replace(false) {
            let mut out = io::stdout().lock();
            let _ = write!(out, "{:width$}\r", "", width = LINE_WIDTH);
            let _ = out.flush();
        }
    }
}

/// What a `MemoryConsole` saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    Persistent(String),
    Transient(String),
    Cleared,
}

/// Console that keeps every message in memory, for tests
#[derive(Debug, Default)]
pub struct MemoryConsole {
    lines: Mutex<Vec<ConsoleLine>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded, in order
    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Persistent messages only
    pub fn persistent_lines(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|line| match line {
                ConsoleLine::Persistent(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Whether any persistent message contains `needle`
    pub fn has_persistent(&self, needle: &str) -> bool {
        self.persistent_lines().iter().any(|line| line.contains(needle))
    }

    fn push(&self, line: ConsoleLine) {
        self.lines.lock().unwrap_or_else(|p| p.into_inner()).push(line);
    }
}

impl Console for MemoryConsole {
    fn persistent(&self, message: &str) {
        self.push(ConsoleLine::Persistent(message.to_string()));
    }

    fn transient(&self, message: &str) {
        self.push(ConsoleLine::Transient(message.to_string()));
    }

    fn clear_transient(&self) {
        self.push(ConsoleLine::Cleared);
    }
}
