//! Content view lifecycle pipeline
//!
//! One run, strictly sequential:
//! - Publish every non-composite view (full update only)
//! - Publish every composite view, promote the new version into each of
//!   the view's environments, then clean up its old versions
//! - Clean up old versions of every non-composite view
//!
//! The queue gate runs before every publish, promote and delete. A view
//! whose publish or promotion is refused is recorded and skipped; a stuck
//! task or an unreachable server ends the run.

use std::collections::HashMap;

use cv_api::{ContentView, ContentViewVersion, TaskRef};
use tracing::{debug, info, warn};

use crate::client::KatelloClient;
use crate::console::Console;
use crate::error::{escalate_misuse, PipelineError, PipelineResult};
use crate::queue::QueueGate;
use crate::retention::{RetentionDecision, RetentionPolicy};
use crate::summary::{BlockedVersion, PipelineReport, Stage};
use crate::task::{TaskAction, TaskWaiter};
use crate::timing::{PollingConfig, Sleeper};

/// Which phases to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Publish non-composite views, then everything in `CleanupOnly`
    FullUpdate,
    /// Publish, promote and clean composite views, clean non-composite views
    CleanupOnly,
}

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub polling: PollingConfig,
    pub retention: RetentionPolicy,
    /// Label of the view excluded from every phase
    pub default_view_label: String,
    /// Label of the environment never promoted into
    pub library_label: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            polling: PollingConfig::default(),
            retention: RetentionPolicy::default(),
            default_view_label: cv_api::DEFAULT_ORGANIZATION_VIEW.to_string(),
            library_label: cv_api::LIBRARY_LABEL.to_string(),
        }
    }
}

/// The lifecycle pipeline
pub struct LifecyclePipeline<'a> {
    client: &'a KatelloClient,
    console: &'a dyn Console,
    gate: QueueGate<'a>,
    waiter: TaskWaiter<'a>,
    config: PipelineConfig,
}

impl<'a> LifecyclePipeline<'a> {
    pub fn new(
        client: &'a KatelloClient,
        console: &'a dyn Console,
        sleeper: &'a dyn Sleeper,
        config: PipelineConfig,
    ) -> Self {
        Self {
            client,
            console,
            gate: QueueGate::new(client, console, sleeper, config.polling),
            waiter: TaskWaiter::new(client, console, sleeper, config.polling),
            config,
        }
    }

    /// Run every phase of `mode` to completion
    pub fn run(&self, mode: Mode) -> PipelineResult<PipelineReport> {
        let mut report = PipelineReport::default();

        // needed again for the final cleanup
        let independent = self.discover(false)?;

        if mode == Mode::FullUpdate {
            info!(views = independent.len(), "publishing non-composite views");
            self.console.persistent("Starting non-composite content views updates.");
            for view in &independent {
                self.publish(view, &mut report)?;
            }
            self.console.persistent("All noncomposite views updated.");
        }

        self.console.persistent("Starting composite content views updates.");
        let composite = self.discover(true)?;
        info!(views = composite.len(), "updating composite views");
        for view in &composite {
            self.update_composite(view, &mut report)?;
        }
        self.console
            .persistent("All composite views updated, promoted and cleaned.");

        info!("cleaning non-composite views");
        self.console.persistent("Cleaning obsolete noncomposite view versions");
        for view in &independent {
            self.gate.wait_until_quiescent()?;
            self.cleanup(view, &mut report)?;
        }
        self.console.persistent("Noncomposite views cleanup done.");

        self.gate.wait_until_quiescent()?;
        self.console.persistent("Update done.");
        Ok(report)
    }

    /// Views of one kind ordered by name, without the default view
    fn discover(&self, composite: bool) -> PipelineResult<Vec<ContentView>> {
        let views = self
            .client
            .content_views(composite)
            .map_err(|e| match escalate_misuse(e) {
                Ok(e) => PipelineError::Discovery(e),
                Err(fatal) => fatal,
            })?;
        Ok(views
            .into_iter()
            .filter(|v| !v.is_default_organization_view(&self.config.default_view_label))
            .collect())
    }

    /// Gate, publish and await. None when the server did not start a task.
    fn publish(&self, view: &ContentView, report: &mut PipelineReport) -> PipelineResult<Option<TaskRef>> {
        self.gate.wait_until_quiescent()?;
        self.console
            .persistent(&format!("Updating content view '{}' (id:{})", view.name, view.id));

        let reason = match self.client.publish(view.id) {
            Ok(task) => match task.id.as_deref() {
                Some(task_id) => {
                    self.waiter.await_task(task_id, TaskAction::Update, &view.name)?;
                    report.published += 1;
                    return Ok(Some(task));
                }
                None => task.rejection_reason(),
            },
            Err(e) => escalate_misuse(e)?.to_string(),
        };

        let kind = if view.composite {
            "the content view"
        } else {
            "non-composite content view"
        };
        self.console
            .persistent(&format!("Failed to update {} '{}' (id:{})!", kind, view.name, view.id));
        warn!(view = %view.name, %reason, "publish not accepted");
        report.fail(view.id, &view.name, Stage::Publish, reason);
        Ok(None)
    }

    /// Publish, promote into every environment, clean up
    fn update_composite(&self, view: &ContentView, report: &mut PipelineReport) -> PipelineResult<()> {
        // environment order is not significant, only that each gets the version once
        let environments: HashMap<u64, &str> = view
            .environments
            .iter()
            .filter(|e| !e.is_library(&self.config.library_label))
            .map(|e| (e.id, e.label.as_str()))
            .collect();

        let Some(task) = self.publish(view, report)? else {
            return Ok(());
        };
        let Some(version_id) = task.input.content_view_version_id else {
            self.console.persistent(&format!(
                "Publish of '{}' (id:{}) did not name the new version, skipping promotion.",
                view.name, view.id
            ));
            report.fail(view.id, &view.name, Stage::Promote, "publish task has no content_view_version_id");
            return Ok(());
        };

        for (environment_id, label) in &environments {
            self.promote(view, version_id, *environment_id, label, report)?;
        }

        self.gate.wait_until_quiescent()?;
        self.cleanup(view, report)
    }

    fn promote(
        &self,
        view: &ContentView,
        version_id: u64,
        environment_id: u64,
        label: &str,
        report: &mut PipelineReport,
    ) -> PipelineResult<()> {
        self.gate.wait_until_quiescent()?;
        debug!(view = %view.name, version_id, environment = label, "promoting");

        let reason = match self.client.promote(version_id, environment_id) {
            Ok(task) => match task.id.as_deref() {
                Some(task_id) => {
                    self.waiter.await_task(task_id, TaskAction::Promote, &view.name)?;
                    report.promoted += 1;
                    return Ok(());
                }
                None => task.rejection_reason(),
            },
            Err(e) => escalate_misuse(e)?.to_string(),
        };

        self.console.persistent(&format!(
            "Failed to promote content view '{}' (id:{}) to '{}'!",
            view.name, view.id, label
        ));
        warn!(view = %view.name, environment = label, %reason, "promotion not accepted");
        report.fail(view.id, &view.name, Stage::Promote, format!("{}: {}", label, reason));
        Ok(())
    }

    /// Delete the versions the retention policy lets go
    fn cleanup(&self, view: &ContentView, report: &mut PipelineReport) -> PipelineResult<()> {
        let versions = match self.client.versions(view.id) {
            Ok(versions) => versions,
            Err(e) => {
                let e = escalate_misuse(e)?;
                self.console.persistent(&format!(
                    "Could not list versions of content view '{}' (id:{})!",
                    view.name, view.id
                ));
                report.fail(view.id, &view.name, Stage::Cleanup, e.to_string());
                return Ok(());
            }
        };

        let policy = self.config.retention;
        let plan = policy.plan(&versions);
        self.console.persistent(&format!(
            "Deleting {} obsolete versions of content view '{}'.",
            policy.obsolete_count(versions.len()),
            view.name
        ));

        for entry in plan.candidates() {
            match entry.decision {
                RetentionDecision::Delete => {
                    self.gate.wait_until_quiescent()?;
                    self.delete(view, &entry.version, report)?;
                }
                RetentionDecision::Blocked => {
                    self.console.persistent(&format!(
                        "Cannot delete the content view version '{}' '{}' (id:{})! \
                         Because it is part of the lifecycle environment.",
                        view.name, entry.version.version, entry.version.id
                    ));
                    report.blocked.push(BlockedVersion {
                        view_name: view.name.clone(),
                        version: entry.version.version.clone(),
                        version_id: entry.version.id,
                    });
                }
                RetentionDecision::Keep => {}
            }
        }
        Ok(())
    }

    fn delete(&self, view: &ContentView, version: &ContentViewVersion, report: &mut PipelineReport) -> PipelineResult<()> {
        let reason = match self.client.delete_version(version.id) {
            Ok(task) if task.id.is_some() => {
                debug!(view = %view.name, version = %version.version, "version deletion started");
                report.deleted += 1;
                return Ok(());
            }
            Ok(task) => task.rejection_reason(),
            Err(e) => escalate_misuse(e)?.to_string(),
        };

        self.console.persistent(&format!(
            "Failed to delete the content view version '{}' '{}' (id:{})!",
            view.name, version.version, version.id
        ));
        report.fail(view.id, &view.name, Stage::Cleanup, reason);
        Ok(())
    }
}
