//! Mock Server State Management
//!
//! Holds content views, their versions and the tasks spawned by
//! mutating calls.

use std::collections::{HashMap, HashSet, VecDeque};

use cv_api::{ContentView, ContentViewRef, ContentViewVersion, Environment, TaskInput, TaskState, LIBRARY_LABEL};

/// Id of the Library environment in the mock
pub const LIBRARY_ID: u64 = 1;

/// Build an environment record
pub fn environment(id: u64, label: &str) -> Environment {
    Environment {
        id,
        name: label.to_string(),
        label: label.to_string(),
    }
}

/// Build a version record
pub fn version(id: u64, number: u32, environments: &[Environment]) -> ContentViewVersion {
    ContentViewVersion {
        id,
        version: format!("{}.0", number),
        environments: environments.to_vec(),
    }
}

/// One observation of a task, returned by a single details poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskStep {
    pub state: TaskState,
    pub progress: f64,
}

impl TaskStep {
    pub fn running(progress: f64) -> Self {
        Self {
            state: TaskState::Running,
            progress,
        }
    }

    pub fn paused(progress: f64) -> Self {
        Self {
            state: TaskState::Paused,
            progress,
        }
    }

    pub fn planned() -> Self {
        Self {
            state: TaskState::Other,
            progress: 0.0,
        }
    }

    pub fn stopped() -> Self {
        Self {
            state: TaskState::Stopped,
            progress: 1.0,
        }
    }
}

/// A task known to the mock
#[derive(Debug, Clone)]
pub struct MockTask {
    pub id: String,
    pub input: TaskInput,
    /// Remaining observations; the last one repeats forever
    pub steps: VecDeque<TaskStep>,
    /// Number of details polls served
    pub polls: u32,
}

impl MockTask {
    /// Observation for the next poll
    pub fn advance(&mut self) -> TaskStep {
        self.polls += 1;
        if self.steps.len() > 1 {
            self.steps.pop_front().unwrap_or_else(TaskStep::stopped)
        } else {
            self.steps.front().copied().unwrap_or_else(TaskStep::stopped)
        }
    }
}

/// Mock server state
#[derive(Debug)]
pub struct MockState {
    pub views: Vec<ContentView>,
    /// Versions per content view, newest first
    pub versions: HashMap<u64, Vec<ContentViewVersion>>,
    pub tasks: HashMap<String, MockTask>,
    /// Scripts for the next publish/promote tasks, consumed in order
    pub task_scripts: VecDeque<Vec<TaskStep>>,
    pub rejected_publishes: HashSet<u64>,
    pub rejected_promotions: HashSet<u64>,
    /// Answers to `state = running` searches; None answers without a subtotal
    pub running_counts: VecDeque<Option<u64>>,
    /// Answers to `state = paused` searches
    pub paused_counts: VecDeque<Option<u64>>,
    /// task_ids of each bulk resume call (empty = resume all)
    pub bulk_resumes: Vec<Vec<String>>,
    next_task: u64,
    next_version: u64,
}

impl Default for MockState {
    fn default() -> Self {
        Self::new()
    }
}

impl MockState {
    pub fn new() -> Self {
        Self {
            views: Vec::new(),
            versions: HashMap::new(),
            tasks: HashMap::new(),
            task_scripts: VecDeque::new(),
            rejected_publishes: HashSet::new(),
            rejected_promotions: HashSet::new(),
            running_counts: VecDeque::new(),
            paused_counts: VecDeque::new(),
            bulk_resumes: Vec::new(),
            next_task: 1,
            next_version: 1000,
        }
    }

    /// Register a task with the next id
    pub fn spawn_task(&mut self, input: TaskInput, steps: Vec<TaskStep>) -> String {
        let id = format!("T{}", self.next_task);
        self.next_task += 1;
        self.tasks.insert(
            id.clone(),
            MockTask {
                id: id.clone(),
                input,
                steps: steps.into(),
                polls: 0,
            },
        );
        id
    }

    /// Script for the next publish or promote task
    pub fn next_script(&mut self) -> Vec<TaskStep> {
        self.task_scripts
            .pop_front()
            .unwrap_or_else(|| vec![TaskStep::running(0.5), TaskStep::stopped()])
    }

    pub fn view(&self, id: u64) -> Option<&ContentView> {
        self.views.iter().find(|v| v.id == id)
    }

    /// Task input referencing a view
    pub fn view_input(&self, view_id: u64, version_id: Option<u64>) -> TaskInput {
        TaskInput {
            content_view: self.view(view_id).map(|v| ContentViewRef {
                id: Some(v.id),
                name: v.name.clone(),
                label: Some(v.label.clone()),
            }),
            content_view_version_id: version_id,
        }
    }

    /// Create a new version of a view holding the Library environment
    pub fn publish(&mut self, view_id: u64) -> u64 {
        let id = self.next_version;
        self.next_version += 1;

        let versions = self.versions.entry(view_id).or_default();
        for existing in versions.iter_mut() {
            existing.environments.retain(|e| e.label != LIBRARY_LABEL);
        }
        let number = versions.len() as u32 + 1;
        versions.insert(0, version(id, number, &[environment(LIBRARY_ID, LIBRARY_LABEL)]));
        id
    }

    /// View owning a version
    pub fn owner_of(&self, version_id: u64) -> Option<u64> {
        self.versions
            .iter()
            .find(|(_, versions)| versions.iter().any(|v| v.id == version_id))
            .map(|(view_id, _)| *view_id)
    }

    /// Move an environment onto a version of the same view
    pub fn promote(&mut self, view_id: u64, version_id: u64, environment_id: u64) {
        let env = self
            .view(view_id)
            .and_then(|v| v.environments.iter().find(|e| e.id == environment_id).cloned())
            .unwrap_or_else(|| environment(environment_id, &format!("env-{}", environment_id)));

        if let Some(versions) = self.versions.get_mut(&view_id) {
            for existing in versions.iter_mut() {
                existing.environments.retain(|e| e.id != environment_id);
                if existing.id == version_id {
                    existing.environments.push(env.clone());
                }
            }
        }
    }
}
