//! Analysis Job - per-artifact aggregate of generation results.
//!
//! One job exists per artifact-and-trigger. The job owns the lifecycle
//! `Idle -> Dispatched -> Running -> Complete | Partial | Failed | Cancelled`
//! and enforces that a terminal state is entered exactly once and never
//! overwritten. Task outcomes are tracked independently; one task's failure
//! never aborts its siblings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::foundation::{ArtworkId, ErrorCode, JobId, UserId};
use crate::domain::persona::Persona;
use crate::domain::prompt::TaskType;
use crate::ports::ProviderKind;

/// Lifecycle state of an analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Dispatched,
    Running,
    Complete,
    Partial,
    Failed,
    Cancelled,
}

impl JobState {
    /// Terminal states are immutable once entered.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Complete | JobState::Partial | JobState::Failed | JobState::Cancelled
        )
    }
}

/// Normalized output of one generation task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutput {
    /// Prose kept as-is (description).
    Prose(String),
    /// Trimmed, de-duplicated tag list (style, techniques, keywords).
    Tags(Vec<String>),
}

/// Result of one succeeded generation task. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub task_type: TaskType,
    pub output: TaskOutput,
    pub confidence: f32,
    pub model: String,
    /// The provider that actually produced this output.
    pub provider_used: ProviderKind,
    pub fallback_used: bool,
}

/// Failure of one generation task after the fallback hop was exhausted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub task_type: TaskType,
    pub code: ErrorCode,
    pub message: String,
}

/// Per-artifact analysis aggregate.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    id: JobId,
    artifact: ArtworkId,
    owner: UserId,
    persona: Persona,
    tasks: Vec<TaskType>,
    state: JobState,
    results: HashMap<TaskType, GenerationResult>,
    failures: HashMap<TaskType, TaskFailure>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AnalysisJob {
    /// Creates an idle job for the given artifact and task set.
    pub fn new(
        artifact: ArtworkId,
        owner: UserId,
        persona: Persona,
        tasks: Vec<TaskType>,
    ) -> Result<Self, JobError> {
        if tasks.is_empty() {
            return Err(JobError::NoTasks);
        }
        let mut deduped: Vec<TaskType> = Vec::with_capacity(tasks.len());
        for task in tasks {
            if !deduped.contains(&task) {
                deduped.push(task);
            }
        }
        let now = Utc::now();
        Ok(Self {
            id: JobId::new(),
            artifact,
            owner,
            persona,
            tasks: deduped,
            state: JobState::Idle,
            results: HashMap::new(),
            failures: HashMap::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Marks the job as dispatched to the pipeline.
    pub fn dispatch(&mut self) -> Result<(), JobError> {
        self.transition(JobState::Idle, JobState::Dispatched)
    }

    /// Marks the job as running (tasks in flight).
    pub fn start(&mut self) -> Result<(), JobError> {
        self.transition(JobState::Dispatched, JobState::Running)
    }

    /// Records a task success. Late results for cancelled jobs are
    /// discarded by the caller before reaching here; recording against any
    /// terminal state is an error.
    pub fn record_success(&mut self, result: GenerationResult) -> Result<(), JobError> {
        self.ensure_recordable(result.task_type)?;
        self.results.insert(result.task_type, result);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Records a task failure.
    pub fn record_failure(&mut self, failure: TaskFailure) -> Result<(), JobError> {
        self.ensure_recordable(failure.task_type)?;
        self.failures.insert(failure.task_type, failure);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Classifies the job once every task has settled.
    ///
    /// All succeeded -> `Complete`; some -> `Partial`; none -> `Failed`.
    pub fn finalize(&mut self) -> Result<JobState, JobError> {
        if self.state.is_terminal() {
            return Err(JobError::AlreadyTerminal { state: self.state });
        }
        if self.settled_count() != self.tasks.len() {
            return Err(JobError::TasksPending {
                settled: self.settled_count(),
                total: self.tasks.len(),
            });
        }

        let next = if self.failures.is_empty() {
            JobState::Complete
        } else if self.results.is_empty() {
            JobState::Failed
        } else {
            JobState::Partial
        };
        self.state = next;
        self.updated_at = Utc::now();
        Ok(next)
    }

    /// Cancels a dispatched or running job. Terminal and idle jobs cannot
    /// be cancelled.
    pub fn cancel(&mut self) -> Result<(), JobError> {
        match self.state {
            JobState::Dispatched | JobState::Running => {
                self.state = JobState::Cancelled;
                self.updated_at = Utc::now();
                Ok(())
            }
            from => Err(JobError::InvalidTransition {
                from,
                to: JobState::Cancelled,
            }),
        }
    }

    /// Mean confidence over succeeded tasks.
    ///
    /// Undefined (`None`) until the job reaches a terminal state, and for
    /// jobs with no successes.
    pub fn aggregate_confidence(&self) -> Option<f32> {
        if !self.state.is_terminal() || self.results.is_empty() {
            return None;
        }
        let sum: f32 = self.results.values().map(|r| r.confidence).sum();
        Some(sum / self.results.len() as f32)
    }

    /// Task types that failed, for selective re-runs.
    pub fn failed_tasks(&self) -> Vec<TaskType> {
        self.tasks
            .iter()
            .copied()
            .filter(|t| self.failures.contains_key(t))
            .collect()
    }

    fn settled_count(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    fn ensure_recordable(&self, task: TaskType) -> Result<(), JobError> {
        if self.state.is_terminal() {
            return Err(JobError::AlreadyTerminal { state: self.state });
        }
        if self.state != JobState::Running {
            return Err(JobError::InvalidTransition {
                from: self.state,
                to: JobState::Running,
            });
        }
        if !self.tasks.contains(&task) {
            return Err(JobError::TaskNotInJob { task });
        }
        if self.results.contains_key(&task) || self.failures.contains_key(&task) {
            return Err(JobError::TaskAlreadySettled { task });
        }
        Ok(())
    }

    fn transition(&mut self, from: JobState, to: JobState) -> Result<(), JobError> {
        if self.state != from {
            return Err(JobError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn artifact(&self) -> ArtworkId {
        self.artifact
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn tasks(&self) -> &[TaskType] {
        &self.tasks
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn results(&self) -> &HashMap<TaskType, GenerationResult> {
        &self.results
    }

    pub fn failures(&self) -> &HashMap<TaskType, TaskFailure> {
        &self.failures
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Job lifecycle errors.
#[derive(Debug, Clone, Error)]
pub enum JobError {
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: JobState, to: JobState },

    #[error("job already reached terminal state {state:?}")]
    AlreadyTerminal { state: JobState },

    #[error("cannot finalize: {settled} of {total} tasks settled")]
    TasksPending { settled: usize, total: usize },

    #[error("task {task:?} is not part of this job")]
    TaskNotInJob { task: TaskType },

    #[error("task {task:?} already settled")]
    TaskAlreadySettled { task: TaskType },

    #[error("a job needs at least one task type")]
    NoTasks,
}
