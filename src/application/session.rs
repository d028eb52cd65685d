//! Session Registry - the session-facing view over concurrent analysis jobs.
//!
//! A UI session may hold many jobs at once (bulk portfolio analysis); each
//! is independently addressable by its `JobId`. The registry owns every
//! job exclusively and is the single gate through which task results flow,
//! which is where cooperative cancellation is enforced: results arriving
//! after a job was cancelled are discarded at the recording boundary.
//!
//! Delivery is job-level atomic: per-task detail is only exposed once the
//! job reaches a terminal state.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::analysis::{
    AnalysisJob, GenerationResult, GenerationTrace, JobError, JobState, TaskFailure,
};
use crate::domain::foundation::{ArtworkId, DomainError, ErrorCode, JobId, UserId};
use crate::domain::prompt::TaskType;

struct JobEntry {
    job: AnalysisJob,
    trace: Option<GenerationTrace>,
}

/// Registry of analysis jobs for the lifetime of the process.
#[derive(Default)]
pub struct SessionRegistry {
    jobs: RwLock<HashMap<JobId, JobEntry>>,
}

/// Caller-facing view of one job.
///
/// `results` and `failures` stay empty until the job settles.
#[derive(Debug, Clone)]
pub struct JobStatus {
    pub job_id: JobId,
    pub artifact: ArtworkId,
    pub owner: UserId,
    pub state: JobState,
    pub tasks: Vec<TaskType>,
    pub results: Vec<GenerationResult>,
    pub failures: Vec<TaskFailure>,
    pub aggregate_confidence: Option<f32>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a job and makes it addressable.
    pub fn insert(&self, job: AnalysisJob) -> JobId {
        let job_id = job.id();
        self.jobs
            .write()
            .unwrap()
            .insert(job_id, JobEntry { job, trace: None });
        job_id
    }

    /// Transitions a dispatched job to running.
    pub fn start(&self, job_id: JobId) -> Result<(), DomainError> {
        self.with_job(job_id, |job| job.start().map_err(job_error))
    }

    /// Records a task success.
    ///
    /// Returns `false` when the job already reached a terminal state (a
    /// cancelled job's late result); the result is discarded, not an error.
    pub fn record_success(
        &self,
        job_id: JobId,
        result: GenerationResult,
    ) -> Result<bool, DomainError> {
        self.record(job_id, |job| job.record_success(result))
    }

    /// Records a task failure, with the same late-arrival semantics.
    pub fn record_failure(
        &self,
        job_id: JobId,
        failure: TaskFailure,
    ) -> Result<bool, DomainError> {
        self.record(job_id, |job| job.record_failure(failure))
    }

    /// Attaches the generation trace recorded by the pipeline.
    pub fn set_trace(&self, job_id: JobId, trace: GenerationTrace) {
        if let Some(entry) = self.jobs.write().unwrap().get_mut(&job_id) {
            entry.trace = Some(trace);
        }
    }

    /// Classifies the job once every task has settled.
    ///
    /// A job cancelled mid-flight stays `Cancelled`; the settle barrier
    /// simply observes that.
    pub fn finalize(&self, job_id: JobId) -> Result<JobState, DomainError> {
        let mut jobs = self.jobs.write().unwrap();
        let entry = jobs
            .get_mut(&job_id)
            .ok_or_else(|| unknown_job(job_id))?;

        if entry.job.state().is_terminal() {
            return Ok(entry.job.state());
        }
        let state = entry.job.finalize().map_err(job_error)?;
        tracing::info!(job = %job_id, state = ?state, "analysis job settled");
        Ok(state)
    }

    /// Cancels a dispatched or running job.
    pub fn cancel(&self, job_id: JobId) -> Result<(), DomainError> {
        self.with_job(job_id, |job| {
            job.cancel().map_err(|e| match e {
                JobError::InvalidTransition { from, .. } => DomainError::invalid_input(
                    "job_id",
                    format!("job in state {:?} cannot be cancelled", from),
                ),
                other => job_error(other),
            })
        })?;
        tracing::info!(job = %job_id, "analysis job cancelled");
        Ok(())
    }

    /// Returns the caller-facing status of a job.
    pub fn status(&self, job_id: JobId) -> Option<JobStatus> {
        let jobs = self.jobs.read().unwrap();
        let entry = jobs.get(&job_id)?;
        let job = &entry.job;
        let terminal = job.state().is_terminal();

        Some(JobStatus {
            job_id,
            artifact: job.artifact(),
            owner: job.owner().clone(),
            state: job.state(),
            tasks: job.tasks().to_vec(),
            results: if terminal {
                job.results().values().cloned().collect()
            } else {
                Vec::new()
            },
            failures: if terminal {
                job.failures().values().cloned().collect()
            } else {
                Vec::new()
            },
            aggregate_confidence: job.aggregate_confidence(),
        })
    }

    /// Returns a full clone of a job, for metadata construction.
    pub fn job(&self, job_id: JobId) -> Option<AnalysisJob> {
        self.jobs.read().unwrap().get(&job_id).map(|e| e.job.clone())
    }

    /// Returns the recorded generation trace, if any.
    pub fn trace(&self, job_id: JobId) -> Option<GenerationTrace> {
        self.jobs
            .read()
            .unwrap()
            .get(&job_id)
            .and_then(|e| e.trace.clone())
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    /// True when no jobs are registered.
    pub fn is_empty(&self) -> bool {
        self.jobs.read().unwrap().is_empty()
    }

    fn record(
        &self,
        job_id: JobId,
        op: impl FnOnce(&mut AnalysisJob) -> Result<(), JobError>,
    ) -> Result<bool, DomainError> {
        let mut jobs = self.jobs.write().unwrap();
        let entry = jobs
            .get_mut(&job_id)
            .ok_or_else(|| unknown_job(job_id))?;

        // Cooperative cancellation: late arrivals for a settled job are
        // dropped here, at the task-completion boundary.
        if entry.job.state().is_terminal() {
            tracing::debug!(job = %job_id, "discarding result for settled job");
            return Ok(false);
        }
        op(&mut entry.job).map_err(job_error)?;
        Ok(true)
    }

    fn with_job(
        &self,
        job_id: JobId,
        op: impl FnOnce(&mut AnalysisJob) -> Result<(), DomainError>,
    ) -> Result<(), DomainError> {
        let mut jobs = self.jobs.write().unwrap();
        let entry = jobs
            .get_mut(&job_id)
            .ok_or_else(|| unknown_job(job_id))?;
        op(&mut entry.job)
    }
}

fn unknown_job(job_id: JobId) -> DomainError {
    DomainError::invalid_input("job_id", format!("unknown job {}", job_id))
}

fn job_error(err: JobError) -> DomainError {
    DomainError::new(ErrorCode::UnexpectedError, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::TaskOutput;
    use crate::domain::persona::Persona;
    use crate::ports::ProviderKind;

    fn new_job(tasks: Vec<TaskType>) -> AnalysisJob {
        let mut job = AnalysisJob::new(
            ArtworkId::new(),
            UserId::new("artist-1").unwrap(),
            Persona::Mentor,
            tasks,
        )
        .unwrap();
        job.dispatch().unwrap();
        job
    }

    fn success(task: TaskType) -> GenerationResult {
        GenerationResult {
            task_type: task,
            output: TaskOutput::Prose("Prose.".to_string()),
            confidence: 0.9,
            model: "mock".to_string(),
            provider_used: ProviderKind::ChatGpt,
            fallback_used: false,
        }
    }

    #[test]
    fn registry_addresses_many_concurrent_jobs() {
        let registry = SessionRegistry::new();
        let a = registry.insert(new_job(vec![TaskType::Description]));
        let b = registry.insert(new_job(vec![TaskType::Style]));

        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.status(a).unwrap().state, JobState::Dispatched);
        assert_eq!(registry.status(b).unwrap().state, JobState::Dispatched);
    }

    #[test]
    fn results_are_hidden_until_terminal() {
        let registry = SessionRegistry::new();
        let id = registry.insert(new_job(vec![TaskType::Description, TaskType::Style]));
        registry.start(id).unwrap();
        registry.record_success(id, success(TaskType::Description)).unwrap();

        let status = registry.status(id).unwrap();
        assert_eq!(status.state, JobState::Running);
        assert!(status.results.is_empty());
        assert_eq!(status.aggregate_confidence, None);

        registry.record_success(id, success(TaskType::Style)).unwrap();
        registry.finalize(id).unwrap();

        let status = registry.status(id).unwrap();
        assert_eq!(status.state, JobState::Complete);
        assert_eq!(status.results.len(), 2);
        assert!(status.aggregate_confidence.is_some());
    }

    #[test]
    fn cancelled_job_discards_late_results() {
        let registry = SessionRegistry::new();
        let id = registry.insert(new_job(vec![TaskType::Description]));
        registry.start(id).unwrap();
        registry.cancel(id).unwrap();

        // Late arrival from an in-flight provider call
        let recorded = registry.record_success(id, success(TaskType::Description)).unwrap();
        assert!(!recorded);

        let status = registry.status(id).unwrap();
        assert_eq!(status.state, JobState::Cancelled);
        assert!(status.results.is_empty());
    }

    #[test]
    fn finalize_after_cancel_keeps_cancelled() {
        let registry = SessionRegistry::new();
        let id = registry.insert(new_job(vec![TaskType::Description]));
        registry.start(id).unwrap();
        registry.cancel(id).unwrap();

        assert_eq!(registry.finalize(id).unwrap(), JobState::Cancelled);
    }

    #[test]
    fn cancelling_a_settled_job_is_invalid_input() {
        let registry = SessionRegistry::new();
        let id = registry.insert(new_job(vec![TaskType::Description]));
        registry.start(id).unwrap();
        registry.record_success(id, success(TaskType::Description)).unwrap();
        registry.finalize(id).unwrap();

        let err = registry.cancel(id).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn unknown_job_is_invalid_input() {
        let registry = SessionRegistry::new();
        let err = registry.cancel(JobId::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(registry.status(JobId::new()).is_none());
    }

    #[test]
    fn trace_round_trips() {
        let registry = SessionRegistry::new();
        let id = registry.insert(new_job(vec![TaskType::Description]));

        assert!(registry.trace(id).is_none());
        registry.set_trace(
            id,
            GenerationTrace {
                prompt: "p".to_string(),
                parameters: serde_json::json!({}),
            },
        );
        assert_eq!(registry.trace(id).unwrap().prompt, "p");
    }
}
