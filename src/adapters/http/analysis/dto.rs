//! DTOs for analysis endpoints.

use serde::{Deserialize, Serialize};

use crate::application::JobStatus;
use crate::domain::analysis::{GenerationResult, JobState, TaskFailure, TaskOutput};
use crate::domain::prompt::TaskType;

/// POST /api/analysis request body.
#[derive(Debug, Deserialize)]
pub struct TriggerAnalysisRequest {
    /// Artifact under analysis.
    pub artifact_id: String,
    /// Owner of the artifact, as resolved by the storage backend.
    pub owner_id: String,
    pub title: String,
    pub artist_name: Option<String>,
    pub medium: Option<String>,
    pub notes: Option<String>,
    /// Defaults to every task type when omitted.
    pub task_types: Option<Vec<TaskType>>,
}

/// Response for a freshly-triggered job.
#[derive(Debug, Serialize)]
pub struct TriggerAnalysisResponse {
    pub job_id: String,
    pub state: JobState,
}

/// Per-task success detail.
#[derive(Debug, Serialize)]
pub struct TaskResultDto {
    pub task_type: TaskType,
    pub output: TaskOutputDto,
    pub confidence: f32,
    pub provider_used: String,
    pub fallback_used: bool,
}

/// Output payload, prose or tags.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutputDto {
    Prose(String),
    Tags(Vec<String>),
}

/// Per-task failure detail.
#[derive(Debug, Serialize)]
pub struct TaskFailureDto {
    pub task_type: TaskType,
    pub code: String,
    pub message: String,
}

/// GET /api/analysis/:job_id response body.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub artifact_id: String,
    pub state: JobState,
    pub tasks: Vec<TaskType>,
    pub results: Vec<TaskResultDto>,
    pub failures: Vec<TaskFailureDto>,
    pub aggregate_confidence: Option<f32>,
}

impl From<&GenerationResult> for TaskResultDto {
    fn from(result: &GenerationResult) -> Self {
        Self {
            task_type: result.task_type,
            output: match &result.output {
                TaskOutput::Prose(text) => TaskOutputDto::Prose(text.clone()),
                TaskOutput::Tags(tags) => TaskOutputDto::Tags(tags.clone()),
            },
            confidence: result.confidence,
            provider_used: result.provider_used.to_string(),
            fallback_used: result.fallback_used,
        }
    }
}

impl From<&TaskFailure> for TaskFailureDto {
    fn from(failure: &TaskFailure) -> Self {
        Self {
            task_type: failure.task_type,
            code: failure.code.to_string(),
            message: failure.message.clone(),
        }
    }
}

impl From<JobStatus> for JobStatusResponse {
    fn from(status: JobStatus) -> Self {
        Self {
            job_id: status.job_id.to_string(),
            artifact_id: status.artifact.to_string(),
            state: status.state,
            tasks: status.tasks,
            results: status.results.iter().map(TaskResultDto::from).collect(),
            failures: status.failures.iter().map(TaskFailureDto::from).collect(),
            aggregate_confidence: status.aggregate_confidence,
        }
    }
}
