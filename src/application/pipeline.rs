//! Analysis Pipeline - concurrent per-task generation over one artifact.
//!
//! For each requested task type the pipeline builds a prompt (catalog
//! instructions framed by the persona's tone), dispatches it through the
//! provider gateway, and records the outcome. Tasks are mutually
//! independent and run concurrently; the job's wall-clock cost is the
//! slowest single task, not the sum. One task's failure never aborts its
//! siblings. A single join barrier waits for every task to settle before
//! the job is classified.

use std::sync::Arc;

use crate::adapters::ai::ProviderGateway;
use crate::application::session::SessionRegistry;
use crate::domain::analysis::{
    normalize_output, AnalysisJob, GenerationResult, GenerationTrace, TaskFailure,
};
use crate::domain::foundation::{ArtworkId, DomainError, ErrorCode, JobId, UserId};
use crate::domain::persona::Persona;
use crate::domain::prompt::{build_prompt, ArtifactDescriptor, TaskType, TemperatureClass};
use crate::ports::{GenerationError, GenerationRequest};

/// Confidence scale applied when the fallback provider produced the output.
const FALLBACK_CONFIDENCE_SCALE: f32 = 0.9;

/// Pipeline over the provider gateway and the session registry.
#[derive(Clone)]
pub struct AnalysisPipeline {
    gateway: Arc<ProviderGateway>,
    registry: Arc<SessionRegistry>,
    max_output_tokens: u32,
}

impl AnalysisPipeline {
    /// Creates a pipeline.
    pub fn new(gateway: Arc<ProviderGateway>, registry: Arc<SessionRegistry>) -> Self {
        Self {
            gateway,
            registry,
            max_output_tokens: 1024,
        }
    }

    /// Sets the per-call output token budget.
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }

    /// Registers a job and runs it in the background.
    ///
    /// Returns the job id immediately; callers poll the session registry
    /// for the terminal state.
    pub fn start(
        &self,
        artifact: ArtworkId,
        descriptor: ArtifactDescriptor,
        owner: UserId,
        persona: Persona,
        tasks: Vec<TaskType>,
    ) -> Result<JobId, DomainError> {
        let job_id = self.register(artifact, &owner, persona, tasks.clone())?;
        let pipeline = self.clone();
        tokio::spawn(async move {
            pipeline.execute(job_id, artifact, descriptor, persona, tasks).await;
        });
        Ok(job_id)
    }

    /// Registers a job and runs it to a terminal state before returning.
    pub async fn run(
        &self,
        artifact: ArtworkId,
        descriptor: ArtifactDescriptor,
        owner: UserId,
        persona: Persona,
        tasks: Vec<TaskType>,
    ) -> Result<JobId, DomainError> {
        let job_id = self.register(artifact, &owner, persona, tasks.clone())?;
        self.execute(job_id, artifact, descriptor, persona, tasks).await;
        Ok(job_id)
    }

    fn register(
        &self,
        artifact: ArtworkId,
        owner: &UserId,
        persona: Persona,
        tasks: Vec<TaskType>,
    ) -> Result<JobId, DomainError> {
        let mut job = AnalysisJob::new(artifact, owner.clone(), persona, tasks)
            .map_err(|e| DomainError::invalid_input("task_types", e.to_string()))?;
        job.dispatch()
            .map_err(|e| DomainError::new(ErrorCode::UnexpectedError, e.to_string()))?;
        Ok(self.registry.insert(job))
    }

    async fn execute(
        &self,
        job_id: JobId,
        artifact: ArtworkId,
        descriptor: ArtifactDescriptor,
        persona: Persona,
        tasks: Vec<TaskType>,
    ) {
        // The job may have been cancelled between dispatch and here.
        if self.registry.start(job_id).is_err() {
            return;
        }

        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let spec = build_prompt(task, &descriptor);
            let prompt = format!("{}\n\n{}", persona.tone_framing(), spec.instructions);
            let request = GenerationRequest::new(task, prompt, persona, artifact)
                .with_temperature(spec.temperature.value())
                .with_max_output_tokens(self.max_output_tokens);

            if task == TaskType::Description {
                self.registry.set_trace(
                    job_id,
                    GenerationTrace {
                        prompt: request.prompt.clone(),
                        parameters: serde_json::json!({
                            "temperature": request.temperature,
                            "max_output_tokens": request.max_output_tokens,
                            "persona": persona.as_str(),
                        }),
                    },
                );
            }

            let gateway = self.gateway.clone();
            let registry = self.registry.clone();
            let temperature = spec.temperature;
            handles.push(tokio::spawn(async move {
                let settled = match gateway.generate(&request).await {
                    Ok(outcome) => match normalize_output(task, &outcome.content) {
                        Ok(output) => registry.record_success(
                            job_id,
                            GenerationResult {
                                task_type: task,
                                output,
                                confidence: task_confidence(temperature, outcome.fallback_used),
                                model: outcome.model,
                                provider_used: outcome.provider_used,
                                fallback_used: outcome.fallback_used,
                            },
                        ),
                        Err(err) => registry.record_failure(
                            job_id,
                            TaskFailure {
                                task_type: task,
                                code: ErrorCode::UnexpectedError,
                                message: err.to_string(),
                            },
                        ),
                    },
                    Err(err) => registry.record_failure(
                        job_id,
                        TaskFailure {
                            task_type: task,
                            code: failure_code(&err),
                            message: err.to_string(),
                        },
                    ),
                };
                if let Err(err) = settled {
                    tracing::error!(job = %job_id, task = task.as_str(), error = %err,
                        "failed to record task outcome");
                }
            }));
        }

        // Single barrier: every task settles before the job leaves Running
        futures::future::join_all(handles).await;

        if let Err(err) = self.registry.finalize(job_id) {
            tracing::error!(job = %job_id, error = %err, "failed to finalize job");
        }
    }
}

/// Per-task confidence by temperature class, scaled down for fallback output.
fn task_confidence(temperature: TemperatureClass, fallback_used: bool) -> f32 {
    let base = match temperature {
        TemperatureClass::Factual => 0.9,
        TemperatureClass::Balanced => 0.8,
        TemperatureClass::Creative => 0.7,
    };
    if fallback_used {
        base * FALLBACK_CONFIDENCE_SCALE
    } else {
        base
    }
}

/// Maps a gateway error onto the caller-facing task failure code.
fn failure_code(err: &GenerationError) -> ErrorCode {
    match err {
        GenerationError::InvalidRequest(_) => ErrorCode::InvalidInput,
        _ => ErrorCode::ProviderUnavailable,
    }
}
