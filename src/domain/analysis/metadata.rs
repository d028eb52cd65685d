//! Agent metadata - the finalized result package for content creation.
//!
//! `AgentMetadata` is the only representation handed to content-creation
//! collaborators. It is produced once, from a `Complete` job, and is never
//! partially populated: a job that is partial, failed, or cancelled can
//! never yield one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::prompt::TaskType;

use super::job::{AnalysisJob, JobState, TaskOutput};

/// Character budget for derived alt text.
const ALT_TEXT_MAX_CHARS: usize = 125;

/// How the content was generated, for provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationTrace {
    /// The prompt that produced the description.
    pub prompt: String,
    /// Sampling and dispatch parameters as recorded by the pipeline.
    pub parameters: serde_json::Value,
}

/// Accessibility fields required before AI-authored content is posted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityMetadata {
    pub alt_text: String,
    pub description: String,
}

/// The finalized, fully-populated result package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub confidence: f32,
    pub model: String,
    pub generation: GenerationTrace,
    pub accessibility: AccessibilityMetadata,
}

impl AgentMetadata {
    /// Builds metadata from a completed job.
    ///
    /// Requires the job to be `Complete` and to contain a description
    /// result, from which the accessibility fields are derived.
    pub fn from_job(job: &AnalysisJob, trace: GenerationTrace) -> Result<Self, MetadataError> {
        if job.state() != JobState::Complete {
            return Err(MetadataError::JobNotComplete { state: job.state() });
        }

        let description = job
            .results()
            .get(&TaskType::Description)
            .ok_or(MetadataError::MissingDescription)?;

        let prose = match &description.output {
            TaskOutput::Prose(text) => text.clone(),
            TaskOutput::Tags(_) => return Err(MetadataError::MissingDescription),
        };

        let confidence = job
            .aggregate_confidence()
            .ok_or(MetadataError::JobNotComplete { state: job.state() })?;

        Ok(Self {
            confidence,
            model: description.model.clone(),
            generation: trace,
            accessibility: AccessibilityMetadata {
                alt_text: derive_alt_text(&prose),
                description: prose,
            },
        })
    }
}

/// Derives screen-reader alt text from the description prose.
///
/// Prefers the first sentence; clips on a word boundary when even that
/// exceeds the budget.
fn derive_alt_text(description: &str) -> String {
    let first_sentence = description
        .split_inclusive(['.', '!', '?'])
        .next()
        .unwrap_or(description)
        .trim();

    if first_sentence.chars().count() <= ALT_TEXT_MAX_CHARS {
        return first_sentence.to_string();
    }

    let mut clipped = String::new();
    for word in first_sentence.split_whitespace() {
        if clipped.chars().count() + word.chars().count() + 1 > ALT_TEXT_MAX_CHARS {
            break;
        }
        if !clipped.is_empty() {
            clipped.push(' ');
        }
        clipped.push_str(word);
    }
    clipped
}

/// Metadata construction errors.
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    #[error("metadata requires a complete job, found {state:?}")]
    JobNotComplete { state: JobState },

    #[error("metadata requires a description result")]
    MissingDescription,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::job::{GenerationResult, TaskFailure};
    use crate::domain::foundation::{ArtworkId, ErrorCode, UserId};
    use crate::domain::persona::Persona;
    use crate::ports::ProviderKind;

    fn trace() -> GenerationTrace {
        GenerationTrace {
            prompt: "Describe the artwork".to_string(),
            parameters: serde_json::json!({ "temperature": 0.7 }),
        }
    }

    fn result(task: TaskType, output: TaskOutput, confidence: f32) -> GenerationResult {
        GenerationResult {
            task_type: task,
            output,
            confidence,
            model: "gpt-4o-mini".to_string(),
            provider_used: ProviderKind::ChatGpt,
            fallback_used: false,
        }
    }

    fn complete_job(description: &str) -> AnalysisJob {
        let mut job = AnalysisJob::new(
            ArtworkId::new(),
            UserId::new("artist-1").unwrap(),
            Persona::Mentor,
            vec![TaskType::Description, TaskType::Style],
        )
        .unwrap();
        job.dispatch().unwrap();
        job.start().unwrap();
        job.record_success(result(
            TaskType::Description,
            TaskOutput::Prose(description.to_string()),
            0.8,
        ))
        .unwrap();
        job.record_success(result(
            TaskType::Style,
            TaskOutput::Tags(vec!["Impressionism".to_string()]),
            0.6,
        ))
        .unwrap();
        job.finalize().unwrap();
        job
    }

    #[test]
    fn metadata_from_complete_job() {
        let job = complete_job("A quiet harbor at dawn. Mist softens the boats.");
        let metadata = AgentMetadata::from_job(&job, trace()).unwrap();

        assert!((metadata.confidence - 0.7).abs() < 1e-6);
        assert_eq!(metadata.model, "gpt-4o-mini");
        assert_eq!(metadata.accessibility.alt_text, "A quiet harbor at dawn.");
        assert_eq!(
            metadata.accessibility.description,
            "A quiet harbor at dawn. Mist softens the boats."
        );
    }

    #[test]
    fn metadata_refused_for_partial_job() {
        let mut job = AnalysisJob::new(
            ArtworkId::new(),
            UserId::new("artist-1").unwrap(),
            Persona::Mentor,
            vec![TaskType::Description, TaskType::Style],
        )
        .unwrap();
        job.dispatch().unwrap();
        job.start().unwrap();
        job.record_success(result(
            TaskType::Description,
            TaskOutput::Prose("Prose.".to_string()),
            0.8,
        ))
        .unwrap();
        job.record_failure(TaskFailure {
            task_type: TaskType::Style,
            code: ErrorCode::ProviderUnavailable,
            message: "exhausted".to_string(),
        })
        .unwrap();
        assert_eq!(job.finalize().unwrap(), JobState::Partial);

        assert!(matches!(
            AgentMetadata::from_job(&job, trace()),
            Err(MetadataError::JobNotComplete {
                state: JobState::Partial
            })
        ));
    }

    #[test]
    fn metadata_refused_without_description_task() {
        let mut job = AnalysisJob::new(
            ArtworkId::new(),
            UserId::new("artist-1").unwrap(),
            Persona::Mentor,
            vec![TaskType::Style],
        )
        .unwrap();
        job.dispatch().unwrap();
        job.start().unwrap();
        job.record_success(result(
            TaskType::Style,
            TaskOutput::Tags(vec!["Cubism".to_string()]),
            0.7,
        ))
        .unwrap();
        job.finalize().unwrap();

        assert!(matches!(
            AgentMetadata::from_job(&job, trace()),
            Err(MetadataError::MissingDescription)
        ));
    }

    #[test]
    fn long_first_sentence_is_clipped_on_word_boundary() {
        let long = format!("{} end.", "wordy ".repeat(40));
        let job = complete_job(&long);
        let metadata = AgentMetadata::from_job(&job, trace()).unwrap();

        assert!(metadata.accessibility.alt_text.chars().count() <= 125);
        assert!(!metadata.accessibility.alt_text.ends_with(' '));
    }

    #[test]
    fn metadata_serializes_with_nested_sections() {
        let job = complete_job("Prose.");
        let metadata = AgentMetadata::from_job(&job, trace()).unwrap();
        let json = serde_json::to_value(&metadata).unwrap();

        assert!(json["generation"]["prompt"].is_string());
        assert!(json["accessibility"]["alt_text"].is_string());
        assert!(json["confidence"].is_number());
    }
}
