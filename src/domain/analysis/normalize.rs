//! Output normalization for generation results.
//!
//! Tag tasks (style, techniques, keywords) come back as comma-separated
//! free text and are trimmed and de-duplicated case-insensitively, keeping
//! the first spelling seen. Description stays prose. Output that fails the
//! task's shape expectation is a task-level error, never silently coerced
//! to an empty result.

use thiserror::Error;

use crate::domain::prompt::TaskType;

use super::job::TaskOutput;

/// Normalization failures. Surface as task-level errors in the job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("provider returned empty output")]
    EmptyOutput,

    #[error("expected a tag list but found no usable tags")]
    EmptyTagList,
}

/// Normalizes raw provider text into the shape the task expects.
pub fn normalize_output(task: TaskType, raw: &str) -> Result<TaskOutput, NormalizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::EmptyOutput);
    }

    if !task.expects_tags() {
        return Ok(TaskOutput::Prose(trimmed.to_string()));
    }

    let mut seen: Vec<String> = Vec::new();
    let mut tags: Vec<String> = Vec::new();
    for part in trimmed.split(',') {
        let tag = part.trim();
        if tag.is_empty() {
            continue;
        }
        let key = tag.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        tags.push(tag.to_string());
    }

    if tags.is_empty() {
        return Err(NormalizeError::EmptyTagList);
    }
    Ok(TaskOutput::Tags(tags))
}
