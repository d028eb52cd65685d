//! Prompt catalog.
//!
//! Static mapping from analysis task type to an instruction template and a
//! sampling-temperature class. Templates are pure text substitution over the
//! artifact descriptor; persona tone framing is layered on by the analysis
//! pipeline, never here. Adding a task type is a catalog entry, not a code
//! change elsewhere.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One analysis dimension with its own prompt and temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Description,
    Style,
    Techniques,
    Keywords,
}

impl TaskType {
    /// All task types, in catalog order.
    pub const ALL: [TaskType; 4] = [
        TaskType::Description,
        TaskType::Style,
        TaskType::Techniques,
        TaskType::Keywords,
    ];

    /// Wire name of the task type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Description => "description",
            TaskType::Style => "style",
            TaskType::Techniques => "techniques",
            TaskType::Keywords => "keywords",
        }
    }

    /// Whether this task's output is a comma-separated tag list.
    pub fn expects_tags(&self) -> bool {
        !matches!(self, TaskType::Description)
    }
}

/// Sampling-temperature preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureClass {
    Creative,
    Factual,
    Balanced,
}

impl TemperatureClass {
    /// The sampling temperature for this class.
    pub fn value(&self) -> f32 {
        match self {
            TemperatureClass::Creative => 0.7,
            TemperatureClass::Factual => 0.3,
            TemperatureClass::Balanced => 0.5,
        }
    }
}

/// What the caller knows about the artifact under analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub title: String,
    pub artist_name: Option<String>,
    pub medium: Option<String>,
    pub notes: Option<String>,
}

impl ArtifactDescriptor {
    /// Creates a descriptor with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Sets the artist name.
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist_name = Some(artist.into());
        self
    }

    /// Sets the medium.
    pub fn with_medium(mut self, medium: impl Into<String>) -> Self {
        self.medium = Some(medium.into());
        self
    }

    /// Sets free-form notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A prompt ready for dispatch: expanded instruction text plus temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    pub task_type: TaskType,
    pub instructions: String,
    pub temperature: TemperatureClass,
}

struct CatalogEntry {
    template: &'static str,
    temperature: TemperatureClass,
}

/// The task catalog. One entry per task type; the data-driven extension
/// point for new analysis dimensions.
static CATALOG: Lazy<HashMap<TaskType, CatalogEntry>> = Lazy::new(|| {
    HashMap::from([
        (
            TaskType::Description,
            CatalogEntry {
                template: "Write a vivid, accessible description of the artwork \
                           \"{title}\"{by_artist}{in_medium}. Two to four sentences, \
                           suitable for a gallery listing.{notes}",
                temperature: TemperatureClass::Creative,
            },
        ),
        (
            TaskType::Style,
            CatalogEntry {
                template: "Identify the artistic styles evident in the artwork \
                           \"{title}\"{by_artist}{in_medium}. Respond with a \
                           comma-separated list of style names only.{notes}",
                temperature: TemperatureClass::Balanced,
            },
        ),
        (
            TaskType::Techniques,
            CatalogEntry {
                template: "List the techniques used in the artwork \
                           \"{title}\"{by_artist}{in_medium}. Respond with a \
                           comma-separated list of technique names only.{notes}",
                temperature: TemperatureClass::Factual,
            },
        ),
        (
            TaskType::Keywords,
            CatalogEntry {
                template: "Produce search keywords for the artwork \
                           \"{title}\"{by_artist}{in_medium}. Respond with a \
                           comma-separated list of keywords only.{notes}",
                temperature: TemperatureClass::Factual,
            },
        ),
    ])
});

/// Builds the prompt for a task over an artifact.
///
/// Pure text substitution; no persona branching at this layer.
pub fn build_prompt(task: TaskType, artifact: &ArtifactDescriptor) -> PromptSpec {
    let entry = &CATALOG[&task];

    let by_artist = artifact
        .artist_name
        .as_deref()
        .map(|a| format!(" by {}", a))
        .unwrap_or_default();
    let in_medium = artifact
        .medium
        .as_deref()
        .map(|m| format!(" ({})", m))
        .unwrap_or_default();
    let notes = artifact
        .notes
        .as_deref()
        .map(|n| format!(" Additional context: {}", n))
        .unwrap_or_default();

    let instructions = entry
        .template
        .replace("{title}", &artifact.title)
        .replace("{by_artist}", &by_artist)
        .replace("{in_medium}", &in_medium)
        .replace("{notes}", &notes);

    PromptSpec {
        task_type: task,
        instructions,
        temperature: entry.temperature,
    }
}
