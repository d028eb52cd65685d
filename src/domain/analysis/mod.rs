//! Analysis domain - jobs, output normalization, and the finalized
//! metadata package.

pub mod job;
pub mod metadata;
pub mod normalize;

pub use job::{AnalysisJob, GenerationResult, JobError, JobState, TaskFailure, TaskOutput};
pub use metadata::{AccessibilityMetadata, AgentMetadata, GenerationTrace, MetadataError};
pub use normalize::{normalize_output, NormalizeError};
