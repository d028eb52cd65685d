//! AI Orchestrator - the single entry point for orchestration callers.
//!
//! Wires the authorization guard, persona resolution, the analysis
//! pipeline, the session registry, the cached provider settings, and the
//! content-creation boundary into one facade. HTTP handlers and webhooks
//! call this; nothing below it knows about principals.

use std::sync::Arc;

use crate::adapters::settings::CachedSettings;
use crate::application::guard::{Action, AuthorizationGuard};
use crate::application::pipeline::AnalysisPipeline;
use crate::application::session::{JobStatus, SessionRegistry};
use crate::domain::analysis::{AgentMetadata, MetadataError, TaskOutput};
use crate::domain::foundation::{
    ArtworkId, AuthPrincipal, DomainError, ErrorCode, JobId, UserId, ViewerRole,
};
use crate::domain::persona::Persona;
use crate::domain::prompt::{ArtifactDescriptor, TaskType};
use crate::ports::{
    ContentGateway, PostArtworkParams, ProviderKind, ProviderSettings, SettingsError,
};

/// Request to post an AI-authored artwork record (agent path).
#[derive(Debug, Clone)]
pub struct PostArtworkRequest {
    pub job_id: JobId,
    pub title: String,
    pub images: Vec<String>,
    pub ai_context: String,
}

/// The unified orchestration facade.
pub struct AiOrchestrator {
    guard: AuthorizationGuard,
    pipeline: AnalysisPipeline,
    registry: Arc<SessionRegistry>,
    settings: Arc<CachedSettings>,
    content: Arc<dyn ContentGateway>,
    system_profile_id: String,
}

impl AiOrchestrator {
    /// Creates the orchestrator.
    pub fn new(
        pipeline: AnalysisPipeline,
        registry: Arc<SessionRegistry>,
        settings: Arc<CachedSettings>,
        content: Arc<dyn ContentGateway>,
        system_profile_id: impl Into<String>,
    ) -> Self {
        Self {
            guard: AuthorizationGuard::new(),
            pipeline,
            registry,
            settings,
            content,
            system_profile_id: system_profile_id.into(),
        }
    }

    /// Triggers analysis of an artifact, returning the job id immediately.
    ///
    /// `owner` is the artifact's owner as resolved by the backing store;
    /// end users may only analyze their own artifacts.
    pub fn start_analysis(
        &self,
        principal: &AuthPrincipal,
        owner: &UserId,
        artifact: ArtworkId,
        descriptor: ArtifactDescriptor,
        tasks: Vec<TaskType>,
    ) -> Result<JobId, DomainError> {
        self.guard
            .authorize(principal, &Action::TriggerAnalysis { owner: owner.clone() })?;
        let persona = persona_for(principal);
        self.pipeline
            .start(artifact, descriptor, owner.clone(), persona, tasks)
    }

    /// Triggers analysis and waits for the terminal state. Used by
    /// machine-driven flows that need the settled job in one call.
    pub async fn run_analysis(
        &self,
        principal: &AuthPrincipal,
        owner: &UserId,
        artifact: ArtworkId,
        descriptor: ArtifactDescriptor,
        tasks: Vec<TaskType>,
    ) -> Result<JobId, DomainError> {
        self.guard
            .authorize(principal, &Action::TriggerAnalysis { owner: owner.clone() })?;
        let persona = persona_for(principal);
        self.pipeline
            .run(artifact, descriptor, owner.clone(), persona, tasks)
            .await
    }

    /// Returns a job's status; per-task detail appears once terminal.
    pub fn job_status(
        &self,
        principal: &AuthPrincipal,
        job_id: JobId,
    ) -> Result<JobStatus, DomainError> {
        let status = self
            .registry
            .status(job_id)
            .ok_or_else(|| DomainError::invalid_input("job_id", format!("unknown job {}", job_id)))?;
        self.guard
            .authorize(principal, &Action::ManageJob { owner: status.owner.clone() })?;
        Ok(status)
    }

    /// Cooperatively cancels a dispatched or running job.
    pub fn cancel_job(
        &self,
        principal: &AuthPrincipal,
        job_id: JobId,
    ) -> Result<(), DomainError> {
        let status = self
            .registry
            .status(job_id)
            .ok_or_else(|| DomainError::invalid_input("job_id", format!("unknown job {}", job_id)))?;
        self.guard
            .authorize(principal, &Action::ManageJob { owner: status.owner.clone() })?;
        self.registry.cancel(job_id)
    }

    /// Reads the active provider settings (admin only).
    pub async fn provider_settings(
        &self,
        principal: &AuthPrincipal,
    ) -> Result<ProviderSettings, DomainError> {
        self.guard
            .authorize(principal, &Action::ReadProviderSettings)?;
        self.settings.get().await.map_err(settings_error)
    }

    /// Replaces the active provider settings (admin only). The settings
    /// cache is refreshed as part of the write, so in-flight readers see
    /// at most one bounded-staleness window.
    pub async fn update_provider_settings(
        &self,
        principal: &AuthPrincipal,
        primary: ProviderKind,
        fallback: Option<ProviderKind>,
    ) -> Result<(), DomainError> {
        self.guard
            .authorize(principal, &Action::WriteProviderSettings)?;
        let settings = ProviderSettings::new(primary, fallback).map_err(settings_error)?;
        self.settings.update(settings).await.map_err(settings_error)
    }

    /// Posts an AI-authored artwork under the reserved system profile
    /// (agent only). Only a fully-populated metadata package crosses the
    /// content boundary; anything short of a `Complete` job is refused.
    pub async fn post_artwork(
        &self,
        principal: &AuthPrincipal,
        request: PostArtworkRequest,
    ) -> Result<ArtworkId, DomainError> {
        self.guard.authorize(principal, &Action::PostAgentContent)?;

        let job = self.registry.job(request.job_id).ok_or_else(|| {
            DomainError::invalid_input("job_id", format!("unknown job {}", request.job_id))
        })?;
        let trace = self.registry.trace(request.job_id).ok_or_else(|| {
            DomainError::new(ErrorCode::UnexpectedError, "job has no generation trace")
        })?;

        let metadata = AgentMetadata::from_job(&job, trace).map_err(|e| match e {
            MetadataError::JobNotComplete { state } => DomainError::invalid_input(
                "job_id",
                format!("job must be complete to post, found {:?}", state),
            ),
            MetadataError::MissingDescription => DomainError::new(
                ErrorCode::AccessibilityError,
                "cannot derive accessibility metadata without a description result",
            ),
        })?;

        let description = match job.results().get(&TaskType::Description).map(|r| &r.output) {
            Some(TaskOutput::Prose(text)) => Some(text.clone()),
            _ => None,
        };
        let tags = collect_tags(&job);

        let params = PostArtworkParams {
            title: request.title,
            images: request.images,
            description,
            tags: if tags.is_empty() { None } else { Some(tags) },
            ai_generated: true,
            ai_context: request.ai_context,
            analysis_results: serde_json::to_value(job.results()).ok(),
            metadata,
        };

        let artwork_id = self
            .content
            .post_artwork(&self.system_profile_id, params)
            .await?;
        tracing::info!(job = %request.job_id, artwork = %artwork_id,
            "posted AI-authored artwork");
        Ok(artwork_id)
    }

    /// Jobs in a terminal state keep their status queryable; convenience
    /// accessor for the session registry.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }
}

/// Persona for the calling principal. The guard has already rejected
/// principals that may not trigger analysis.
fn persona_for(principal: &AuthPrincipal) -> Persona {
    match principal {
        AuthPrincipal::EndUser { role, .. } => Persona::resolve(*role),
        AuthPrincipal::Admin { .. } => Persona::resolve(ViewerRole::Admin),
        AuthPrincipal::Agent { .. } => Persona::resolve(ViewerRole::Guest),
    }
}

/// Union of all tag outputs across tasks, de-duplicated case-insensitively.
fn collect_tags(job: &crate::domain::analysis::AnalysisJob) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut tags: Vec<String> = Vec::new();
    for task in job.tasks() {
        if let Some(result) = job.results().get(task) {
            if let TaskOutput::Tags(list) = &result.output {
                for tag in list {
                    let key = tag.to_lowercase();
                    if !seen.contains(&key) {
                        seen.push(key);
                        tags.push(tag.clone());
                    }
                }
            }
        }
    }
    tags
}

fn settings_error(err: SettingsError) -> DomainError {
    match err {
        SettingsError::FallbackEqualsPrimary { .. } => {
            DomainError::invalid_input("fallback_provider", err.to_string())
        }
        SettingsError::Storage(_) => DomainError::new(ErrorCode::DatabaseError, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockProvider, ProviderGateway};
    use crate::adapters::content::InMemoryContentGateway;
    use crate::adapters::settings::InMemorySettingsStore;
    use crate::domain::analysis::JobState;
    use crate::domain::foundation::SessionId;
    use crate::ports::GenerationProvider;
    use std::time::Duration;

    fn end_user(id: &str, role: ViewerRole) -> AuthPrincipal {
        AuthPrincipal::EndUser {
            user_id: UserId::new(id).unwrap(),
            session_id: SessionId::new(),
            role,
        }
    }

    fn admin() -> AuthPrincipal {
        AuthPrincipal::Admin {
            user_id: UserId::new("admin-1").unwrap(),
            session_id: SessionId::new(),
        }
    }

    fn happy_provider() -> MockProvider {
        MockProvider::new(ProviderKind::ChatGpt)
            .with_task_response(TaskType::Description, "A luminous harbor at dawn.")
            .with_task_response(TaskType::Style, "Impressionism, Tonalism")
            .with_task_response(TaskType::Techniques, "Oil Paint, Glazing")
            .with_task_response(TaskType::Keywords, "harbor, dawn, boats")
    }

    struct Fixture {
        orchestrator: AiOrchestrator,
        content: Arc<InMemoryContentGateway>,
    }

    fn fixture(provider: MockProvider) -> Fixture {
        let registry = Arc::new(SessionRegistry::new());
        let settings = Arc::new(CachedSettings::new(
            Arc::new(InMemorySettingsStore::new(ProviderSettings::primary_only(
                ProviderKind::ChatGpt,
            ))),
            Duration::from_secs(60),
        ));
        let gateway = ProviderGateway::new(settings.clone(), Duration::from_secs(5))
            .with_provider(Arc::new(provider) as Arc<dyn GenerationProvider>);
        let pipeline = AnalysisPipeline::new(Arc::new(gateway), registry.clone());
        let content = Arc::new(InMemoryContentGateway::new());
        let orchestrator = AiOrchestrator::new(
            pipeline,
            registry,
            settings,
            content.clone(),
            "atelier-agent",
        );
        Fixture {
            orchestrator,
            content,
        }
    }

    fn owner() -> UserId {
        UserId::new("artist-1").unwrap()
    }

    #[tokio::test]
    async fn verified_artist_full_analysis_end_to_end() {
        let f = fixture(happy_provider());
        let principal = end_user("artist-1", ViewerRole::VerifiedArtist);

        let job_id = f
            .orchestrator
            .run_analysis(
                &principal,
                &owner(),
                ArtworkId::new(),
                ArtifactDescriptor::new("Harbor at Dawn"),
                TaskType::ALL.to_vec(),
            )
            .await
            .unwrap();

        let status = f.orchestrator.job_status(&principal, job_id).unwrap();
        assert_eq!(status.state, JobState::Complete);
        assert_eq!(status.results.len(), 4);

        // Artist-facing persona, all four succeeded on the primary
        for result in &status.results {
            assert_eq!(result.provider_used, ProviderKind::ChatGpt);
            assert!(!result.fallback_used);
        }
        let mean: f32 =
            status.results.iter().map(|r| r.confidence).sum::<f32>() / status.results.len() as f32;
        assert!((status.aggregate_confidence.unwrap() - mean).abs() < 1e-6);
    }

    #[tokio::test]
    async fn end_user_cannot_analyze_someone_elses_artifact() {
        let f = fixture(happy_provider());
        let principal = end_user("artist-2", ViewerRole::Artist);

        let err = f
            .orchestrator
            .run_analysis(
                &principal,
                &owner(),
                ArtworkId::new(),
                ArtifactDescriptor::new("Harbor"),
                TaskType::ALL.to_vec(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn job_status_is_owner_scoped() {
        let f = fixture(happy_provider());
        let principal = end_user("artist-1", ViewerRole::Artist);
        let job_id = f
            .orchestrator
            .run_analysis(
                &principal,
                &owner(),
                ArtworkId::new(),
                ArtifactDescriptor::new("Harbor"),
                vec![TaskType::Description],
            )
            .await
            .unwrap();

        let stranger = end_user("artist-2", ViewerRole::Artist);
        let err = f.orchestrator.job_status(&stranger, job_id).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn settings_are_admin_only_and_validated() {
        let f = fixture(happy_provider());

        let err = f
            .orchestrator
            .provider_settings(&end_user("artist-1", ViewerRole::Artist))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let settings = f.orchestrator.provider_settings(&admin()).await.unwrap();
        assert_eq!(settings.primary(), ProviderKind::ChatGpt);

        let err = f
            .orchestrator
            .update_provider_settings(&admin(), ProviderKind::Gemini, Some(ProviderKind::Gemini))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        f.orchestrator
            .update_provider_settings(&admin(), ProviderKind::Gemini, Some(ProviderKind::ChatGpt))
            .await
            .unwrap();
        let settings = f.orchestrator.provider_settings(&admin()).await.unwrap();
        assert_eq!(settings.primary(), ProviderKind::Gemini);
    }

    #[tokio::test]
    async fn agent_posts_completed_job_under_system_profile() {
        let f = fixture(happy_provider());
        let artist = end_user("artist-1", ViewerRole::VerifiedArtist);
        let job_id = f
            .orchestrator
            .run_analysis(
                &artist,
                &owner(),
                ArtworkId::new(),
                ArtifactDescriptor::new("Harbor at Dawn"),
                TaskType::ALL.to_vec(),
            )
            .await
            .unwrap();

        let agent = AuthPrincipal::agent_from_token("agent-secret");
        let artwork_id = f
            .orchestrator
            .post_artwork(
                &agent,
                PostArtworkRequest {
                    job_id,
                    title: "Harbor at Dawn".to_string(),
                    images: vec!["https://cdn.example/harbor.jpg".to_string()],
                    ai_context: "portfolio analysis".to_string(),
                },
            )
            .await
            .unwrap();

        let posted = f.content.posted().await;
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].artwork_id, artwork_id);
        assert_eq!(posted[0].profile_id, "atelier-agent");
        assert!(posted[0].params.ai_generated);
        assert_eq!(
            posted[0].params.description.as_deref(),
            Some("A luminous harbor at dawn.")
        );
        // Tag union across style, techniques, keywords
        let tags = posted[0].params.tags.as_ref().unwrap();
        assert!(tags.contains(&"Impressionism".to_string()));
        assert!(tags.contains(&"harbor".to_string()));
        assert!(!posted[0].params.metadata.accessibility.alt_text.is_empty());
    }

    #[tokio::test]
    async fn partial_job_never_crosses_the_content_boundary() {
        let provider = MockProvider::new(ProviderKind::ChatGpt)
            .with_task_response(TaskType::Description, "Prose.")
            .with_task_error(
                TaskType::Style,
                crate::ports::GenerationError::unavailable("down"),
            );
        let f = fixture(provider);
        let artist = end_user("artist-1", ViewerRole::Artist);
        let job_id = f
            .orchestrator
            .run_analysis(
                &artist,
                &owner(),
                ArtworkId::new(),
                ArtifactDescriptor::new("Harbor"),
                vec![TaskType::Description, TaskType::Style],
            )
            .await
            .unwrap();

        let agent = AuthPrincipal::agent_from_token("agent-secret");
        let err = f
            .orchestrator
            .post_artwork(
                &agent,
                PostArtworkRequest {
                    job_id,
                    title: "Harbor".to_string(),
                    images: vec![],
                    ai_context: "test".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(f.content.posted_count().await, 0);
    }

    #[tokio::test]
    async fn non_agent_principals_cannot_post() {
        let f = fixture(happy_provider());
        let err = f
            .orchestrator
            .post_artwork(
                &admin(),
                PostArtworkRequest {
                    job_id: JobId::new(),
                    title: "t".to_string(),
                    images: vec![],
                    ai_context: "c".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn cancelled_job_yields_no_metadata() {
        let provider = happy_provider().with_delay(Duration::from_millis(50));
        let f = fixture(provider);
        let artist = end_user("artist-1", ViewerRole::Artist);
        let job_id = f
            .orchestrator
            .start_analysis(
                &artist,
                &owner(),
                ArtworkId::new(),
                ArtifactDescriptor::new("Harbor"),
                TaskType::ALL.to_vec(),
            )
            .unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        f.orchestrator.cancel_job(&artist, job_id).unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        let agent = AuthPrincipal::agent_from_token("agent-secret");
        let err = f
            .orchestrator
            .post_artwork(
                &agent,
                PostArtworkRequest {
                    job_id,
                    title: "Harbor".to_string(),
                    images: vec![],
                    ai_context: "test".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(f.content.posted_count().await, 0);
    }
}
