//! Authentication middleware and extractors for axum.
//!
//! Two paths exist:
//!
//! - **User path**: the managed auth backend in front of this service has
//!   already validated the viewer's session; `principal_middleware` trusts
//!   its identity headers and injects an `AuthPrincipal` into extensions.
//! - **Agent path**: `agent_auth_middleware` validates the shared-secret
//!   bearer token itself. The match is exact over the full secret and
//!   constant-time; a missing, malformed, or mismatched header fails
//!   closed with `UNAUTHORIZED` and never falls through unauthenticated.
//!
//! ```text
//! Request → middleware → injects AuthPrincipal into extensions
//!                                ↓
//!                        Handler → RequirePrincipal extractor
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;

use crate::domain::foundation::{AuthPrincipal, SessionId, UserId, ViewerRole};

/// Header carrying the upstream-resolved user id.
pub const USER_ID_HEADER: &str = "x-atelier-user-id";
/// Header carrying the upstream-resolved session id.
pub const SESSION_ID_HEADER: &str = "x-atelier-session-id";
/// Header carrying the upstream-resolved profile role.
pub const USER_ROLE_HEADER: &str = "x-atelier-role";

/// State for the agent bearer middleware.
pub struct AgentAuthState {
    token: Option<Secret<String>>,
}

impl AgentAuthState {
    /// Creates the state from the configured shared secret.
    pub fn new(token: Option<Secret<String>>) -> Self {
        Self { token }
    }
}

/// Builds end-user/admin principals from the trusted identity headers.
///
/// Requests without the headers continue unauthenticated; handlers using
/// `RequirePrincipal` reject them.
pub async fn principal_middleware(mut request: Request, next: Next) -> Response {
    let principal = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };

        if let (Some(user_id), Some(session_id)) =
            (header(USER_ID_HEADER), header(SESSION_ID_HEADER))
        {
            UserId::new(user_id).ok().and_then(|user_id| {
                let session_id: SessionId = session_id.parse().ok()?;
                let role = ViewerRole::parse(header(USER_ROLE_HEADER).as_deref().unwrap_or(""));
                Some(if role == ViewerRole::Admin {
                    AuthPrincipal::Admin { user_id, session_id }
                } else {
                    AuthPrincipal::EndUser {
                        user_id,
                        session_id,
                        role,
                    }
                })
            })
        } else {
            None
        }
    };

    if let Some(principal) = principal {
        request.extensions_mut().insert(principal);
    }

    next.run(request).await
}

/// Validates the agent shared-secret bearer token.
///
/// Expects exactly `Authorization: Bearer <token>`. The token compare is
/// constant-time over the full secret; no prefix matching. When no secret
/// is configured the path is closed entirely.
pub async fn agent_auth_middleware(
    State(state): State<Arc<AgentAuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let (Some(presented), Some(expected)) = (presented, state.token.as_ref()) else {
        return unauthorized();
    };

    let matches: bool = presented
        .as_bytes()
        .ct_eq(expected.expose_secret().as_bytes())
        .into();
    if !matches {
        tracing::warn!("agent token mismatch");
        return unauthorized();
    }

    let principal = AuthPrincipal::agent_from_token(presented);
    request.extensions_mut().insert(principal);
    next.run(request).await
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required",
            "code": "UNAUTHORIZED"
        })),
    )
        .into_response()
}

/// Extractor that requires an authenticated principal.
///
/// Returns 401 when no middleware injected a principal.
#[derive(Debug, Clone)]
pub struct RequirePrincipal(pub AuthPrincipal);

impl<S> axum::extract::FromRequestParts<S> for RequirePrincipal
where
    S: Send + Sync,
{
    type Rejection = PrincipalRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<AuthPrincipal>()
                .cloned()
                .map(RequirePrincipal)
                .ok_or(PrincipalRejection::Unauthenticated)
        })
    }
}

/// Rejection type for missing principals.
#[derive(Debug, Clone)]
pub enum PrincipalRejection {
    /// No valid principal was injected by the middleware.
    Unauthenticated,
}

impl IntoResponse for PrincipalRejection {
    fn into_response(self) -> Response {
        unauthorized()
    }
}
