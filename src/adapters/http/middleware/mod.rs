//! HTTP middleware.

mod auth;

pub use auth::{
    agent_auth_middleware, principal_middleware, AgentAuthState, PrincipalRejection,
    RequirePrincipal, SESSION_ID_HEADER, USER_ID_HEADER, USER_ROLE_HEADER,
};
