//! Authentication types for the domain layer.
//!
//! These types represent the caller identity extracted from a validated
//! request. They have **no external dependencies** - the managed auth
//! backend validates end-user sessions; the agent path is validated by the
//! bearer middleware against the configured shared secret.
//!
//! # Design Decisions
//!
//! - `AuthPrincipal` is a closed tagged union; authorization matches on it
//!   exhaustively and fails closed.
//! - The agent variant carries only a hash of the presented token, never
//!   the token itself.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::{SessionId, UserId};

/// Role of the viewer, as recorded on their profile.
///
/// Unknown or absent roles parse to `Guest`; persona resolution maps that
/// to the universal default persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerRole {
    Guest,
    Artist,
    VerifiedArtist,
    Collector,
    Curator,
    Admin,
}

impl ViewerRole {
    /// Parses a role string from the profile record.
    ///
    /// Total over all inputs: unrecognized strings become `Guest`.
    pub fn parse(role: &str) -> Self {
        match role {
            "artist" => ViewerRole::Artist,
            "verified_artist" => ViewerRole::VerifiedArtist,
            "collector" => ViewerRole::Collector,
            "curator" => ViewerRole::Curator,
            "admin" => ViewerRole::Admin,
            _ => ViewerRole::Guest,
        }
    }

    /// Returns the wire representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewerRole::Guest => "guest",
            ViewerRole::Artist => "artist",
            ViewerRole::VerifiedArtist => "verified_artist",
            ViewerRole::Collector => "collector",
            ViewerRole::Curator => "curator",
            ViewerRole::Admin => "admin",
        }
    }
}

/// The authenticated caller of an orchestration operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPrincipal {
    /// An end-user browsing session.
    EndUser {
        user_id: UserId,
        session_id: SessionId,
        role: ViewerRole,
    },
    /// An administrator session.
    Admin {
        user_id: UserId,
        session_id: SessionId,
    },
    /// A machine-to-machine agent, authenticated by shared secret.
    Agent {
        /// SHA-256 of the presented token, hex-encoded. For audit logs only;
        /// the exact-match check happens before this principal is built.
        token_hash: String,
    },
}

impl AuthPrincipal {
    /// Creates an agent principal from the already-verified token.
    pub fn agent_from_token(token: &str) -> Self {
        let digest = Sha256::digest(token.as_bytes());
        let token_hash = digest.iter().fold(String::new(), |mut acc, b| {
            use std::fmt::Write;
            let _ = write!(acc, "{:02x}", b);
            acc
        });
        AuthPrincipal::Agent { token_hash }
    }

    /// Returns the user id for user-backed principals.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            AuthPrincipal::EndUser { user_id, .. } | AuthPrincipal::Admin { user_id, .. } => {
                Some(user_id)
            }
            AuthPrincipal::Agent { .. } => None,
        }
    }
}

/// Authentication errors that can occur before authorization runs.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or does not match.
    #[error("Invalid or missing credentials")]
    InvalidCredentials,

    /// The Authorization header is present but not `Bearer <token>`.
    #[error("Malformed authorization header")]
    MalformedHeader,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewer_role_parses_known_roles() {
        assert_eq!(ViewerRole::parse("artist"), ViewerRole::Artist);
        assert_eq!(
            ViewerRole::parse("verified_artist"),
            ViewerRole::VerifiedArtist
        );
        assert_eq!(ViewerRole::parse("collector"), ViewerRole::Collector);
        assert_eq!(ViewerRole::parse("curator"), ViewerRole::Curator);
        assert_eq!(ViewerRole::parse("admin"), ViewerRole::Admin);
    }

    #[test]
    fn viewer_role_parses_unknown_to_guest() {
        assert_eq!(ViewerRole::parse("superuser"), ViewerRole::Guest);
        assert_eq!(ViewerRole::parse(""), ViewerRole::Guest);
    }

    #[test]
    fn viewer_role_round_trips() {
        for role in [
            ViewerRole::Guest,
            ViewerRole::Artist,
            ViewerRole::VerifiedArtist,
            ViewerRole::Collector,
            ViewerRole::Curator,
            ViewerRole::Admin,
        ] {
            assert_eq!(ViewerRole::parse(role.as_str()), role);
        }
    }

    #[test]
    fn agent_principal_hashes_token() {
        let principal = AuthPrincipal::agent_from_token("agent-secret");
        match &principal {
            AuthPrincipal::Agent { token_hash } => {
                assert_eq!(token_hash.len(), 64);
                assert!(!token_hash.contains("agent-secret"));
            }
            _ => panic!("expected agent principal"),
        }
    }

    #[test]
    fn agent_principal_hash_is_deterministic() {
        assert_eq!(
            AuthPrincipal::agent_from_token("t1"),
            AuthPrincipal::agent_from_token("t1")
        );
        assert_ne!(
            AuthPrincipal::agent_from_token("t1"),
            AuthPrincipal::agent_from_token("t2")
        );
    }

    #[test]
    fn user_id_accessor_covers_variants() {
        let user_id = UserId::new("u-1").unwrap();
        let end_user = AuthPrincipal::EndUser {
            user_id: user_id.clone(),
            session_id: SessionId::new(),
            role: ViewerRole::Artist,
        };
        assert_eq!(end_user.user_id(), Some(&user_id));

        let agent = AuthPrincipal::agent_from_token("t");
        assert_eq!(agent.user_id(), None);
    }
}
