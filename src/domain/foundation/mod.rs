//! Foundation types shared across the domain.
//!
//! Typed identifiers, error codes, and the caller principal types. No I/O,
//! no provider knowledge.

mod auth;
mod errors;
mod ids;

pub use auth::{AuthError, AuthPrincipal, ViewerRole};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ArtworkId, JobId, SessionId, UserId};
