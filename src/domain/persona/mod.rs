//! Persona resolution.
//!
//! Maps a viewer's role to the assistant persona that fronts every AI
//! response for that viewer. Resolution is a total, pure function over the
//! closed role set; unknown roles land on the universal `Guide` persona.
//! Personas influence *tone framing* only - the factual instructions come
//! from the prompt catalog.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ViewerRole;

/// Assistant identity used when responding to a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Artist-facing voice: craft-focused, encouraging.
    Mentor,
    /// Collector-facing voice: market and provenance aware.
    Collector,
    /// Curator-facing voice: art-historical framing.
    Curator,
    /// Admin-facing voice: neutral and operational.
    Advisor,
    /// Universal fallback for guests and unknown roles.
    Guide,
}

impl Persona {
    /// Resolves the persona for a viewer role.
    ///
    /// Total and deterministic: the same role always yields the same
    /// persona, so downstream prompt construction can be cached safely.
    pub fn resolve(role: ViewerRole) -> Persona {
        match role {
            ViewerRole::Artist | ViewerRole::VerifiedArtist => Persona::Mentor,
            ViewerRole::Collector => Persona::Collector,
            ViewerRole::Curator => Persona::Curator,
            ViewerRole::Admin => Persona::Advisor,
            ViewerRole::Guest => Persona::Guide,
        }
    }

    /// Tone framing prepended to generated prompts by the analysis pipeline.
    pub fn tone_framing(&self) -> &'static str {
        match self {
            Persona::Mentor => {
                "You are a seasoned art mentor speaking to the artist who made the work. \
                 Be specific about craft and technique, and constructive in tone."
            }
            Persona::Collector => {
                "You are an art advisor speaking to a collector. Note provenance, \
                 medium, and what distinguishes the piece, in a measured tone."
            }
            Persona::Curator => {
                "You are a gallery curator. Place the work in its stylistic context \
                 and describe it with art-historical precision."
            }
            Persona::Advisor => {
                "You are a neutral gallery operations assistant. Be factual and brief."
            }
            Persona::Guide => {
                "You are a friendly gallery guide. Describe the work plainly for a \
                 general audience."
            }
        }
    }

    /// Wire name of the persona.
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Mentor => "mentor",
            Persona::Collector => "collector",
            Persona::Curator => "curator",
            Persona::Advisor => "advisor",
            Persona::Guide => "guide",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn resolve_is_total_over_roles() {
        let roles = [
            ViewerRole::Guest,
            ViewerRole::Artist,
            ViewerRole::VerifiedArtist,
            ViewerRole::Collector,
            ViewerRole::Curator,
            ViewerRole::Admin,
        ];
        for role in roles {
            // Must not panic, and twice yields the same persona
            assert_eq!(Persona::resolve(role), Persona::resolve(role));
        }
    }

    #[test]
    fn verified_artist_gets_artist_facing_persona() {
        assert_eq!(Persona::resolve(ViewerRole::VerifiedArtist), Persona::Mentor);
        assert_eq!(Persona::resolve(ViewerRole::Artist), Persona::Mentor);
    }

    #[test]
    fn guest_gets_universal_default() {
        assert_eq!(Persona::resolve(ViewerRole::Guest), Persona::Guide);
    }

    #[test]
    fn guide_is_distinct_from_role_personas() {
        for role in [
            ViewerRole::Artist,
            ViewerRole::VerifiedArtist,
            ViewerRole::Collector,
            ViewerRole::Curator,
            ViewerRole::Admin,
        ] {
            assert_ne!(Persona::resolve(role), Persona::Guide);
        }
    }

    #[test]
    fn every_persona_has_tone_framing() {
        for persona in [
            Persona::Mentor,
            Persona::Collector,
            Persona::Curator,
            Persona::Advisor,
            Persona::Guide,
        ] {
            assert!(!persona.tone_framing().is_empty());
        }
    }

    proptest! {
        /// Any role string resolves deterministically, including garbage.
        #[test]
        fn resolution_is_deterministic_for_any_role_string(role in ".*") {
            let first = Persona::resolve(ViewerRole::parse(&role));
            let second = Persona::resolve(ViewerRole::parse(&role));
            prop_assert_eq!(first, second);
        }
    }
}
