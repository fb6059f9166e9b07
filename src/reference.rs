//! Entity id discipline and cross-entity property references
//!
//! Ids are `"<PREFIX>/<disambiguator>"`; a reference is `"<owner id>#<property>"`.
//! Nothing is looked up here: references are resolved by the rendering client,
//! so naming is a pure function.

use std::fmt;

/// Kind of primary entity, one id prefix per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Header,
    Satellite,
    Constellation,
    GroundStation,
    LineOfVisibility,
    FieldOfObservation,
    AttitudePointing,
    Covariance,
    GroundTrack,
    Collision,
    Maneuver,
    ReferenceSystem,
    Body,
}

impl EntityKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Header => "document",
            Self::Satellite => "SAT",
            Self::Constellation => "CONST",
            Self::GroundStation => "GS",
            Self::LineOfVisibility => "LOV",
            Self::FieldOfObservation => "FOV",
            Self::AttitudePointing => "ATT",
            Self::Covariance => "COV",
            Self::GroundTrack => "GT",
            Self::Collision => "COLL",
            Self::Maneuver => "MAN",
            Self::ReferenceSystem => "REF",
            Self::Body => "BODY",
        }
    }
}

/// Build an entity id; the header id has no disambiguator
pub fn entity_id(kind: EntityKind, disambiguator: &str) -> String {
    match kind {
        EntityKind::Header => kind.prefix().to_string(),
        _ => format!("{}/{}", kind.prefix(), disambiguator),
    }
}

/// Pointer to a live property of another entity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyReference {
    pub target: String,
    pub property: String,
}

impl PropertyReference {
    pub fn new(target: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            property: property.into(),
        }
    }

    /// `<target>#position`, the most common reference
    pub fn position_of(target: &str) -> Self {
        Self::new(target, "position")
    }

    pub fn orientation_of(target: &str) -> Self {
        Self::new(target, "orientation")
    }
}

impl fmt::Display for PropertyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.target, self.property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids() {
        assert_eq!(entity_id(EntityKind::Satellite, "1"), "SAT/1");
        assert_eq!(entity_id(EntityKind::Covariance, "SAT/1"), "COV/SAT/1");
        assert_eq!(entity_id(EntityKind::Header, "ignored"), "document");
    }

    #[test]
    fn test_reference_string() {
        assert_eq!(
            PropertyReference::position_of("SAT/1").to_string(),
            "SAT/1#position"
        );
        assert_eq!(
            PropertyReference::new("GS/Kiruna", "orientation").to_string(),
            "GS/Kiruna#orientation"
        );
    }
}
