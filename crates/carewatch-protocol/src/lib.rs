//! Wire types shared by the Carewatch store, pipeline, and HTTP API.

mod assessment;
mod calendar;
mod observation;
mod profile;

pub use assessment::{
    AssessmentSource, AssessmentStatus, DEFAULT_DISCLAIMER, RiskAssessment, RiskLevel, Trend,
};
pub use calendar::{ANCHOR_HOUR, ClientClock, MAX_UTC_OFFSET_MINUTES, MIN_UTC_OFFSET_MINUTES};
pub use calendar::{anchor_instant, anchored_date};
pub use observation::{CheckinInput, Mood, NewObservation, Observation, Scores};
pub use profile::{Profile, ProfileInput};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subject tracked when a request does not name one.
pub const DEFAULT_SUBJECT: &str = "primary";

/// Opaque observation identity, always carried as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationId(String);

impl ObservationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObservationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identity of the person being observed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SubjectId {
    fn default() -> Self {
        Self::new(DEFAULT_SUBJECT)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Errors returned when parsing closed enumerations from strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown mood: {0}")]
    UnknownMood(String),
    #[error("unknown risk level: {0}")]
    UnknownRiskLevel(String),
}

#[cfg(test)]
mod tests {
    use super::{ObservationId, SubjectId};
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = ObservationId::new("6f1c2a9e");
        assert_eq!(serde_json::to_string(&id).expect("json"), "\"6f1c2a9e\"");
        let decoded: ObservationId = serde_json::from_str("\"6f1c2a9e\"").expect("decode");
        assert_eq!(decoded, id);
    }

    #[test]
    fn default_subject_is_primary() {
        assert_eq!(SubjectId::default().as_str(), "primary");
    }
}
