//! Check-in observations as submitted, stored, and returned.

use crate::{ClientClock, ObservationId, ParseError, RiskAssessment, SubjectId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Caregiver-reported mood.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mood {
    Good,
    #[serde(rename = "OK")]
    Ok,
    Low,
}

impl Mood {
    /// Accepted wire values, in display order.
    pub const ALL: [Mood; 3] = [Mood::Good, Mood::Ok, Mood::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Good => "Good",
            Mood::Ok => "OK",
            Mood::Low => "Low",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == value)
            .ok_or_else(|| ParseError::UnknownMood(value.to_string()))
    }
}

/// The three 1-5 cognitive scores of a check-in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scores {
    #[serde(rename = "memory_score")]
    pub memory: u8,
    #[serde(rename = "orientation_score")]
    pub orientation: u8,
    #[serde(rename = "activities_score")]
    pub activities: u8,
}

impl Scores {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(memory: u8, orientation: u8, activities: u8) -> Self {
        Self {
            memory,
            orientation,
            activities,
        }
    }

    /// Mean of the three scores.
    pub fn per_item_mean(&self) -> f64 {
        f64::from(u16::from(self.memory) + u16::from(self.orientation) + u16::from(self.activities))
            / 3.0
    }
}

/// Validated check-in that has not been assigned an identity yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewObservation {
    pub subject_id: SubjectId,
    pub date: NaiveDate,
    pub scores: Scores,
    pub mood: Mood,
    pub notes: String,
    pub client_clock: ClientClock,
    pub observed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub assessment: RiskAssessment,
}

impl NewObservation {
    /// Attach the identity assigned by a store.
    pub fn into_observation(self, id: ObservationId) -> Observation {
        Observation {
            id,
            subject_id: self.subject_id,
            date: self.date,
            scores: self.scores,
            mood: self.mood,
            notes: self.notes,
            client_clock: self.client_clock,
            observed_at: self.observed_at,
            created_at: self.created_at,
            assessment: self.assessment,
        }
    }
}

/// Stored check-in together with its assessment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub id: ObservationId,
    pub subject_id: SubjectId,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub scores: Scores,
    pub mood: Mood,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub client_clock: ClientClock,
    /// Local noon of `date` in the client's offset.
    pub observed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub assessment: RiskAssessment,
}

/// Raw check-in body as posted by a client.
///
/// Every field is optional and loosely typed so that validation can report
/// all problems at once instead of failing on the first decode error.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CheckinInput {
    #[serde(default)]
    pub subject_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub memory_score: Option<Value>,
    #[serde(default)]
    pub orientation_score: Option<Value>,
    #[serde(default)]
    pub activities_score: Option<Value>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub utc_offset_minutes: Option<Value>,
    #[serde(default)]
    pub local_date: Option<String>,
}
