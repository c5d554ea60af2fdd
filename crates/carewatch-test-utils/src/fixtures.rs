//! Canned observations, check-in payloads and provider replies.

use carewatch_protocol::{
    CheckinInput, ClientClock, Mood, NewObservation, Observation, ObservationId, RiskAssessment,
    Scores, SubjectId, anchor_instant,
};
use chrono::{NaiveDate, Utc};
use serde_json::json;

/// June 2024; `day` must be a valid day of that month.
pub fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap_or(NaiveDate::MIN)
}

/// Pending observation for the default subject on `june(day)`.
pub fn new_observation(day: u32, scores: Scores) -> NewObservation {
    let date = june(day);
    NewObservation {
        subject_id: SubjectId::default(),
        date,
        scores,
        mood: Mood::Ok,
        notes: String::new(),
        client_clock: ClientClock::default(),
        observed_at: anchor_instant(date, 0),
        created_at: Utc::now(),
        assessment: RiskAssessment::pending(),
    }
}

/// Stored-looking observation with a fixed id.
pub fn observation(id: &str, day: u32, scores: Scores, mood: Mood) -> Observation {
    let mut observation = new_observation(day, scores);
    observation.mood = mood;
    observation.into_observation(ObservationId::new(id))
}

/// Check-in body as a client would post it.
pub fn checkin_input(
    date: &str,
    memory: u8,
    orientation: u8,
    activities: u8,
    mood: &str,
) -> CheckinInput {
    CheckinInput {
        date: Some(date.to_string()),
        memory_score: Some(json!(memory)),
        orientation_score: Some(json!(orientation)),
        activities_score: Some(json!(activities)),
        mood: Some(mood.to_string()),
        ..CheckinInput::default()
    }
}

/// JSON reply in the shape the reasoning provider is asked for.
pub fn provider_reply(risk_level: &str, summary: &str, suggestions: &[&str]) -> String {
    json!({
        "risk_level": risk_level,
        "summary": summary,
        "suggestions": suggestions,
    })
    .to_string()
}
