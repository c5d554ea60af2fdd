//! Structural validation of client payloads.
//!
//! Validation never touches storage. Every problem with a payload is
//! collected so that clients can fix a form in one round trip.

use crate::error::ValidationError;
use carewatch_config::CheckinsConfig;
use carewatch_protocol::{
    CheckinInput, ClientClock, MAX_UTC_OFFSET_MINUTES, MIN_UTC_OFFSET_MINUTES, Mood,
    NewObservation, Profile, ProfileInput, RiskAssessment, Scores, SubjectId, anchor_instant,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";
const MAX_SUBJECT_CHARS: usize = 64;
const MAX_TIMEZONE_CHARS: usize = 64;
const MIN_AGE: i64 = 1;
const MAX_AGE: i64 = 150;
const MAX_EDUCATION_YEARS: i64 = 30;

/// Turn a raw check-in into a storable observation with a pending assessment.
pub fn validate_checkin(
    input: &CheckinInput,
    limits: &CheckinsConfig,
    received_at: DateTime<Utc>,
) -> Result<NewObservation, ValidationError> {
    let mut errors = Vec::new();

    let date = match present_str(input.date.as_deref()) {
        None => {
            errors.push(missing("date"));
            None
        }
        Some(raw) => {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                errors.push("Invalid date format. Use YYYY-MM-DD".to_string());
            }
            parsed
        }
    };

    let memory = score(&mut errors, "memory_score", input.memory_score.as_ref());
    let orientation = score(&mut errors, "orientation_score", input.orientation_score.as_ref());
    let activities = score(&mut errors, "activities_score", input.activities_score.as_ref());

    let mood = match present_str(input.mood.as_deref()) {
        None => {
            errors.push(missing("mood"));
            None
        }
        Some(raw) => {
            let parsed = raw.parse::<Mood>().ok();
            if parsed.is_none() {
                let allowed: Vec<_> = Mood::ALL.iter().map(Mood::as_str).collect();
                errors.push(format!("Mood must be one of: {}", allowed.join(", ")));
            }
            parsed
        }
    };

    let notes = input.notes.as_deref().unwrap_or_default().trim().to_string();
    if notes.chars().count() > limits.notes_max_chars {
        errors.push(format!(
            "Notes must be at most {} characters",
            limits.notes_max_chars
        ));
    }

    let subject_id = subject(&mut errors, input.subject_id.as_deref());
    let client_clock = client_clock(&mut errors, input);

    match (date, memory, orientation, activities, mood) {
        (Some(date), Some(memory), Some(orientation), Some(activities), Some(mood))
            if errors.is_empty() =>
        {
            let observed_at = anchor_instant(date, client_clock.offset_minutes());
            Ok(NewObservation {
                subject_id,
                date,
                scores: Scores::new(memory, orientation, activities),
                mood,
                notes,
                client_clock,
                observed_at,
                created_at: received_at,
                assessment: RiskAssessment::pending(),
            })
        }
        _ => Err(ValidationError::new(errors)),
    }
}

/// Apply a profile edit on top of the stored profile.
///
/// Absent fields keep their stored value; explicit nulls clear optional ones.
pub fn validate_profile(
    current: Profile,
    input: &ProfileInput,
) -> Result<Profile, ValidationError> {
    let mut errors = Vec::new();
    let mut profile = current;

    if let Some(name) = &input.name {
        profile.name = name.trim().to_string();
    }

    match input.age.as_ref() {
        None => {}
        Some(Value::Null) => profile.age = None,
        Some(value) => match integer(value) {
            Some(age) if (MIN_AGE..=MAX_AGE).contains(&age) => {
                profile.age = u16::try_from(age).ok();
            }
            Some(_) => errors.push(format!(
                "Age must be a positive number between {MIN_AGE} and {MAX_AGE}"
            )),
            None => errors.push("Age must be a valid number".to_string()),
        },
    }

    match input.education_years.as_ref() {
        None => {}
        Some(Value::Null) => profile.education_years = None,
        Some(Value::String(raw)) if raw.trim().is_empty() => profile.education_years = None,
        Some(value) => match integer(value) {
            Some(years) if (0..=MAX_EDUCATION_YEARS).contains(&years) => {
                profile.education_years = u8::try_from(years).ok();
            }
            Some(_) => errors.push(format!(
                "Education years must be between 0 and {MAX_EDUCATION_YEARS}"
            )),
            None => errors.push("Education years must be a valid number".to_string()),
        },
    }

    if let Some(notes) = &input.diagnosis_notes {
        let notes = notes.trim();
        profile.diagnosis_notes = (!notes.is_empty()).then(|| notes.to_string());
    }

    if errors.is_empty() {
        Ok(profile)
    } else {
        Err(ValidationError::new(errors))
    }
}

/// Clamp a requested listing size into `[1, max_limit]`.
pub fn clamp_limit(requested: Option<i64>, limits: &CheckinsConfig) -> usize {
    let max = limits.max_limit.max(1);
    match requested {
        None => limits.default_limit.clamp(1, max),
        Some(value) if value < 1 => 1,
        Some(value) => usize::try_from(value).map_or(max, |value| value.min(max)),
    }
}

/// Subject ids are short slugs; blank means the default subject.
pub fn parse_subject(raw: Option<&str>) -> Result<SubjectId, ValidationError> {
    let mut errors = Vec::new();
    let subject = subject(&mut errors, raw);
    if errors.is_empty() {
        Ok(subject)
    } else {
        Err(ValidationError::new(errors))
    }
}

fn missing(field: &str) -> String {
    format!("Missing required field: {field}")
}

fn present_str(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Integers, integral floats and numeric strings all count as integers.
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.fract() == 0.0 && float.abs() < i64::MAX as f64)
                .map(|float| float as i64)
        }),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

fn score(errors: &mut Vec<String>, field: &str, value: Option<&Value>) -> Option<u8> {
    let value = match value {
        None | Some(Value::Null) => {
            errors.push(missing(field));
            return None;
        }
        Some(Value::String(raw)) if raw.trim().is_empty() => {
            errors.push(missing(field));
            return None;
        }
        Some(value) => value,
    };
    let range = i64::from(Scores::MIN)..=i64::from(Scores::MAX);
    match integer(value) {
        Some(score) if range.contains(&score) => u8::try_from(score).ok(),
        Some(_) => {
            errors.push(format!(
                "{field} must be between {} and {}",
                Scores::MIN,
                Scores::MAX
            ));
            None
        }
        None => {
            errors.push(format!(
                "{field} must be a valid number between {} and {}",
                Scores::MIN,
                Scores::MAX
            ));
            None
        }
    }
}

fn subject(errors: &mut Vec<String>, raw: Option<&str>) -> SubjectId {
    let Some(raw) = present_str(raw) else {
        return SubjectId::default();
    };
    let valid = raw.chars().count() <= MAX_SUBJECT_CHARS
        && raw
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if !valid {
        errors.push(format!(
            "subject_id must be at most {MAX_SUBJECT_CHARS} letters, digits, '-' or '_'"
        ));
    }
    SubjectId::new(raw)
}

fn client_clock(errors: &mut Vec<String>, input: &CheckinInput) -> ClientClock {
    let timezone = present_str(input.timezone.as_deref()).map(str::to_string);
    if timezone
        .as_ref()
        .is_some_and(|zone| zone.chars().count() > MAX_TIMEZONE_CHARS)
    {
        errors.push(format!(
            "timezone must be at most {MAX_TIMEZONE_CHARS} characters"
        ));
    }

    let range = i64::from(MIN_UTC_OFFSET_MINUTES)..=i64::from(MAX_UTC_OFFSET_MINUTES);
    let utc_offset_minutes = match input.utc_offset_minutes.as_ref() {
        None | Some(Value::Null) => None,
        Some(value) => match integer(value) {
            Some(offset) if range.contains(&offset) => i32::try_from(offset).ok(),
            _ => {
                errors.push(format!(
                    "utc_offset_minutes must be an integer between {MIN_UTC_OFFSET_MINUTES} and {MAX_UTC_OFFSET_MINUTES}"
                ));
                None
            }
        },
    };

    let local_date = match present_str(input.local_date.as_deref()) {
        None => None,
        Some(raw) => {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                errors.push("local_date must use YYYY-MM-DD".to_string());
            }
            parsed
        }
    };

    ClientClock {
        timezone,
        utc_offset_minutes,
        local_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn input(memory: Value, orientation: Value, activities: Value, mood: &str) -> CheckinInput {
        CheckinInput {
            date: Some("2024-03-10".to_string()),
            memory_score: Some(memory),
            orientation_score: Some(orientation),
            activities_score: Some(activities),
            mood: Some(mood.to_string()),
            ..CheckinInput::default()
        }
    }

    fn check(input: &CheckinInput) -> Result<NewObservation, ValidationError> {
        validate_checkin(input, &CheckinsConfig::default(), Utc::now())
    }

    #[test]
    fn score_bounds_are_inclusive() {
        assert!(check(&input(json!(1), json!(5), json!(3), "Good")).is_ok());
        let err = check(&input(json!(0), json!(6), json!(3), "Good")).unwrap_err();
        assert_eq!(
            err.messages,
            vec![
                "memory_score must be between 1 and 5".to_string(),
                "orientation_score must be between 1 and 5".to_string(),
            ]
        );
    }

    #[test]
    fn numeric_strings_are_accepted_as_scores() {
        let observation = check(&input(json!("2"), json!(4.0), json!(" 5 "), "OK")).expect("valid");
        assert_eq!(observation.scores, Scores::new(2, 4, 5));
        assert_eq!(observation.mood, Mood::Ok);
    }

    #[test]
    fn non_integral_scores_are_rejected() {
        let err = check(&input(json!(2.5), json!("high"), json!(true), "Good")).unwrap_err();
        assert_eq!(err.messages.len(), 3);
        assert!(err.messages[0].ends_with("must be a valid number between 1 and 5"));
    }

    #[test]
    fn every_missing_field_is_reported() {
        let err = check(&CheckinInput::default()).unwrap_err();
        assert_eq!(
            err.messages,
            vec![
                "Missing required field: date".to_string(),
                "Missing required field: memory_score".to_string(),
                "Missing required field: orientation_score".to_string(),
                "Missing required field: activities_score".to_string(),
                "Missing required field: mood".to_string(),
            ]
        );
    }

    #[test]
    fn mood_and_date_formats_are_checked() {
        let mut bad = input(json!(3), json!(3), json!(3), "ok");
        bad.date = Some("2024-3-10".to_string());
        let err = check(&bad).unwrap_err();
        assert_eq!(
            err.messages,
            vec![
                "Invalid date format. Use YYYY-MM-DD".to_string(),
                "Mood must be one of: Good, OK, Low".to_string(),
            ]
        );
    }

    #[test]
    fn notes_are_trimmed_and_bounded() {
        let mut valid = input(json!(3), json!(3), json!(3), "Low");
        valid.notes = Some("  forgot keys twice  ".to_string());
        assert_eq!(check(&valid).expect("valid").notes, "forgot keys twice");

        valid.notes = Some("a".repeat(1001));
        let err = check(&valid).unwrap_err();
        assert_eq!(err.messages, vec!["Notes must be at most 1000 characters".to_string()]);
    }

    #[test]
    fn date_is_anchored_at_client_noon() {
        let mut valid = input(json!(3), json!(3), json!(3), "Good");
        valid.utc_offset_minutes = Some(json!(-300));
        valid.timezone = Some("America/New_York".to_string());
        valid.local_date = Some("2024-03-10".to_string());
        let observation = check(&valid).expect("valid");
        assert_eq!(observation.observed_at.to_rfc3339(), "2024-03-10T17:00:00+00:00");
        assert_eq!(observation.client_clock.utc_offset_minutes, Some(-300));
        assert!(observation.assessment.is_pending());
        assert_eq!(observation.subject_id, SubjectId::default());
    }

    #[test]
    fn client_clock_bounds_are_enforced() {
        let mut bad = input(json!(3), json!(3), json!(3), "Good");
        bad.utc_offset_minutes = Some(json!(900));
        bad.local_date = Some("yesterday".to_string());
        bad.subject_id = Some("mum dad".to_string());
        let err = check(&bad).unwrap_err();
        assert_eq!(err.messages.len(), 3);
    }

    #[test]
    fn profile_edits_validate_ranges() {
        let current = Profile::blank(SubjectId::default());
        let edit = ProfileInput {
            name: Some(" Rosa ".to_string()),
            age: Some(json!("82")),
            education_years: Some(json!("")),
            diagnosis_notes: Some("".to_string()),
        };
        let profile = validate_profile(current.clone(), &edit).expect("valid");
        assert_eq!(profile.name, "Rosa");
        assert_eq!(profile.age, Some(82));
        assert_eq!(profile.education_years, None);
        assert_eq!(profile.diagnosis_notes, None);

        let bad = ProfileInput {
            age: Some(json!(0)),
            education_years: Some(json!(31)),
            ..ProfileInput::default()
        };
        let err = validate_profile(current, &bad).unwrap_err();
        assert_eq!(
            err.messages,
            vec![
                "Age must be a positive number between 1 and 150".to_string(),
                "Education years must be between 0 and 30".to_string(),
            ]
        );
    }

    #[test]
    fn limits_are_clamped() {
        let limits = CheckinsConfig::default();
        assert_eq!(clamp_limit(None, &limits), 20);
        assert_eq!(clamp_limit(Some(0), &limits), 1);
        assert_eq!(clamp_limit(Some(-4), &limits), 1);
        assert_eq!(clamp_limit(Some(7), &limits), 7);
        assert_eq!(clamp_limit(Some(500), &limits), 50);
    }
}
