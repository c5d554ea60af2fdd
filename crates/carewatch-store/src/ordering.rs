//! Shared ordering and selection rules for store listings.

use carewatch_protocol::{Observation, ObservationId};
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;

/// Position in a subject's timeline.
///
/// Observations compare by calendar date first; same-day entries fall back to
/// submission time, then id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct HistoryCursor {
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub id: ObservationId,
}

impl HistoryCursor {
    pub fn of(observation: &Observation) -> Self {
        Self {
            date: observation.date,
            created_at: observation.created_at,
            id: observation.id.clone(),
        }
    }
}

fn newest_first(a: &Observation, b: &Observation) -> Ordering {
    HistoryCursor::of(b).cmp(&HistoryCursor::of(a))
}

/// Sort newest first and keep at most `limit`.
pub(crate) fn newest(mut observations: Vec<Observation>, limit: usize) -> Vec<Observation> {
    observations.sort_by(newest_first);
    observations.truncate(limit);
    observations
}

pub(crate) fn precedes(observation: &Observation, cursor: &HistoryCursor) -> bool {
    HistoryCursor::of(observation) < *cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use carewatch_protocol::{
        ClientClock, Mood, NewObservation, RiskAssessment, Scores, SubjectId, anchor_instant,
    };
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn observation(id: &str, day: u32, second: u32) -> Observation {
        let date = NaiveDate::from_ymd_opt(2024, 6, day).expect("date");
        NewObservation {
            subject_id: SubjectId::default(),
            date,
            scores: Scores::new(3, 3, 3),
            mood: Mood::Good,
            notes: String::new(),
            client_clock: ClientClock::default(),
            observed_at: anchor_instant(date, 0),
            created_at: Utc
                .with_ymd_and_hms(2024, 7, 1, 0, 0, second)
                .single()
                .expect("ts"),
            assessment: RiskAssessment::pending(),
        }
        .into_observation(ObservationId::new(id))
    }

    #[test]
    fn date_orders_before_submission_time() {
        let backfilled = observation("a", 2, 50);
        let earlier_submitted = observation("b", 3, 10);
        let ordered = newest(vec![backfilled, earlier_submitted], 10);
        let ids: Vec<_> = ordered.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn same_day_ties_break_on_submission_time() {
        let first = observation("a", 3, 1);
        let second = observation("b", 3, 2);
        let cursor = HistoryCursor::of(&second);
        assert!(precedes(&first, &cursor));
        assert!(!precedes(&second, &cursor));
    }
}
