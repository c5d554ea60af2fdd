//! Calendar-date anchoring.
//!
//! Observation dates are pure calendar dates. Whenever an absolute instant is
//! needed, the date is pinned to local noon in the client's offset so that a
//! round trip through UTC can never land on a neighbouring day.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Local hour used to anchor calendar dates.
pub const ANCHOR_HOUR: u32 = 12;
/// Westernmost UTC offset in use (UTC-12:00).
pub const MIN_UTC_OFFSET_MINUTES: i32 = -12 * 60;
/// Easternmost UTC offset in use (UTC+14:00).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Client-reported clock metadata captured at submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ClientClock {
    /// IANA zone name reported by the browser (e.g. `Europe/Berlin`).
    #[serde(default)]
    pub timezone: Option<String>,
    /// Offset from UTC in minutes, positive east of Greenwich.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    /// The client's own calendar date at submission time.
    #[serde(default)]
    pub local_date: Option<NaiveDate>,
}

impl ClientClock {
    /// Offset to anchor with; UTC when the client did not report one.
    pub fn offset_minutes(&self) -> i32 {
        self.utc_offset_minutes
            .unwrap_or(0)
            .clamp(MIN_UTC_OFFSET_MINUTES, MAX_UTC_OFFSET_MINUTES)
    }
}

/// Instant of local noon on `date` for a client at `offset_minutes`.
pub fn anchor_instant(date: NaiveDate, offset_minutes: i32) -> DateTime<Utc> {
    let noon = NaiveTime::from_hms_opt(ANCHOR_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    let local = date.and_time(noon);
    Utc.from_utc_datetime(&(local - Duration::minutes(i64::from(offset_minutes))))
}

/// Calendar date of `instant` as seen by a client at `offset_minutes`.
pub fn anchored_date(instant: DateTime<Utc>, offset_minutes: i32) -> NaiveDate {
    (instant.naive_utc() + Duration::minutes(i64::from(offset_minutes))).date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use pretty_assertions::assert_eq;

    #[test]
    fn anchored_dates_survive_every_offset() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).expect("date");
        for offset in (MIN_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).step_by(15) {
            let instant = anchor_instant(date, offset);
            assert_eq!(anchored_date(instant, offset), date, "offset {offset}");
        }
    }

    #[test]
    fn utc_view_keeps_the_date_within_twelve_hours() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).expect("date");
        for offset in (-11 * 60..=11 * 60).step_by(30) {
            let instant = anchor_instant(date, offset);
            assert_eq!(anchored_date(instant, 0), date, "offset {offset}");
        }
    }

    #[test]
    fn anchor_is_local_noon() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).expect("date");
        let instant = anchor_instant(date, 120);
        assert_eq!(instant.hour(), 10);
    }

    #[test]
    fn offset_is_clamped() {
        let clock = ClientClock {
            utc_offset_minutes: Some(20 * 60),
            ..ClientClock::default()
        };
        assert_eq!(clock.offset_minutes(), MAX_UTC_OFFSET_MINUTES);
        assert_eq!(ClientClock::default().offset_minutes(), 0);
    }
}
