//! The user's local calendar.
//!
//! Rest periods and streaks are counted in calendar days (midnight to
//! midnight in the user's zone), never in elapsed hours. A placement at
//! 23:00 and one at 01:00 the next morning are one day apart; 00:30 and
//! 23:30 on the following day are also one day apart.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc, Weekday,
};

use crate::error::ConfigError;

/// Fixed-offset calendar with a start-of-week convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCalendar {
    offset: FixedOffset,
    week_start: Weekday,
}

impl Default for LocalCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl LocalCalendar {
    /// UTC calendar with weeks starting on Monday.
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
            week_start: Weekday::Mon,
        }
    }

    /// Create a calendar from a UTC offset in minutes.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if the offset is a day or more.
    pub fn new(utc_offset_minutes: i32, week_start: Weekday) -> Result<Self, ConfigError> {
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "utc_offset_minutes".into(),
                message: format!("{utc_offset_minutes} is out of range (-1439..=1439)"),
            })?;

        Ok(Self { offset, week_start })
    }

    /// Local calendar date of an instant.
    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Number of local midnights crossed going from `earlier` to `later`.
    ///
    /// Negative when `later` falls on an earlier calendar day.
    pub fn days_between(&self, earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
        (self.day_of(later) - self.day_of(earlier)).num_days()
    }

    /// The UTC instant of local midnight at the start of `date`.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let shift = Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&(local_midnight - shift))
    }

    /// First day of the week containing `date`.
    pub fn start_of_week(&self, date: NaiveDate) -> NaiveDate {
        let back = (7 + date.weekday().num_days_from_monday()
            - self.week_start.num_days_from_monday())
            % 7;
        date - Duration::days(i64::from(back))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_days_between_counts_midnights_not_hours() {
        let cal = LocalCalendar::utc();

        // 2 hours apart, different days
        assert_eq!(
            cal.days_between(at("2026-03-01T23:00:00Z"), at("2026-03-02T01:00:00Z")),
            1
        );
        // 47 hours apart, still one midnight short of two days
        assert_eq!(
            cal.days_between(at("2026-03-01T00:30:00Z"), at("2026-03-02T23:30:00Z")),
            1
        );
        assert_eq!(
            cal.days_between(at("2026-03-01T08:00:00Z"), at("2026-03-01T22:00:00Z")),
            0
        );
    }

    #[test]
    fn test_offset_moves_day_boundary() {
        // UTC+9: 2026-03-01T20:00Z is already 2026-03-02 locally
        let tokyo = LocalCalendar::new(9 * 60, Weekday::Mon).unwrap();
        assert_eq!(
            tokyo.day_of(at("2026-03-01T20:00:00Z")),
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
        assert_eq!(
            tokyo.days_between(at("2026-03-01T14:00:00Z"), at("2026-03-01T16:00:00Z")),
            1
        );
    }

    #[test]
    fn test_start_of_day_is_local_midnight() {
        let cal = LocalCalendar::new(-5 * 60, Weekday::Sun).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(cal.start_of_day(date), at("2026-03-02T05:00:00Z"));
        assert_eq!(cal.day_of(cal.start_of_day(date)), date);
    }

    #[test]
    fn test_start_of_week() {
        // 2026-03-04 is a Wednesday
        let wed = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();

        let monday_weeks = LocalCalendar::utc();
        assert_eq!(monday_weeks.start_of_week(wed), NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());

        let sunday_weeks = LocalCalendar::new(0, Weekday::Sun).unwrap();
        assert_eq!(sunday_weeks.start_of_week(wed), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());

        let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(monday_weeks.start_of_week(monday), monday);
    }

    #[test]
    fn test_rejects_out_of_range_offset() {
        assert!(matches!(
            LocalCalendar::new(24 * 60, Weekday::Mon),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
