//! Time-bucketed usage trend.
//!
//! The series is dense: every day (or week) between the window bounds gets
//! a point, including empty ones, so charts can rely on a contiguous run.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::LocalCalendar;
use crate::error::ValidationError;
use crate::placement::{PlacementEvent, TimeWindow};
use crate::site::SiteRef;

/// Bucket granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Day,
    Week,
}

impl GroupBy {
    fn step(self) -> Duration {
        match self {
            GroupBy::Day => Duration::days(1),
            GroupBy::Week => Duration::weeks(1),
        }
    }

    fn align(self, date: NaiveDate, calendar: &LocalCalendar) -> NaiveDate {
        match self {
            GroupBy::Day => date,
            GroupBy::Week => calendar.start_of_week(date),
        }
    }
}

/// Placement count for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Local midnight at the start of the bucket
    pub bucket_start: DateTime<Utc>,
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteRef>,
}

/// Count placements per bucket between `start` and `end` (inclusive).
///
/// Week buckets start on the calendar's first day of the week, so the first
/// bucket may begin before `start`. Only placements inside the window count.
///
/// # Errors
/// Returns `ValidationError::InvalidTimeRange` if `end` precedes `start`.
pub fn trend(
    events: &[PlacementEvent],
    group_by: GroupBy,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    site: Option<SiteRef>,
    calendar: &LocalCalendar,
) -> Result<Vec<TrendPoint>, ValidationError> {
    let window = TimeWindow::new(Some(start), Some(end))?;

    let first = group_by.align(calendar.day_of(start), calendar);
    let last = group_by.align(calendar.day_of(end), calendar);
    let step_days = group_by.step().num_days();
    let bucket_count = ((last - first).num_days() / step_days + 1) as usize;

    let mut counts = vec![0u32; bucket_count];
    for event in events
        .iter()
        .filter(|e| window.contains(e.timestamp))
        .filter(|e| site.map_or(true, |s| e.site == s))
    {
        let bucket = group_by.align(calendar.day_of(event.timestamp), calendar);
        let index = ((bucket - first).num_days() / step_days) as usize;
        if let Some(count) = counts.get_mut(index) {
            *count += 1;
        }
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| TrendPoint {
            bucket_start: calendar.start_of_day(first + group_by.step() * index as i32),
            count,
            site,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day, day_at, placements, X, Y};
    use chrono::Weekday;

    #[test]
    fn test_seven_day_window_has_seven_points() {
        let events = placements(&[(X, 1), (Y, 1), (X, 4)]);
        let points = trend(
            &events,
            GroupBy::Day,
            day_at(0, 0, 0),
            day_at(6, 23, 59),
            None,
            &LocalCalendar::utc(),
        )
        .unwrap();

        assert_eq!(points.len(), 7);
        let counts: Vec<u32> = points.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![0, 2, 0, 0, 1, 0, 0]);
        assert_eq!(points[0].bucket_start, day_at(0, 0, 0));
        assert_eq!(points[6].bucket_start, day_at(6, 0, 0));
    }

    #[test]
    fn test_empty_history_is_still_dense() {
        let points = trend(&[], GroupBy::Day, day(0), day(6), None, &LocalCalendar::utc()).unwrap();
        assert_eq!(points.len(), 7);
        assert!(points.iter().all(|p| p.count == 0));
        assert!(points
            .windows(2)
            .all(|w| w[1].bucket_start - w[0].bucket_start == Duration::days(1)));
    }

    #[test]
    fn test_site_filter() {
        let events = placements(&[(X, 1), (Y, 1), (X, 2)]);
        let points = trend(
            &events,
            GroupBy::Day,
            day(0),
            day(2),
            Some(X.into()),
            &LocalCalendar::utc(),
        )
        .unwrap();

        let counts: Vec<u32> = points.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![0, 1, 1]);
        assert!(points.iter().all(|p| p.site == Some(X.into())));
    }

    #[test]
    fn test_weeks_align_to_week_start() {
        // 2026-03-01 is a Sunday; Monday weeks start on 2026-02-23 and 2026-03-02
        let events = placements(&[(X, 0), (X, 1), (Y, 7)]);
        let points = trend(
            &events,
            GroupBy::Week,
            day(0),
            day(7),
            None,
            &LocalCalendar::utc(),
        )
        .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].bucket_start, day_at(-6, 0, 0));
        let counts: Vec<u32> = points.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![1, 2]);

        let sunday_weeks = LocalCalendar::new(0, Weekday::Sun).unwrap();
        let points = trend(&events, GroupBy::Week, day(0), day(7), None, &sunday_weeks).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].bucket_start, day_at(0, 0, 0));
        let counts: Vec<u32> = points.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![2, 1]);
    }

    #[test]
    fn test_reversed_window_is_rejected() {
        let result = trend(&[], GroupBy::Day, day(3), day(1), None, &LocalCalendar::utc());
        assert!(matches!(result, Err(ValidationError::InvalidTimeRange { .. })));
    }
}
