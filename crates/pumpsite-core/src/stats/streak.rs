//! Daily logging streaks.
//!
//! A streak counts consecutive local calendar days with at least one
//! placement, regardless of site. It is orthogonal to rotation quality.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::calendar::LocalCalendar;
use crate::placement::PlacementEvent;

fn logged_days(events: &[PlacementEvent], calendar: &LocalCalendar) -> BTreeSet<NaiveDate> {
    events
        .iter()
        .map(|event| calendar.day_of(event.timestamp))
        .collect()
}

/// Current streak as of `now`.
///
/// Zero when nothing was logged today or yesterday. Otherwise the number of
/// consecutive logged days ending at the most recent logged day. Days after
/// today are ignored.
pub fn current_streak(
    events: &[PlacementEvent],
    calendar: &LocalCalendar,
    now: DateTime<Utc>,
) -> u32 {
    let today = calendar.day_of(now);
    let days = logged_days(events, calendar);
    let Some(&most_recent) = days.range(..=today).next_back() else {
        return 0;
    };

    let yesterday = today - Duration::days(1);
    if most_recent < yesterday {
        return 0;
    }

    let mut streak = 0;
    let mut cursor = most_recent;
    while days.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

/// Longest run of consecutive logged days over the whole history.
pub fn longest_streak(events: &[PlacementEvent], calendar: &LocalCalendar) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in logged_days(events, calendar) {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}
