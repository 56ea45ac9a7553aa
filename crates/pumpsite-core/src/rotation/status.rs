//! Site status classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RotationRules;
use crate::placement::{last_used, PlacementEvent};
use crate::site::{Site, SiteCatalog, SiteRef};

/// Readiness of a single site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SiteStatus {
    /// Never used
    Unused,
    /// Used within the rest period
    Resting { days_since_last_use: u32 },
    /// Rested for at least the rest period
    Ready { days_since_last_use: u32 },
}

impl SiteStatus {
    pub fn days_since_last_use(&self) -> Option<u32> {
        match self {
            SiteStatus::Unused => None,
            SiteStatus::Resting { days_since_last_use }
            | SiteStatus::Ready { days_since_last_use } => Some(*days_since_last_use),
        }
    }

    /// Whether the site may be recommended.
    pub fn is_available(&self) -> bool {
        !matches!(self, SiteStatus::Resting { .. })
    }

    /// Days left before a resting site becomes ready; 0 otherwise.
    pub fn days_until_ready(&self, minimum_rest_days: u32) -> u32 {
        match self {
            SiteStatus::Resting { days_since_last_use } => {
                minimum_rest_days.saturating_sub(*days_since_last_use)
            }
            _ => 0,
        }
    }
}

/// Status of one catalog site, for status-colored displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteStatusEntry {
    pub site: Site,
    pub status: SiteStatus,
    pub days_until_ready: u32,
}

/// Classify `site` from its most recent use.
///
/// Days are counted in local calendar days and the threshold is inclusive:
/// a site last used exactly `minimum_rest_days` days ago is `Ready`.
/// Placements dated after `now` count as used today.
pub fn classify(
    site: &SiteRef,
    events: &[PlacementEvent],
    rules: &RotationRules,
    now: DateTime<Utc>,
) -> SiteStatus {
    let Some(last) = last_used(events, site) else {
        return SiteStatus::Unused;
    };

    let days = rules.calendar().days_between(last, now).max(0);
    let days_since_last_use = u32::try_from(days).unwrap_or(u32::MAX);

    if days_since_last_use >= rules.minimum_rest_days() {
        SiteStatus::Ready { days_since_last_use }
    } else {
        SiteStatus::Resting { days_since_last_use }
    }
}

/// Status of every enabled site, in catalog order.
pub fn statuses(
    catalog: &SiteCatalog,
    events: &[PlacementEvent],
    rules: &RotationRules,
    now: DateTime<Utc>,
) -> Vec<SiteStatusEntry> {
    catalog
        .active_sites()
        .into_iter()
        .map(|site| {
            let status = classify(&site.site_ref, events, rules, now);
            SiteStatusEntry {
                days_until_ready: status.days_until_ready(rules.minimum_rest_days()),
                site,
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::BuiltinSite;
    use crate::test_support::{day, day_at, rules, xyz_catalog, X, Y, Z};

    #[test]
    fn test_unused_without_history() {
        let status = classify(&X.into(), &[], &rules(3), day(5));
        assert_eq!(status, SiteStatus::Unused);
        assert_eq!(status.days_since_last_use(), None);
        assert!(status.is_available());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let events = vec![PlacementEvent::new(X, day(0))];

        let at_boundary = classify(&X.into(), &events, &rules(3), day(3));
        assert_eq!(at_boundary, SiteStatus::Ready { days_since_last_use: 3 });

        let one_short = classify(&X.into(), &events, &rules(3), day(2));
        assert_eq!(one_short, SiteStatus::Resting { days_since_last_use: 2 });
        assert_eq!(one_short.days_until_ready(3), 1);
        assert!(!one_short.is_available());
    }

    #[test]
    fn test_uses_most_recent_placement() {
        let events = vec![
            PlacementEvent::new(X, day(4)),
            PlacementEvent::new(X, day(0)),
            PlacementEvent::new(Y, day(5)),
        ];
        let status = classify(&X.into(), &events, &rules(3), day(5));
        assert_eq!(status, SiteStatus::Resting { days_since_last_use: 1 });
    }

    #[test]
    fn test_calendar_days_not_elapsed_hours() {
        // Placed late in the evening; 26 hours later is already two days on.
        let events = vec![PlacementEvent::new(X, day_at(0, 23, 0))];
        let status = classify(&X.into(), &events, &rules(2), day_at(2, 1, 0));
        assert_eq!(status, SiteStatus::Ready { days_since_last_use: 2 });

        // Placed just after midnight; 47 hours later is still only one day on.
        let events = vec![PlacementEvent::new(X, day_at(0, 0, 30))];
        let status = classify(&X.into(), &events, &rules(2), day_at(1, 23, 30));
        assert_eq!(status, SiteStatus::Resting { days_since_last_use: 1 });
    }

    #[test]
    fn test_future_placement_counts_as_today() {
        let events = vec![PlacementEvent::new(X, day(9))];
        let status = classify(&X.into(), &events, &rules(3), day(5));
        assert_eq!(status, SiteStatus::Resting { days_since_last_use: 0 });
    }

    #[test]
    fn test_statuses_follow_catalog_order() {
        let events = vec![
            PlacementEvent::new(X, day(0)),
            PlacementEvent::new(Y, day(1)),
            PlacementEvent::new(X, day(4)),
        ];
        let board = statuses(&xyz_catalog(), &events, &rules(3), day(5));

        let refs: Vec<SiteRef> = board.iter().map(|e| e.site.site_ref).collect();
        assert_eq!(refs, vec![X.into(), Y.into(), Z.into()]);
        assert_eq!(board[0].status, SiteStatus::Resting { days_since_last_use: 1 });
        assert_eq!(board[0].days_until_ready, 2);
        assert_eq!(board[1].status, SiteStatus::Ready { days_since_last_use: 4 });
        assert_eq!(board[2].status, SiteStatus::Unused);
        assert!(!board.iter().any(|e| e.site.site_ref == BuiltinSite::LowerBack.into()));
    }
}
