//! Achievement progress.
//!
//! Each achievement type measures one metric against a target; progress is
//! `min(1, current / target)`. Evaluation is read-only. Persisting an earned
//! achievement is left to the caller, which should go through
//! [`newly_earned`] so a type is only ever recorded once.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::placement::{chronological, PlacementEvent};
use crate::rotation::{reuse_pairs, RotationRules};
use crate::site::{SiteCatalog, SiteRef};
use crate::stats::current_streak;

/// Milestones a user can earn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementType {
    FirstPlacement,
    GettingStarted,
    Dedicated,
    Century,
    Explorer,
    FullCircle,
    WeekStreak,
    MonthStreak,
    RotationPro,
    RotationMaster,
    RestRespecter,
}

/// What an achievement counts, with its target where fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementMetric {
    /// Total placements logged
    TotalPlacements(u32),
    /// Distinct sites ever used
    DistinctSites(u32),
    /// Every enabled site used at least once
    AllActiveSites,
    /// Current daily streak
    Streak(u32),
    /// Most recent placements with no site repeated
    DistinctRun(u32),
    /// Compliant pairs among the most recent N reuse pairs
    RestCompliance(u32),
}

impl AchievementType {
    pub const ALL: [AchievementType; 11] = [
        AchievementType::FirstPlacement,
        AchievementType::GettingStarted,
        AchievementType::Dedicated,
        AchievementType::Century,
        AchievementType::Explorer,
        AchievementType::FullCircle,
        AchievementType::WeekStreak,
        AchievementType::MonthStreak,
        AchievementType::RotationPro,
        AchievementType::RotationMaster,
        AchievementType::RestRespecter,
    ];

    pub fn metric(&self) -> AchievementMetric {
        match self {
            AchievementType::FirstPlacement => AchievementMetric::TotalPlacements(1),
            AchievementType::GettingStarted => AchievementMetric::TotalPlacements(10),
            AchievementType::Dedicated => AchievementMetric::TotalPlacements(50),
            AchievementType::Century => AchievementMetric::TotalPlacements(100),
            AchievementType::Explorer => AchievementMetric::DistinctSites(5),
            AchievementType::FullCircle => AchievementMetric::AllActiveSites,
            AchievementType::WeekStreak => AchievementMetric::Streak(7),
            AchievementType::MonthStreak => AchievementMetric::Streak(30),
            AchievementType::RotationPro => AchievementMetric::DistinctRun(5),
            AchievementType::RotationMaster => AchievementMetric::DistinctRun(8),
            AchievementType::RestRespecter => AchievementMetric::RestCompliance(10),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AchievementType::FirstPlacement => "First Placement",
            AchievementType::GettingStarted => "Getting Started",
            AchievementType::Dedicated => "Dedicated",
            AchievementType::Century => "Century",
            AchievementType::Explorer => "Explorer",
            AchievementType::FullCircle => "Full Circle",
            AchievementType::WeekStreak => "Week Streak",
            AchievementType::MonthStreak => "Month Streak",
            AchievementType::RotationPro => "Rotation Pro",
            AchievementType::RotationMaster => "Rotation Master",
            AchievementType::RestRespecter => "Rest Respecter",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementType::FirstPlacement => "Log your first placement",
            AchievementType::GettingStarted => "Log 10 placements",
            AchievementType::Dedicated => "Log 50 placements",
            AchievementType::Century => "Log 100 placements",
            AchievementType::Explorer => "Use 5 different sites",
            AchievementType::FullCircle => "Use every enabled site at least once",
            AchievementType::WeekStreak => "Log a placement 7 days in a row",
            AchievementType::MonthStreak => "Log a placement 30 days in a row",
            AchievementType::RotationPro => "Use 5 different sites in a row",
            AchievementType::RotationMaster => "Use 8 different sites in a row",
            AchievementType::RestRespecter => "Respect the rest period on 10 site reuses",
        }
    }
}

/// Progress toward one achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementProgress {
    #[serde(rename = "type")]
    pub kind: AchievementType,
    /// 0.0 to 1.0
    pub progress: f64,
    pub current: u32,
    pub target: u32,
}

impl AchievementProgress {
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}

/// An earned achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AchievementType,
    pub earned_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Achievement {
    pub fn new(kind: AchievementType, earned_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            earned_at,
            metadata: None,
        }
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Length of the trailing run of placements with no repeated site.
fn distinct_run(events: &[PlacementEvent]) -> u32 {
    let mut seen: HashSet<SiteRef> = HashSet::new();
    let run = chronological(events)
        .into_iter()
        .rev()
        .take_while(|event| seen.insert(event.site))
        .count();
    count(run)
}

/// Progress toward `kind` as of `now`. Placements after `now` are ignored.
///
/// With no history every metric is zero; this never fails.
pub fn progress(
    kind: AchievementType,
    events: &[PlacementEvent],
    catalog: &SiteCatalog,
    rules: &RotationRules,
    now: DateTime<Utc>,
) -> AchievementProgress {
    let history: Vec<PlacementEvent> = events
        .iter()
        .filter(|event| event.timestamp <= now)
        .cloned()
        .collect();

    let (current, target) = match kind.metric() {
        AchievementMetric::TotalPlacements(target) => (count(history.len()), target),
        AchievementMetric::DistinctSites(target) => {
            let distinct: HashSet<SiteRef> = history.iter().map(|event| event.site).collect();
            (count(distinct.len()), target)
        }
        AchievementMetric::AllActiveSites => {
            let active = catalog.active_sites();
            let used = active
                .iter()
                .filter(|site| history.iter().any(|event| event.site == site.site_ref))
                .count();
            (count(used), count(active.len()))
        }
        AchievementMetric::Streak(target) => {
            (current_streak(&history, rules.calendar(), now), target)
        }
        AchievementMetric::DistinctRun(target) => (distinct_run(&history), target),
        AchievementMetric::RestCompliance(target) => {
            let pairs = reuse_pairs(&history, rules);
            let compliant = pairs
                .iter()
                .rev()
                .take(target as usize)
                .filter(|pair| pair.compliant)
                .count();
            (count(compliant), target)
        }
    };

    let progress = if target == 0 {
        0.0
    } else {
        (f64::from(current) / f64::from(target)).min(1.0)
    };

    AchievementProgress {
        kind,
        progress,
        current,
        target,
    }
}

/// Progress for every achievement type, in [`AchievementType::ALL`] order.
pub fn evaluate_all(
    events: &[PlacementEvent],
    catalog: &SiteCatalog,
    rules: &RotationRules,
    now: DateTime<Utc>,
) -> Vec<AchievementProgress> {
    AchievementType::ALL
        .iter()
        .map(|kind| progress(*kind, events, catalog, rules, now))
        .collect()
}

/// Achievements to record: complete, and not already earned.
pub fn newly_earned(
    progress: &[AchievementProgress],
    earned: &[Achievement],
    now: DateTime<Utc>,
) -> Vec<Achievement> {
    let already: HashSet<AchievementType> = earned.iter().map(|a| a.kind).collect();

    progress
        .iter()
        .filter(|p| p.is_complete() && !already.contains(&p.kind))
        .map(|p| {
            let mut achievement = Achievement::new(p.kind, now);
            achievement.metadata = Some(serde_json::json!({
                "current": p.current,
                "target": p.target,
            }));
            achievement
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{BuiltinSite, CatalogRevision};
    use crate::test_support::{day, placements, rules, xyz_catalog, X, Y, Z};

    fn progress_of(
        kind: AchievementType,
        events: &[PlacementEvent],
        now: DateTime<Utc>,
    ) -> AchievementProgress {
        progress(kind, events, &xyz_catalog(), &rules(3), now)
    }

    #[test]
    fn test_no_history_is_zero_everywhere() {
        for entry in evaluate_all(&[], &xyz_catalog(), &rules(3), day(0)) {
            assert_eq!(entry.progress, 0.0, "{:?}", entry.kind);
            assert_eq!(entry.current, 0);
        }
    }

    #[test]
    fn test_cumulative_count() {
        let events = placements(&[(X, 0), (Y, 1), (Z, 2), (X, 3), (Y, 4)]);

        let first = progress_of(AchievementType::FirstPlacement, &events, day(4));
        assert!(first.is_complete());

        let started = progress_of(AchievementType::GettingStarted, &events, day(4));
        assert_eq!(started.current, 5);
        assert_eq!(started.target, 10);
        assert_eq!(started.progress, 0.5);
    }

    #[test]
    fn test_future_placements_are_ignored() {
        let events = placements(&[(X, 0), (Y, 5)]);
        let started = progress_of(AchievementType::GettingStarted, &events, day(2));
        assert_eq!(started.current, 1);
    }

    #[test]
    fn test_distinct_sites_and_full_circle() {
        let events = placements(&[(X, 0), (Y, 1), (X, 2), (BuiltinSite::LowerBack, 3)]);

        let explorer = progress_of(AchievementType::Explorer, &events, day(3));
        assert_eq!(explorer.current, 3);
        assert_eq!(explorer.progress, 0.6);

        // LowerBack is not enabled in the XYZ catalog
        let circle = progress_of(AchievementType::FullCircle, &events, day(3));
        assert_eq!(circle.current, 2);
        assert_eq!(circle.target, 3);
    }

    #[test]
    fn test_full_circle_on_empty_catalog_is_zero() {
        let catalog = SiteCatalog::new(CatalogRevision::V1).restricted_to(&[]);
        let events = placements(&[(X, 0)]);
        let circle = progress(AchievementType::FullCircle, &events, &catalog, &rules(3), day(0));
        assert_eq!(circle.progress, 0.0);
    }

    #[test]
    fn test_streak_threshold() {
        let events: Vec<PlacementEvent> = (0..7)
            .map(|n| PlacementEvent::new([X, Y, Z][n as usize % 3], day(n)))
            .collect();

        assert!(progress_of(AchievementType::WeekStreak, &events, day(6)).is_complete());
        // Two days later the streak is broken
        assert_eq!(
            progress_of(AchievementType::WeekStreak, &events, day(8)).current,
            0
        );
    }

    #[test]
    fn test_distinct_run_stops_at_first_repeat() {
        // Walking back: Z, X, Y, then X repeats
        let events = placements(&[(X, 0), (Y, 1), (X, 2), (Z, 3)]);
        let pro = progress_of(AchievementType::RotationPro, &events, day(3));
        assert_eq!(pro.current, 3);
        assert_eq!(pro.progress, 0.6);
    }

    #[test]
    fn test_distinct_run_over_full_catalog() {
        let catalog = SiteCatalog::new(CatalogRevision::V2);
        let events: Vec<PlacementEvent> = BuiltinSite::ALL
            .iter()
            .enumerate()
            .map(|(n, site)| PlacementEvent::new(*site, day(n as i64)))
            .collect();

        let master = progress(AchievementType::RotationMaster, &events, &catalog, &rules(3), day(9));
        assert!(master.is_complete());
        assert_eq!(master.current, 9);
    }

    #[test]
    fn test_rest_compliance_over_recent_pairs() {
        // Rotating X, Y, Z daily reuses each site after 3 days: 10 compliant pairs
        let events: Vec<PlacementEvent> = (0..13)
            .map(|n| PlacementEvent::new([X, Y, Z][n as usize % 3], day(n)))
            .collect();
        let respecter = progress_of(AchievementType::RestRespecter, &events, day(12));
        assert!(respecter.is_complete());

        // One early violation followed by 10 compliant pairs still counts as complete
        let mut with_violation = placements(&[(X, -5), (X, -4)]);
        with_violation.extend(events.iter().cloned());
        let respecter = progress_of(AchievementType::RestRespecter, &with_violation, day(12));
        assert!(respecter.is_complete());

        // Only the last 10 pairs count; a recent violation drops progress
        let mut recent_violation = events.clone();
        recent_violation.push(PlacementEvent::new(Z, day(13)));
        let respecter = progress_of(AchievementType::RestRespecter, &recent_violation, day(13));
        assert_eq!(respecter.current, 9);
        assert_eq!(respecter.progress, 0.9);
    }

    #[test]
    fn test_newly_earned_is_idempotent() {
        let events = placements(&[(X, 0)]);
        let all = evaluate_all(&events, &xyz_catalog(), &rules(3), day(0));

        let earned = newly_earned(&all, &[], day(0));
        assert_eq!(earned.len(), 1);
        assert_eq!(earned[0].kind, AchievementType::FirstPlacement);
        assert_eq!(earned[0].metadata.as_ref().unwrap()["target"], 1);

        assert!(newly_earned(&all, &earned, day(1)).is_empty());
    }

    #[test]
    fn test_serialized_type_field() {
        let achievement = Achievement::new(AchievementType::WeekStreak, day(0));
        let json = serde_json::to_value(&achievement).unwrap();
        assert_eq!(json["type"], "week_streak");
        assert!(json.get("metadata").is_none());
    }
}
