//! Rotation engine facade.
//!
//! [`RotationEngine`] holds validated [`RotationRules`] so the recommendation
//! and scoring paths always agree on the rest period and calendar. Every
//! call takes the events, catalog and `now` explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::{evaluate_all, newly_earned, Achievement, AchievementProgress};
use crate::error::Result;
use crate::placement::{PlacementEvent, TimeWindow};
use crate::rotation::{self, Recommendation, RotationRules, RotationScore, SiteStatusEntry};
use crate::site::{SiteCatalog, SiteRef};
use crate::stats::{self, GroupBy, HeatmapEntry, TrendPoint, UsageSummary};

/// Everything a home-screen view needs in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationSummary {
    pub evaluated_at: DateTime<Utc>,
    pub minimum_rest_days: u32,
    pub statuses: Vec<SiteStatusEntry>,
    pub recommendation: Option<Recommendation>,
    pub score: RotationScore,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub usage: UsageSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationEngine {
    rules: RotationRules,
}

impl RotationEngine {
    pub fn new(rules: RotationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RotationRules {
        &self.rules
    }

    pub fn statuses(
        &self,
        catalog: &SiteCatalog,
        events: &[PlacementEvent],
        now: DateTime<Utc>,
    ) -> Vec<SiteStatusEntry> {
        rotation::statuses(catalog, events, &self.rules, now)
    }

    /// # Errors
    /// Returns `ConfigError::EmptyCatalog` if no site is enabled.
    pub fn recommend(
        &self,
        catalog: &SiteCatalog,
        events: &[PlacementEvent],
        now: DateTime<Utc>,
    ) -> Result<Option<Recommendation>> {
        rotation::recommend(catalog, events, &self.rules, now)
    }

    /// # Errors
    /// Returns `ConfigError::EmptyCatalog` if no site is enabled.
    pub fn score(
        &self,
        catalog: &SiteCatalog,
        events: &[PlacementEvent],
        window: TimeWindow,
    ) -> Result<RotationScore> {
        rotation::score(catalog, events, &self.rules, window)
    }

    pub fn current_streak(&self, events: &[PlacementEvent], now: DateTime<Utc>) -> u32 {
        stats::current_streak(events, self.rules.calendar(), now)
    }

    pub fn longest_streak(&self, events: &[PlacementEvent]) -> u32 {
        stats::longest_streak(events, self.rules.calendar())
    }

    pub fn heatmap(
        &self,
        catalog: &SiteCatalog,
        events: &[PlacementEvent],
        window: TimeWindow,
    ) -> Vec<HeatmapEntry> {
        stats::heatmap(catalog, events, window)
    }

    /// # Errors
    /// Returns `ValidationError::InvalidTimeRange` if `end` precedes `start`.
    pub fn trend(
        &self,
        events: &[PlacementEvent],
        group_by: GroupBy,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        site: Option<SiteRef>,
    ) -> Result<Vec<TrendPoint>> {
        Ok(stats::trend(
            events,
            group_by,
            start,
            end,
            site,
            self.rules.calendar(),
        )?)
    }

    pub fn achievements(
        &self,
        catalog: &SiteCatalog,
        events: &[PlacementEvent],
        now: DateTime<Utc>,
    ) -> Vec<AchievementProgress> {
        evaluate_all(events, catalog, &self.rules, now)
    }

    /// Achievements that just reached completion and are not in `earned`.
    pub fn newly_earned(
        &self,
        catalog: &SiteCatalog,
        events: &[PlacementEvent],
        earned: &[Achievement],
        now: DateTime<Utc>,
    ) -> Vec<Achievement> {
        let progress = self.achievements(catalog, events, now);
        newly_earned(&progress, earned, now)
    }

    /// Statuses, recommendation, all-time score and streaks as of `now`.
    ///
    /// # Errors
    /// Returns `ConfigError::EmptyCatalog` if no site is enabled.
    pub fn summary(
        &self,
        catalog: &SiteCatalog,
        events: &[PlacementEvent],
        now: DateTime<Utc>,
    ) -> Result<RotationSummary> {
        let recommendation = self.recommend(catalog, events, now)?;
        let score = self.score(catalog, events, TimeWindow::all())?;
        let usage = stats::usage_summary(&self.heatmap(catalog, events, TimeWindow::all()));

        tracing::debug!(
            events = events.len(),
            score = score.total,
            recommended = recommendation.is_some(),
            "rotation summary computed"
        );

        Ok(RotationSummary {
            evaluated_at: now,
            minimum_rest_days: self.rules.minimum_rest_days(),
            statuses: self.statuses(catalog, events, now),
            recommendation,
            score,
            current_streak: self.current_streak(events, now),
            longest_streak: self.longest_streak(events),
            usage,
        })
    }
}
