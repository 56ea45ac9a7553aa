//! Rotation score.
//!
//! Two halves of 50 points each:
//!
//! - **Distribution** rewards spreading placements evenly over every enabled
//!   site. It is `50 * (1 - min(cv, 1))` where `cv` is the coefficient of
//!   variation (population standard deviation over mean) of per-site counts.
//!   No placements means no credit.
//! - **Rest compliance** is the share of consecutive same-site reuses that
//!   waited at least the minimum rest period, in calendar days. With no
//!   reuse observed yet it is full credit.
//!
//! Bands: below 50 needs improvement, 50 through 75 is good, above 75 is
//! excellent.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RotationRules;
use crate::error::Result;
use crate::placement::{PlacementEvent, TimeWindow};
use crate::site::{SiteCatalog, SiteRef};

const COMPONENT_MAX: f64 = 50.0;

/// Score band used for messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    NeedsImprovement,
    Good,
    Excellent,
}

impl ScoreBand {
    pub fn from_total(total: u8) -> Self {
        match total {
            0..=49 => ScoreBand::NeedsImprovement,
            50..=75 => ScoreBand::Good,
            _ => ScoreBand::Excellent,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            ScoreBand::NeedsImprovement => "Your site rotation needs improvement.",
            ScoreBand::Good => "Good rotation, with some room to improve.",
            ScoreBand::Excellent => "Excellent rotation! Your sites are getting the rest they need.",
        }
    }
}

/// Composite 0-100 rotation score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationScore {
    pub total: u8,
    /// 0.0 to 50.0
    pub distribution: f64,
    /// 0.0 to 50.0
    pub rest_compliance: f64,
    pub band: ScoreBand,
    pub explanation: String,
}

/// Two consecutive uses of the same site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReusePair {
    pub site: SiteRef,
    pub previous: DateTime<Utc>,
    pub next: DateTime<Utc>,
    pub elapsed_days: i64,
    pub compliant: bool,
}

/// Distribution half of the score from per-site counts.
pub fn distribution_component(counts: &[u32]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }

    let n = counts.len() as f64;
    let total: f64 = counts.iter().map(|&c| f64::from(c)).sum();
    let mean = total / n;
    if mean == 0.0 {
        return 0.0;
    }

    let variance = counts
        .iter()
        .map(|&c| (f64::from(c) - mean).powi(2))
        .sum::<f64>()
        / n;
    let cv = variance.sqrt() / mean;

    COMPONENT_MAX * (1.0 - cv.min(1.0)).max(0.0)
}

/// Rest-compliance half of the score.
pub fn rest_compliance_component(pairs: &[ReusePair]) -> f64 {
    if pairs.is_empty() {
        return COMPONENT_MAX;
    }
    let compliant = pairs.iter().filter(|p| p.compliant).count() as f64;
    COMPONENT_MAX * compliant / pairs.len() as f64
}

/// Consecutive same-site uses, ordered by the later use.
pub fn reuse_pairs<'a>(
    events: impl IntoIterator<Item = &'a PlacementEvent>,
    rules: &RotationRules,
) -> Vec<ReusePair> {
    let mut ordered: Vec<&PlacementEvent> = events.into_iter().collect();
    ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

    let mut last_seen: HashMap<SiteRef, DateTime<Utc>> = HashMap::new();
    let mut pairs = Vec::new();

    for event in ordered {
        if let Some(previous) = last_seen.insert(event.site, event.timestamp) {
            let elapsed_days = rules.calendar().days_between(previous, event.timestamp);
            pairs.push(ReusePair {
                site: event.site,
                previous,
                next: event.timestamp,
                elapsed_days,
                compliant: elapsed_days >= i64::from(rules.minimum_rest_days()),
            });
        }
    }

    pairs
}

/// Score how well placements are rotated over the enabled sites.
///
/// Only placements on enabled sites inside `window` count.
///
/// # Errors
/// Returns `ConfigError::EmptyCatalog` if no site is enabled.
pub fn score(
    catalog: &SiteCatalog,
    events: &[PlacementEvent],
    rules: &RotationRules,
    window: TimeWindow,
) -> Result<RotationScore> {
    let active = catalog.require_active()?;

    let mut counts: HashMap<SiteRef, u32> =
        active.iter().map(|site| (site.site_ref, 0)).collect();
    let mut scored = Vec::new();
    for event in events.iter().filter(|e| window.contains(e.timestamp)) {
        if let Some(count) = counts.get_mut(&event.site) {
            *count += 1;
            scored.push(event);
        }
    }

    let ordered_counts: Vec<u32> = active.iter().map(|site| counts[&site.site_ref]).collect();
    let distribution = distribution_component(&ordered_counts);
    let pairs = reuse_pairs(scored, rules);
    let rest_compliance = rest_compliance_component(&pairs);

    let total = (distribution + rest_compliance).round().clamp(0.0, 100.0) as u8;
    let band = ScoreBand::from_total(total);
    let explanation = explain(band, distribution, rest_compliance, rules.minimum_rest_days());

    tracing::debug!(
        total,
        distribution,
        rest_compliance,
        reuse_pairs = pairs.len(),
        "rotation scored"
    );

    Ok(RotationScore {
        total,
        distribution,
        rest_compliance,
        band,
        explanation,
    })
}

fn explain(band: ScoreBand, distribution: f64, rest_compliance: f64, rest_days: u32) -> String {
    let hint = if band == ScoreBand::Excellent || (distribution - rest_compliance).abs() < 1e-9 {
        None
    } else if distribution < rest_compliance {
        Some("Spread placements more evenly across all of your sites.".to_string())
    } else {
        Some(format!(
            "Let each site rest at least {rest_days} days before using it again."
        ))
    };

    match hint {
        Some(hint) => format!("{} {hint}", band.headline()),
        None => band.headline().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{BuiltinSite, CatalogRevision};
    use crate::test_support::{day, placements, rules, xyz_catalog, X, Y, Z};
    use proptest::prelude::*;

    #[test]
    fn test_single_site_daily_reuse() {
        let catalog = SiteCatalog::new(CatalogRevision::V2).restricted_to(&[X]);
        let events = placements(&[(X, 0), (X, 1), (X, 2), (X, 3)]);

        let result = score(&catalog, &events, &rules(3), TimeWindow::all()).unwrap();
        assert_eq!(result.distribution, 50.0);
        assert_eq!(result.rest_compliance, 0.0);
        assert_eq!(result.total, 50);
        assert_eq!(result.band, ScoreBand::Good);
    }

    #[test]
    fn test_no_history_scores_fifty() {
        let result = score(&xyz_catalog(), &[], &rules(3), TimeWindow::all()).unwrap();
        assert_eq!(result.distribution, 0.0);
        assert_eq!(result.rest_compliance, 50.0);
        assert_eq!(result.total, 50);
    }

    #[test]
    fn test_perfect_rotation_is_excellent() {
        let events = placements(&[(X, 0), (Y, 3), (Z, 6), (X, 9), (Y, 12), (Z, 15)]);
        let result = score(&xyz_catalog(), &events, &rules(3), TimeWindow::all()).unwrap();

        assert_eq!(result.distribution, 50.0);
        assert_eq!(result.rest_compliance, 50.0);
        assert_eq!(result.total, 100);
        assert_eq!(result.band, ScoreBand::Excellent);
        assert!(result.explanation.starts_with("Excellent"));
    }

    #[test]
    fn test_concentrated_usage_loses_distribution() {
        // counts [4, 0, 0]: mean 4/3, stddev 1.886, cv 1.41 -> no credit
        let events = placements(&[(X, 0), (X, 5), (X, 10), (X, 15)]);
        let result = score(&xyz_catalog(), &events, &rules(3), TimeWindow::all()).unwrap();

        assert_eq!(result.distribution, 0.0);
        assert_eq!(result.rest_compliance, 50.0);
        assert!(result.explanation.contains("Spread placements"));
    }

    #[test]
    fn test_partial_distribution_value() {
        // counts [2, 1, 1]: mean 4/3, stddev sqrt(2/9), cv = 0.3536
        let d = distribution_component(&[2, 1, 1]);
        let expected = 50.0 * (1.0 - (2.0f64 / 9.0).sqrt() / (4.0 / 3.0));
        assert!((d - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rest_compliance_uses_calendar_days() {
        // X reused after 3 days (ok), then after 1 day (violation)
        let events = placements(&[(X, 0), (X, 3), (X, 4), (Y, 1), (Z, 2)]);
        let pairs = reuse_pairs(&events, &rules(3));

        assert_eq!(pairs.len(), 2);
        assert!(pairs[0].compliant);
        assert_eq!(pairs[0].elapsed_days, 3);
        assert!(!pairs[1].compliant);
        assert_eq!(rest_compliance_component(&pairs), 25.0);
    }

    #[test]
    fn test_window_restricts_events() {
        let events = placements(&[(X, 0), (X, 1), (Y, 10), (Z, 11)]);
        let window = TimeWindow::new(Some(day(5)), Some(day(20))).unwrap();
        let result = score(&xyz_catalog(), &events, &rules(3), window).unwrap();

        // Inside the window: Y and Z once each, X never
        assert_eq!(result.rest_compliance, 50.0);
        assert!(result.distribution < 50.0);
    }

    #[test]
    fn test_disabled_sites_are_ignored() {
        let events = placements(&[(X, 0), (Y, 3), (Z, 6), (BuiltinSite::LowerBack, 7)]);
        let result = score(&xyz_catalog(), &events, &rules(3), TimeWindow::all()).unwrap();
        assert_eq!(result.distribution, 50.0);
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(ScoreBand::from_total(0), ScoreBand::NeedsImprovement);
        assert_eq!(ScoreBand::from_total(49), ScoreBand::NeedsImprovement);
        assert_eq!(ScoreBand::from_total(50), ScoreBand::Good);
        assert_eq!(ScoreBand::from_total(75), ScoreBand::Good);
        assert_eq!(ScoreBand::from_total(76), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_total(100), ScoreBand::Excellent);
    }

    #[test]
    fn test_perfect_distribution_for_equal_counts() {
        for k in 1..6 {
            assert_eq!(distribution_component(&[k; 9]), 50.0);
        }
    }

    proptest! {
        #[test]
        fn prop_components_stay_in_bounds(
            history in prop::collection::vec((0usize..9, 0i64..90), 0..60),
            rest in 1u32..30,
        ) {
            let catalog = SiteCatalog::new(CatalogRevision::V2);
            let events: Vec<PlacementEvent> = history
                .iter()
                .map(|(site, n)| PlacementEvent::new(BuiltinSite::ALL[*site], day(*n)))
                .collect();

            let result = score(&catalog, &events, &rules(rest), TimeWindow::all()).unwrap();
            prop_assert!((0.0..=50.0).contains(&result.distribution));
            prop_assert!((0.0..=50.0).contains(&result.rest_compliance));
            prop_assert!(result.total <= 100);
        }
    }
}
