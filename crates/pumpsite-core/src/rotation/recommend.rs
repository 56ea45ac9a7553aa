//! Next-site recommendation.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::{classify, SiteStatus};
use super::RotationRules;
use crate::error::Result;
use crate::placement::PlacementEvent;
use crate::site::{Site, SiteCatalog};

/// Why a site was recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    NeverUsed,
    LongestRest,
}

impl RecommendationReason {
    pub fn message(&self) -> &'static str {
        match self {
            RecommendationReason::NeverUsed => "Never used before",
            RecommendationReason::LongestRest => "Longest rest period among available sites",
        }
    }
}

/// The single best next site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub site: Site,
    pub status: SiteStatus,
    pub days_since_last_use: Option<u32>,
    pub reason: RecommendationReason,
}

/// Pick the next site to use.
///
/// Unused sites rank first, then ready sites by longest rest. Equal
/// candidates resolve by catalog order. Resting sites are never returned;
/// `Ok(None)` means every enabled site is resting.
///
/// # Errors
/// Returns `ConfigError::EmptyCatalog` if no site is enabled.
pub fn recommend(
    catalog: &SiteCatalog,
    events: &[PlacementEvent],
    rules: &RotationRules,
    now: DateTime<Utc>,
) -> Result<Option<Recommendation>> {
    let active = catalog.require_active()?;

    let best = active
        .into_iter()
        .enumerate()
        .filter_map(|(position, site)| {
            let status = classify(&site.site_ref, events, rules, now);
            let rank = match status {
                SiteStatus::Unused => (0u8, Reverse(u32::MAX)),
                SiteStatus::Ready { days_since_last_use } => (1, Reverse(days_since_last_use)),
                SiteStatus::Resting { .. } => return None,
            };
            Some((rank, position, site, status))
        })
        .min_by_key(|(rank, position, _, _)| (*rank, *position));

    let Some((_, _, site, status)) = best else {
        tracing::debug!("no recommendation: every enabled site is resting");
        return Ok(None);
    };

    let reason = match status {
        SiteStatus::Unused => RecommendationReason::NeverUsed,
        _ => RecommendationReason::LongestRest,
    };
    tracing::debug!(site = %site.site_ref, ?reason, "site recommended");

    Ok(Some(Recommendation {
        days_since_last_use: status.days_since_last_use(),
        site,
        status,
        reason,
    }))
}
