//! Site usage heatmap.
//!
//! One entry per enabled site with its placement count, intensity relative
//! to the most-used site, and share of all placements in the window.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::placement::{PlacementEvent, TimeWindow};
use crate::site::{Site, SiteCatalog, SiteRef};

/// Usage density for one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapEntry {
    pub site: Site,
    pub usage_count: u32,
    /// 0.0 to 1.0, relative to the most-used site
    pub intensity: f64,
    pub last_used: Option<DateTime<Utc>>,
    /// 0.0 to 100.0
    pub percentage_of_total: f64,
}

impl HeatmapEntry {
    /// Character for a compact text rendering.
    pub fn heat_char(&self) -> char {
        if self.usage_count == 0 {
            ' '
        } else if self.intensity <= 0.25 {
            '░'
        } else if self.intensity <= 0.5 {
            '▒'
        } else if self.intensity <= 0.75 {
            '▓'
        } else {
            '█'
        }
    }
}

/// Most and least used sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub total_placements: u32,
    pub most_used: Option<Site>,
    pub least_used: Option<Site>,
    pub unused_sites: Vec<Site>,
}

/// Build the heatmap over enabled sites, in catalog order.
pub fn heatmap(
    catalog: &SiteCatalog,
    events: &[PlacementEvent],
    window: TimeWindow,
) -> Vec<HeatmapEntry> {
    let active = catalog.active_sites();

    let mut usage: HashMap<SiteRef, (u32, Option<DateTime<Utc>>)> =
        active.iter().map(|site| (site.site_ref, (0, None))).collect();

    for event in events.iter().filter(|e| window.contains(e.timestamp)) {
        if let Some((count, last)) = usage.get_mut(&event.site) {
            *count += 1;
            *last = (*last).max(Some(event.timestamp));
        }
    }

    let total: u32 = usage.values().map(|(count, _)| count).sum();
    let max_count = usage.values().map(|(count, _)| *count).max().unwrap_or(0);

    active
        .into_iter()
        .map(|site| {
            let (usage_count, last_used) = usage[&site.site_ref];
            let intensity = if max_count == 0 {
                0.0
            } else {
                f64::from(usage_count) / f64::from(max_count)
            };
            let percentage_of_total = if total == 0 {
                0.0
            } else {
                f64::from(usage_count) / f64::from(total) * 100.0
            };

            HeatmapEntry {
                site,
                usage_count,
                intensity,
                last_used,
                percentage_of_total,
            }
        })
        .collect()
}

/// Summarize a heatmap. Ties go to the earlier site in catalog order.
pub fn usage_summary(entries: &[HeatmapEntry]) -> UsageSummary {
    let used: Vec<&HeatmapEntry> = entries.iter().filter(|e| e.usage_count > 0).collect();

    let most_used = used
        .iter()
        .copied()
        .fold(None::<&HeatmapEntry>, |best, e| match best {
            Some(b) if b.usage_count >= e.usage_count => Some(b),
            _ => Some(e),
        })
        .map(|e| e.site.clone());
    let least_used = used
        .iter()
        .copied()
        .fold(None::<&HeatmapEntry>, |best, e| match best {
            Some(b) if b.usage_count <= e.usage_count => Some(b),
            _ => Some(e),
        })
        .map(|e| e.site.clone());

    UsageSummary {
        total_placements: entries.iter().map(|e| e.usage_count).sum(),
        most_used,
        least_used,
        unused_sites: entries
            .iter()
            .filter(|e| e.usage_count == 0)
            .map(|e| e.site.clone())
            .collect(),
    }
}
