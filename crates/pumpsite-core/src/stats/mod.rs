//! Usage analytics over placement history.
//!
//! This module provides the secondary views derived from placements:
//! daily logging streaks, a per-site usage heatmap, and a dense
//! time-bucketed trend series.

mod heatmap;
mod streak;
mod trend;

pub use heatmap::{heatmap, usage_summary, HeatmapEntry, UsageSummary};
pub use streak::{current_streak, longest_streak};
pub use trend::{trend, GroupBy, TrendPoint};
