//! # Pumpsite Core Library
//!
//! This library provides the rotation analytics behind Pumpsite, a tracker
//! for insulin-pump infusion sites. It follows a CLI-first philosophy where
//! every operation is available through the standalone CLI binary, and any
//! other surface is a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Rotation**: site readiness, next-site recommendation and the 0-100
//!   rotation score, all pure functions of `(events, catalog, rules, now)`
//! - **Stats**: daily streaks, usage heatmap and dense trend series
//! - **Achievements**: milestone progress and idempotent "newly earned" checks
//! - **Storage**: TOML configuration and a JSON journal of placements
//!
//! ## Key Components
//!
//! - [`RotationEngine`]: facade bundling validated rules
//! - [`SiteCatalog`]: built-in and custom sites, with enable flags
//! - [`Journal`]: file-backed event store
//! - [`Config`]: application configuration management

pub mod achievements;
pub mod calendar;
pub mod engine;
pub mod error;
pub mod placement;
pub mod rotation;
pub mod site;
pub mod stats;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use achievements::{Achievement, AchievementProgress, AchievementType};
pub use calendar::LocalCalendar;
pub use engine::{RotationEngine, RotationSummary};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use placement::{PlacementEdit, PlacementEvent, TimeWindow};
pub use rotation::{Recommendation, RotationRules, RotationScore, SiteStatus};
pub use site::{BuiltinSite, CatalogRevision, CustomSite, Site, SiteCatalog, SiteRef};
pub use stats::{GroupBy, HeatmapEntry, TrendPoint};
pub use storage::{Config, EventStore, Journal, Snapshot};
