//! Shared fixtures for unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::calendar::LocalCalendar;
use crate::placement::PlacementEvent;
use crate::rotation::RotationRules;
use crate::site::{BuiltinSite, CatalogRevision, SiteCatalog};

pub const X: BuiltinSite = BuiltinSite::AbdomenLeft;
pub const Y: BuiltinSite = BuiltinSite::ThighLeft;
pub const Z: BuiltinSite = BuiltinSite::ArmLeft;

/// Day `n` after 2026-03-01 (a Sunday), 09:00 UTC.
pub fn day(n: i64) -> DateTime<Utc> {
    day_at(n, 9, 0)
}

pub fn day_at(n: i64, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, minute, 0).unwrap() + Duration::days(n)
}

pub fn rules(minimum_rest_days: u32) -> RotationRules {
    RotationRules::new(minimum_rest_days, LocalCalendar::utc()).unwrap()
}

/// Three enabled sites: X, Y, Z in that catalog order.
pub fn xyz_catalog() -> SiteCatalog {
    SiteCatalog::new(CatalogRevision::V2).restricted_to(&[X, Y, Z])
}

pub fn placements(uses: &[(BuiltinSite, i64)]) -> Vec<PlacementEvent> {
    uses.iter()
        .map(|(site, n)| PlacementEvent::new(*site, day(*n)))
        .collect()
}
