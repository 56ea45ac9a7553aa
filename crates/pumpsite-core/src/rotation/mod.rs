//! Rotation analytics: site readiness, next-site recommendation and the
//! rotation score.
//!
//! Everything here is a pure function of `(events, catalog, rules, now)`.
//! Nothing is cached; callers that want memoization key it on their own
//! event/catalog version stamps.

mod recommend;
mod score;
mod status;

pub use recommend::{recommend, Recommendation, RecommendationReason};
pub use score::{
    distribution_component, rest_compliance_component, reuse_pairs, score, ReusePair,
    RotationScore, ScoreBand,
};
pub use status::{classify, statuses, SiteStatus, SiteStatusEntry};

use crate::calendar::LocalCalendar;
use crate::error::ConfigError;

/// Validated evaluation parameters passed into every engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationRules {
    minimum_rest_days: u32,
    calendar: LocalCalendar,
}

impl RotationRules {
    /// # Errors
    /// Returns `ConfigError::InvalidRestDays` when `minimum_rest_days` is 0.
    pub fn new(minimum_rest_days: u32, calendar: LocalCalendar) -> Result<Self, ConfigError> {
        if minimum_rest_days < 1 {
            return Err(ConfigError::InvalidRestDays(minimum_rest_days));
        }
        Ok(Self {
            minimum_rest_days,
            calendar,
        })
    }

    pub fn minimum_rest_days(&self) -> u32 {
        self.minimum_rest_days
    }

    pub fn calendar(&self) -> &LocalCalendar {
        &self.calendar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_reject_zero_rest_days() {
        assert_eq!(
            RotationRules::new(0, LocalCalendar::utc()),
            Err(ConfigError::InvalidRestDays(0))
        );
        assert_eq!(RotationRules::new(1, LocalCalendar::utc()).unwrap().minimum_rest_days(), 1);
    }
}
