//! Placement events and history helpers.
//!
//! A `PlacementEvent` records one infusion-set placement. Events are
//! immutable: an edit yields a new effective record under the same id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::site::SiteRef;

/// One logged placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementEvent {
    pub id: Uuid,
    pub site: SiteRef,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl PlacementEvent {
    pub fn new(site: impl Into<SiteRef>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            site: site.into(),
            timestamp,
            note: None,
            profile: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Produce the edited record. The id never changes.
    pub fn edited(&self, edit: &PlacementEdit) -> Self {
        Self {
            id: self.id,
            site: edit.site.unwrap_or(self.site),
            timestamp: edit.timestamp.unwrap_or(self.timestamp),
            note: match &edit.note {
                Some(note) => note.clone(),
                None => self.note.clone(),
            },
            profile: self.profile.clone(),
        }
    }
}

/// Fields to change on an existing placement. `None` keeps the old value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementEdit {
    pub site: Option<SiteRef>,
    pub timestamp: Option<DateTime<Utc>>,
    /// `Some(None)` clears the note
    pub note: Option<Option<String>>,
}

/// Inclusive time window. An open bound means "all history" on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Window over the whole history.
    pub fn all() -> Self {
        Self::default()
    }

    /// # Errors
    /// Returns `ValidationError::InvalidTimeRange` if `end` precedes `start`.
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(ValidationError::InvalidTimeRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at <= end)
    }
}

/// Events that used `site`.
pub fn events_for<'a>(
    events: &'a [PlacementEvent],
    site: &'a SiteRef,
) -> impl Iterator<Item = &'a PlacementEvent> + 'a {
    events.iter().filter(move |event| &event.site == site)
}

/// Most recent use of `site`.
pub fn last_used(events: &[PlacementEvent], site: &SiteRef) -> Option<DateTime<Utc>> {
    events_for(events, site).map(|event| event.timestamp).max()
}

/// Events sorted oldest first; ties keep a stable order by id.
pub fn chronological(events: &[PlacementEvent]) -> Vec<&PlacementEvent> {
    let mut sorted: Vec<&PlacementEvent> = events.iter().collect();
    sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
    sorted
}
