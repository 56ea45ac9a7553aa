//! JSON journal: the file-backed event store used by the CLI.
//!
//! Holds placement events, custom sites, disabled built-in sites and earned
//! achievements in a single `journal.json`. The engine never touches the
//! journal; callers take one [`Snapshot`] and evaluate against it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::data_dir;
use crate::achievements::Achievement;
use crate::error::{Result, StorageError, ValidationError};
use crate::placement::{PlacementEdit, PlacementEvent};
use crate::site::{BuiltinSite, CatalogRevision, CustomSite, SiteCatalog, SiteRef};

/// A single consistent read of everything the engine consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub events: Vec<PlacementEvent>,
    pub catalog: SiteCatalog,
    pub achievements: Vec<Achievement>,
}

/// Source of event/catalog snapshots.
pub trait EventStore {
    /// Read events and catalog atomically.
    fn snapshot(&self) -> Result<Snapshot>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct JournalData {
    #[serde(default)]
    events: Vec<PlacementEvent>,
    #[serde(default)]
    disabled_builtins: Vec<BuiltinSite>,
    #[serde(default)]
    custom_sites: Vec<CustomSite>,
    #[serde(default)]
    achievements: Vec<Achievement>,
}

/// File-backed journal. Mutations are in memory until [`Journal::save`].
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
    revision: CatalogRevision,
    data: JournalData,
}

impl Journal {
    /// Open `journal.json` in the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the file is corrupt.
    pub fn open(revision: CatalogRevision) -> Result<Self> {
        Self::open_at(data_dir()?.join("journal.json"), revision)
    }

    /// Open a journal at an explicit path. A missing file is an empty journal.
    ///
    /// # Errors
    /// Returns `StorageError` if the file cannot be read or decoded.
    pub fn open_at(path: impl Into<PathBuf>, revision: CatalogRevision) -> Result<Self> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
                path: path.clone(),
                message: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => JournalData::default(),
            Err(source) => return Err(StorageError::ReadFailed { path, source }.into()),
        };

        Ok(Self {
            path,
            revision,
            data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn events(&self) -> &[PlacementEvent] {
        &self.data.events
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.data.achievements
    }

    pub fn catalog(&self) -> SiteCatalog {
        SiteCatalog {
            revision: self.revision,
            disabled_builtins: self.data.disabled_builtins.clone(),
            custom_sites: self.data.custom_sites.clone(),
        }
    }

    fn require_known(&self, site: &SiteRef) -> Result<()> {
        if self.catalog().resolve(site).is_none() {
            return Err(ValidationError::UnknownSite(site.to_string()).into());
        }
        Ok(())
    }

    /// Record a new placement.
    ///
    /// # Errors
    /// Returns `ValidationError::UnknownSite` if the site is not in the catalog.
    pub fn log_placement(
        &mut self,
        site: SiteRef,
        at: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<PlacementEvent> {
        self.require_known(&site)?;

        let mut event = PlacementEvent::new(site, at);
        event.note = note;
        tracing::info!(id = %event.id, site = %site, at = %at, "placement logged");
        self.data.events.push(event.clone());
        Ok(event)
    }

    /// Replace the effective fields of a placement, keeping its id.
    ///
    /// # Errors
    /// Returns `ValidationError` if the id or the new site is unknown.
    pub fn edit_placement(&mut self, id: Uuid, edit: &PlacementEdit) -> Result<PlacementEvent> {
        if let Some(site) = &edit.site {
            self.require_known(site)?;
        }

        let slot = self
            .data
            .events
            .iter_mut()
            .find(|event| event.id == id)
            .ok_or(ValidationError::PlacementNotFound(id))?;
        *slot = slot.edited(edit);
        tracing::info!(id = %id, "placement edited");
        Ok(slot.clone())
    }

    /// # Errors
    /// Returns `ValidationError::PlacementNotFound` for an unknown id.
    pub fn delete_placement(&mut self, id: Uuid) -> Result<PlacementEvent> {
        let index = self
            .data
            .events
            .iter()
            .position(|event| event.id == id)
            .ok_or(ValidationError::PlacementNotFound(id))?;
        tracing::info!(id = %id, "placement deleted");
        Ok(self.data.events.remove(index))
    }

    /// Create a custom site.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidValue` for an empty name or one that
    /// collides with an existing site.
    pub fn add_custom_site(&mut self, name: &str, now: DateTime<Utc>) -> Result<CustomSite> {
        let name = name.trim();
        let invalid = |message: &str| ValidationError::InvalidValue {
            field: "name".into(),
            message: message.into(),
        };

        if name.is_empty() {
            return Err(invalid("site name must not be empty").into());
        }
        if self.catalog().find(name).is_some() || BuiltinSite::from_key(name).is_some() {
            return Err(invalid("a site with this name already exists").into());
        }

        let site = CustomSite::new(name, now);
        tracing::info!(id = %site.id, name = %site.name, "custom site added");
        self.data.custom_sites.push(site.clone());
        Ok(site)
    }

    fn ensure_not_last_active(&self, candidate: &SiteCatalog) -> Result<()> {
        if let Err(e) = candidate.require_active() {
            tracing::warn!("refusing to leave the site catalog without an enabled site");
            return Err(e.into());
        }
        Ok(())
    }

    /// Enable or disable a site.
    ///
    /// # Errors
    /// Returns `ConfigError::EmptyCatalog` when disabling the last enabled site.
    pub fn set_site_enabled(&mut self, site: SiteRef, enabled: bool) -> Result<()> {
        self.require_known(&site)?;

        let mut candidate = self.catalog();
        match site {
            SiteRef::Builtin(builtin) => {
                candidate.disabled_builtins.retain(|s| *s != builtin);
                if !enabled {
                    candidate.disabled_builtins.push(builtin);
                }
            }
            SiteRef::Custom(id) => {
                for custom in candidate.custom_sites.iter_mut().filter(|c| c.id == id) {
                    custom.enabled = enabled;
                }
            }
        }
        self.ensure_not_last_active(&candidate)?;

        self.data.disabled_builtins = candidate.disabled_builtins;
        self.data.custom_sites = candidate.custom_sites;
        tracing::info!(site = %site, enabled, "site toggled");
        Ok(())
    }

    /// Evaluate the journal against another built-in site revision.
    ///
    /// # Errors
    /// Returns `ConfigError::EmptyCatalog` when no site would stay enabled.
    pub fn switch_revision(&mut self, revision: CatalogRevision) -> Result<()> {
        let mut candidate = self.catalog();
        candidate.revision = revision;
        self.ensure_not_last_active(&candidate)?;

        tracing::info!(from = ?self.revision, to = ?revision, "catalog revision switched");
        self.revision = revision;
        Ok(())
    }

    /// Delete a custom site. Its past placements stay in the journal.
    ///
    /// # Errors
    /// Returns `ValidationError` for built-in or unknown sites and
    /// `ConfigError::EmptyCatalog` when it is the last enabled site.
    pub fn remove_custom_site(&mut self, site: SiteRef) -> Result<CustomSite> {
        let SiteRef::Custom(id) = site else {
            return Err(ValidationError::InvalidValue {
                field: "site".into(),
                message: "built-in sites can be disabled but not removed".into(),
            }
            .into());
        };

        let mut candidate = self.catalog();
        let index = candidate
            .custom_sites
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ValidationError::UnknownSite(site.to_string()))?;
        let removed = candidate.custom_sites.remove(index);
        self.ensure_not_last_active(&candidate)?;

        self.data.custom_sites = candidate.custom_sites;
        tracing::info!(id = %id, "custom site removed");
        Ok(removed)
    }

    /// Store earned achievements, skipping types already on record.
    /// Returns how many were added.
    pub fn record_achievements(&mut self, earned: Vec<Achievement>) -> usize {
        let mut added = 0;
        for achievement in earned {
            if self
                .data
                .achievements
                .iter()
                .any(|existing| existing.kind == achievement.kind)
            {
                continue;
            }
            tracing::info!(kind = ?achievement.kind, "achievement earned");
            self.data.achievements.push(achievement);
            added += 1;
        }
        added
    }

    /// Write the journal to disk (write to a temp file, then rename).
    ///
    /// # Errors
    /// Returns `StorageError::WriteFailed` on any IO failure.
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.data)?;
        let tmp = self.path.with_extension("json.tmp");
        let write_failed = |source| StorageError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        std::fs::write(&tmp, content).map_err(write_failed)?;
        std::fs::rename(&tmp, &self.path).map_err(write_failed)?;
        tracing::debug!(path = %self.path.display(), "journal saved");
        Ok(())
    }
}

impl EventStore for Journal {
    fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            events: self.data.events.clone(),
            catalog: self.catalog(),
            achievements: self.data.achievements.clone(),
        })
    }
}
