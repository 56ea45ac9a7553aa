//! Site catalog.
//!
//! A site is either one of the built-in body locations or a user-defined
//! custom site. The catalog resolves which sites are active (enabled) and
//! fixes the ordering every tie-break in the engine relies on: built-in
//! sites in declaration order, then custom sites by creation time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigError;

/// Revision of the built-in location set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogRevision {
    /// Eight locations: abdomen, thighs, arms and buttocks, left and right
    V1,
    /// Adds the lower back
    #[default]
    V2,
}

impl CatalogRevision {
    /// Built-in sites available in this revision, in declaration order.
    pub fn builtin_sites(self) -> impl Iterator<Item = BuiltinSite> {
        BuiltinSite::ALL
            .into_iter()
            .filter(move |site| site.introduced_in() <= self)
    }

    pub fn key(self) -> &'static str {
        match self {
            CatalogRevision::V1 => "v1",
            CatalogRevision::V2 => "v2",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "v1" | "1" => Some(CatalogRevision::V1),
            "v2" | "2" => Some(CatalogRevision::V2),
            _ => None,
        }
    }
}

/// Canonical body locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinSite {
    AbdomenLeft,
    AbdomenRight,
    ThighLeft,
    ThighRight,
    ArmLeft,
    ArmRight,
    ButtockLeft,
    ButtockRight,
    LowerBack,
}

impl BuiltinSite {
    pub const ALL: [BuiltinSite; 9] = [
        BuiltinSite::AbdomenLeft,
        BuiltinSite::AbdomenRight,
        BuiltinSite::ThighLeft,
        BuiltinSite::ThighRight,
        BuiltinSite::ArmLeft,
        BuiltinSite::ArmRight,
        BuiltinSite::ButtockLeft,
        BuiltinSite::ButtockRight,
        BuiltinSite::LowerBack,
    ];

    /// Stable key used in files and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            BuiltinSite::AbdomenLeft => "abdomen_left",
            BuiltinSite::AbdomenRight => "abdomen_right",
            BuiltinSite::ThighLeft => "thigh_left",
            BuiltinSite::ThighRight => "thigh_right",
            BuiltinSite::ArmLeft => "arm_left",
            BuiltinSite::ArmRight => "arm_right",
            BuiltinSite::ButtockLeft => "buttock_left",
            BuiltinSite::ButtockRight => "buttock_right",
            BuiltinSite::LowerBack => "lower_back",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BuiltinSite::AbdomenLeft => "Abdomen (Left)",
            BuiltinSite::AbdomenRight => "Abdomen (Right)",
            BuiltinSite::ThighLeft => "Thigh (Left)",
            BuiltinSite::ThighRight => "Thigh (Right)",
            BuiltinSite::ArmLeft => "Arm (Left)",
            BuiltinSite::ArmRight => "Arm (Right)",
            BuiltinSite::ButtockLeft => "Buttock (Left)",
            BuiltinSite::ButtockRight => "Buttock (Right)",
            BuiltinSite::LowerBack => "Lower Back",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|site| site.key() == key)
    }

    /// First catalog revision that contains this location.
    pub fn introduced_in(&self) -> CatalogRevision {
        match self {
            BuiltinSite::LowerBack => CatalogRevision::V2,
            _ => CatalogRevision::V1,
        }
    }
}

/// Reference from a placement to the site it used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SiteRef {
    Builtin(BuiltinSite),
    Custom(Uuid),
}

impl fmt::Display for SiteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteRef::Builtin(site) => f.write_str(site.key()),
            SiteRef::Custom(id) => write!(f, "custom:{id}"),
        }
    }
}

impl From<BuiltinSite> for SiteRef {
    fn from(site: BuiltinSite) -> Self {
        SiteRef::Builtin(site)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteKind {
    Builtin,
    Custom,
}

/// A resolved catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub site_ref: SiteRef,
    pub display_name: String,
    pub enabled: bool,
}

impl Site {
    pub fn kind(&self) -> SiteKind {
        match self.site_ref {
            SiteRef::Builtin(_) => SiteKind::Builtin,
            SiteRef::Custom(_) => SiteKind::Custom,
        }
    }
}

/// A user-defined location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSite {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl CustomSite {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at,
            enabled: true,
        }
    }
}

/// Snapshot of every site the user has configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteCatalog {
    #[serde(default)]
    pub revision: CatalogRevision,
    #[serde(default)]
    pub disabled_builtins: Vec<BuiltinSite>,
    #[serde(default)]
    pub custom_sites: Vec<CustomSite>,
}

impl SiteCatalog {
    pub fn new(revision: CatalogRevision) -> Self {
        Self {
            revision,
            disabled_builtins: Vec::new(),
            custom_sites: Vec::new(),
        }
    }

    /// Keep only the given built-in sites enabled.
    pub fn restricted_to(mut self, keep: &[BuiltinSite]) -> Self {
        self.disabled_builtins = self
            .revision
            .builtin_sites()
            .filter(|site| !keep.contains(site))
            .collect();
        self
    }

    /// Add a custom site and return its reference.
    pub fn add_custom(&mut self, site: CustomSite) -> SiteRef {
        let site_ref = SiteRef::Custom(site.id);
        self.custom_sites.push(site);
        site_ref
    }

    /// Every site in catalog order, enabled or not.
    pub fn all_sites(&self) -> Vec<Site> {
        let builtins = self.revision.builtin_sites().map(|site| Site {
            site_ref: SiteRef::Builtin(site),
            display_name: site.display_name().to_string(),
            enabled: !self.disabled_builtins.contains(&site),
        });

        let mut customs: Vec<&CustomSite> = self.custom_sites.iter().collect();
        customs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let customs = customs.into_iter().map(|site| Site {
            site_ref: SiteRef::Custom(site.id),
            display_name: site.name.clone(),
            enabled: site.enabled,
        });

        builtins.chain(customs).collect()
    }

    /// Enabled sites in catalog order.
    pub fn active_sites(&self) -> Vec<Site> {
        self.all_sites().into_iter().filter(|site| site.enabled).collect()
    }

    /// Enabled sites, failing when none are left.
    ///
    /// # Errors
    /// Returns `ConfigError::EmptyCatalog` when every site is disabled.
    pub fn require_active(&self) -> Result<Vec<Site>, ConfigError> {
        let active = self.active_sites();
        if active.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        Ok(active)
    }

    pub fn resolve(&self, site_ref: &SiteRef) -> Option<Site> {
        self.all_sites().into_iter().find(|site| &site.site_ref == site_ref)
    }

    pub fn is_active(&self, site_ref: &SiteRef) -> bool {
        self.resolve(site_ref).is_some_and(|site| site.enabled)
    }

    /// Look a site up by built-in key, custom id, or custom name (case-insensitive).
    pub fn find(&self, query: &str) -> Option<SiteRef> {
        if let Some(site) = BuiltinSite::from_key(query) {
            if site.introduced_in() <= self.revision {
                return Some(SiteRef::Builtin(site));
            }
            return None;
        }

        let query = query.strip_prefix("custom:").unwrap_or(query);
        self.custom_sites
            .iter()
            .find(|site| site.id.to_string() == query || site.name.eq_ignore_ascii_case(query))
            .map(|site| SiteRef::Custom(site.id))
    }
}
