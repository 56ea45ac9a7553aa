pub mod analytics;
pub mod config;
pub mod placement;
pub mod site;

use chrono::{DateTime, Utc};
use pumpsite_core::{Config, Journal, RotationEngine, SiteCatalog, SiteRef, ValidationError};
use serde::Serialize;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Per-invocation state shared by every command.
pub struct Context {
    now: DateTime<Utc>,
}

impl Context {
    pub fn new(now: Option<DateTime<Utc>>) -> Self {
        Self {
            now: now.unwrap_or_else(Utc::now),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Load config and open the journal for the configured catalog revision.
    pub fn open(&self) -> Result<(Config, Journal), pumpsite_core::CoreError> {
        let config = Config::load()?;
        let journal = Journal::open(config.catalog.revision)?;
        Ok((config, journal))
    }

    pub fn engine(&self, config: &Config) -> Result<RotationEngine, pumpsite_core::ConfigError> {
        Ok(RotationEngine::new(config.rules()?))
    }
}

pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

/// Resolve a site argument: built-in key, custom site name, or id.
pub fn resolve_site(catalog: &SiteCatalog, query: &str) -> Result<SiteRef, ValidationError> {
    catalog
        .find(query)
        .ok_or_else(|| ValidationError::UnknownSite(query.to_string()))
}

pub fn print_json<T: Serialize>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
