use chrono::{DateTime, Utc};
use clap::Args;
use pumpsite_core::placement::chronological;
use pumpsite_core::{PlacementEdit, PlacementEvent, TimeWindow};
use serde::Serialize;
use uuid::Uuid;

use super::{parse_instant, print_json, resolve_site, CommandResult, Context};

#[derive(Args)]
pub struct LogArgs {
    /// Built-in key, custom site name, or id
    pub site: String,
    /// Placement time (RFC 3339); defaults to now
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<DateTime<Utc>>,
    /// Free-form note
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Only placements at or after this instant
    #[arg(long, value_parser = parse_instant)]
    pub from: Option<DateTime<Utc>>,
    /// Only placements at or before this instant
    #[arg(long, value_parser = parse_instant)]
    pub to: Option<DateTime<Utc>>,
    /// Only placements on this site
    #[arg(long)]
    pub site: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Placement id
    pub id: Uuid,
    /// New site
    #[arg(long)]
    pub site: Option<String>,
    /// New placement time (RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<DateTime<Utc>>,
    /// New note
    #[arg(long, conflicts_with = "clear_note")]
    pub note: Option<String>,
    /// Remove the note
    #[arg(long)]
    pub clear_note: bool,
}

/// A placement together with its site's display name.
#[derive(Serialize)]
struct HistoryEntry<'a> {
    #[serde(flatten)]
    event: &'a PlacementEvent,
    site_name: Option<String>,
}

pub fn log(ctx: &Context, args: LogArgs) -> CommandResult {
    let (_config, mut journal) = ctx.open()?;
    let site = resolve_site(&journal.catalog(), &args.site)?;

    let event = journal.log_placement(site, args.at.unwrap_or(ctx.now()), args.note)?;
    journal.save()?;
    print_json(&event)
}

pub fn history(ctx: &Context, args: HistoryArgs) -> CommandResult {
    let (_config, journal) = ctx.open()?;
    let catalog = journal.catalog();
    let window = TimeWindow::new(args.from, args.to)?;
    let site = match &args.site {
        Some(query) => Some(resolve_site(&catalog, query)?),
        None => None,
    };

    let entries: Vec<HistoryEntry> = chronological(journal.events())
        .into_iter()
        .rev()
        .filter(|event| window.contains(event.timestamp))
        .filter(|event| site.map_or(true, |s| event.site == s))
        .map(|event| HistoryEntry {
            event,
            site_name: catalog.resolve(&event.site).map(|s| s.display_name),
        })
        .collect();
    print_json(&entries)
}

pub fn edit(ctx: &Context, args: EditArgs) -> CommandResult {
    let (_config, mut journal) = ctx.open()?;
    let site = match &args.site {
        Some(query) => Some(resolve_site(&journal.catalog(), query)?),
        None => None,
    };

    let note = if args.clear_note {
        Some(None)
    } else {
        args.note.map(Some)
    };
    let edit = PlacementEdit {
        site,
        timestamp: args.at,
        note,
    };

    let event = journal.edit_placement(args.id, &edit)?;
    journal.save()?;
    print_json(&event)
}

pub fn delete(ctx: &Context, id: Uuid) -> CommandResult {
    let (_config, mut journal) = ctx.open()?;
    let removed = journal.delete_placement(id)?;
    journal.save()?;
    print_json(&removed)
}
