use clap::Subcommand;
use pumpsite_core::{Journal, SiteRef};

use super::{print_json, resolve_site, CommandResult, Context};

#[derive(Subcommand)]
pub enum SiteAction {
    /// List every site, enabled or not
    List,
    /// Add a custom site
    Add {
        /// Display name (must be unique)
        name: String,
    },
    /// Enable a site
    Enable {
        /// Built-in key, custom site name, or id
        site: String,
    },
    /// Disable a site
    Disable {
        /// Built-in key, custom site name, or id
        site: String,
    },
    /// Remove a custom site (its history is kept)
    Remove {
        /// Custom site name or id
        site: String,
    },
}

pub fn run(ctx: &Context, action: SiteAction) -> CommandResult {
    let (_config, mut journal) = ctx.open()?;

    match action {
        SiteAction::List => {
            print_json(&journal.catalog().all_sites())?;
        }
        SiteAction::Add { name } => {
            let site = journal.add_custom_site(&name, ctx.now())?;
            journal.save()?;
            print_json(&site)?;
        }
        SiteAction::Enable { site } => {
            let site_ref = resolve_site(&journal.catalog(), &site)?;
            toggle(&mut journal, site_ref, true)?;
        }
        SiteAction::Disable { site } => {
            let site_ref = resolve_site(&journal.catalog(), &site)?;
            toggle(&mut journal, site_ref, false)?;
        }
        SiteAction::Remove { site } => {
            let site_ref = resolve_site(&journal.catalog(), &site)?;
            let removed = journal.remove_custom_site(site_ref)?;
            journal.save()?;
            print_json(&removed)?;
        }
    }
    Ok(())
}

fn toggle(journal: &mut Journal, site: SiteRef, enabled: bool) -> CommandResult {
    journal.set_site_enabled(site, enabled)?;
    journal.save()?;
    match journal.catalog().resolve(&site) {
        Some(site) => print_json(&site),
        None => Ok(()),
    }
}
