use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use pumpsite_core::achievements::{newly_earned, AchievementProgress};
use pumpsite_core::stats::{usage_summary, UsageSummary};
use pumpsite_core::{Achievement, EventStore, GroupBy, HeatmapEntry, TimeWindow};
use serde::Serialize;

use super::{parse_instant, print_json, resolve_site, CommandResult, Context};

#[derive(Args)]
pub struct WindowArgs {
    /// Window start (RFC 3339); open when omitted
    #[arg(long, value_parser = parse_instant)]
    pub from: Option<DateTime<Utc>>,
    /// Window end (RFC 3339); open when omitted
    #[arg(long, value_parser = parse_instant)]
    pub to: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Bucket {
    Day,
    Week,
}

impl From<Bucket> for GroupBy {
    fn from(bucket: Bucket) -> Self {
        match bucket {
            Bucket::Day => GroupBy::Day,
            Bucket::Week => GroupBy::Week,
        }
    }
}

#[derive(Args)]
pub struct TrendArgs {
    /// Window start (RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    pub from: DateTime<Utc>,
    /// Window end (RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    pub to: DateTime<Utc>,
    /// Bucket size
    #[arg(long, value_enum, default_value = "day")]
    pub by: Bucket,
    /// Only count placements on this site
    #[arg(long)]
    pub site: Option<String>,
}

#[derive(Serialize)]
struct HeatmapRow<'a> {
    #[serde(flatten)]
    entry: &'a HeatmapEntry,
    heat: char,
}

#[derive(Serialize)]
struct HeatmapReport<'a> {
    sites: Vec<HeatmapRow<'a>>,
    summary: UsageSummary,
}

#[derive(Serialize)]
struct StreakReport {
    current: u32,
    longest: u32,
}

#[derive(Serialize)]
struct AchievementRow<'a> {
    #[serde(flatten)]
    progress: &'a AchievementProgress,
    title: &'static str,
    description: &'static str,
    earned_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct AchievementReport<'a> {
    achievements: Vec<AchievementRow<'a>>,
    newly_earned: Vec<Achievement>,
}

pub fn status(ctx: &Context) -> CommandResult {
    let (config, journal) = ctx.open()?;
    let snapshot = journal.snapshot()?;
    let engine = ctx.engine(&config)?;

    print_json(&engine.statuses(&snapshot.catalog, &snapshot.events, ctx.now()))
}

pub fn recommend(ctx: &Context) -> CommandResult {
    let (config, journal) = ctx.open()?;
    let snapshot = journal.snapshot()?;
    let engine = ctx.engine(&config)?;

    let recommendation = engine.recommend(&snapshot.catalog, &snapshot.events, ctx.now())?;
    if recommendation.is_none() {
        tracing::info!("every enabled site is resting");
    }
    print_json(&recommendation)
}

pub fn score(ctx: &Context, args: WindowArgs) -> CommandResult {
    let (config, journal) = ctx.open()?;
    let snapshot = journal.snapshot()?;
    let engine = ctx.engine(&config)?;
    let window = TimeWindow::new(args.from, args.to)?;

    print_json(&engine.score(&snapshot.catalog, &snapshot.events, window)?)
}

pub fn heatmap(ctx: &Context, args: WindowArgs) -> CommandResult {
    let (config, journal) = ctx.open()?;
    let snapshot = journal.snapshot()?;
    let engine = ctx.engine(&config)?;
    let window = TimeWindow::new(args.from, args.to)?;

    let entries = engine.heatmap(&snapshot.catalog, &snapshot.events, window);
    let rows: Vec<HeatmapRow> = entries
        .iter()
        .map(|entry| HeatmapRow {
            entry,
            heat: entry.heat_char(),
        })
        .collect();

    print_json(&HeatmapReport {
        sites: rows,
        summary: usage_summary(&entries),
    })
}

pub fn trend(ctx: &Context, args: TrendArgs) -> CommandResult {
    let (config, journal) = ctx.open()?;
    let snapshot = journal.snapshot()?;
    let engine = ctx.engine(&config)?;
    let site = match &args.site {
        Some(query) => Some(resolve_site(&snapshot.catalog, query)?),
        None => None,
    };

    let points = engine.trend(&snapshot.events, args.by.into(), args.from, args.to, site)?;
    print_json(&points)
}

pub fn streak(ctx: &Context) -> CommandResult {
    let (config, journal) = ctx.open()?;
    let snapshot = journal.snapshot()?;
    let engine = ctx.engine(&config)?;

    print_json(&StreakReport {
        current: engine.current_streak(&snapshot.events, ctx.now()),
        longest: engine.longest_streak(&snapshot.events),
    })
}

pub fn achievements(ctx: &Context) -> CommandResult {
    let (config, mut journal) = ctx.open()?;
    let snapshot = journal.snapshot()?;
    let engine = ctx.engine(&config)?;

    let progress = engine.achievements(&snapshot.catalog, &snapshot.events, ctx.now());
    let earned = newly_earned(&progress, &snapshot.achievements, ctx.now());
    if journal.record_achievements(earned.clone()) > 0 {
        journal.save()?;
    }

    let achievements = progress
        .iter()
        .map(|p| AchievementRow {
            progress: p,
            title: p.kind.title(),
            description: p.kind.description(),
            earned_at: journal
                .achievements()
                .iter()
                .find(|a| a.kind == p.kind)
                .map(|a| a.earned_at),
        })
        .collect();

    print_json(&AchievementReport {
        achievements,
        newly_earned: earned,
    })
}

pub fn summary(ctx: &Context) -> CommandResult {
    let (config, journal) = ctx.open()?;
    let snapshot = journal.snapshot()?;
    let engine = ctx.engine(&config)?;

    print_json(&engine.summary(&snapshot.catalog, &snapshot.events, ctx.now())?)
}
