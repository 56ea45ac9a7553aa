use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "pumpsite-cli", version, about = "Pumpsite CLI")]
struct Cli {
    /// Evaluate as of this instant (RFC 3339) instead of the system clock
    #[arg(long, global = true, value_parser = commands::parse_instant)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Site catalog management
    Site {
        #[command(subcommand)]
        action: commands::site::SiteAction,
    },
    /// Log a placement
    Log(commands::placement::LogArgs),
    /// List placements
    History(commands::placement::HistoryArgs),
    /// Edit a placement
    Edit(commands::placement::EditArgs),
    /// Delete a placement
    Delete {
        /// Placement id
        id: uuid::Uuid,
    },
    /// Readiness of every enabled site
    Status,
    /// Recommend the next site
    Recommend,
    /// Rotation score
    Score(commands::analytics::WindowArgs),
    /// Site usage heatmap
    Heatmap(commands::analytics::WindowArgs),
    /// Placement counts over time
    Trend(commands::analytics::TrendArgs),
    /// Current and longest daily streak
    Streak,
    /// Achievement progress (records newly earned ones)
    Achievements,
    /// Status, recommendation, score and streaks at once
    Summary,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let ctx = Context::new(cli.now);
    let result = match cli.command {
        Commands::Site { action } => commands::site::run(&ctx, action),
        Commands::Log(args) => commands::placement::log(&ctx, args),
        Commands::History(args) => commands::placement::history(&ctx, args),
        Commands::Edit(args) => commands::placement::edit(&ctx, args),
        Commands::Delete { id } => commands::placement::delete(&ctx, id),
        Commands::Status => commands::analytics::status(&ctx),
        Commands::Recommend => commands::analytics::recommend(&ctx),
        Commands::Score(args) => commands::analytics::score(&ctx, args),
        Commands::Heatmap(args) => commands::analytics::heatmap(&ctx, args),
        Commands::Trend(args) => commands::analytics::trend(&ctx, args),
        Commands::Streak => commands::analytics::streak(&ctx),
        Commands::Achievements => commands::analytics::achievements(&ctx),
        Commands::Summary => commands::analytics::summary(&ctx),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
