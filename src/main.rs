mod commands;
mod render;

use anyhow::Result;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use daygrid_core::GlobalConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "daygrid")]
#[command(about = "Keyboard-driven day view for your local calendar directory")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the display timezone (IANA name, e.g. Europe/Berlin)
    #[arg(long, global = true)]
    tz: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the layout for one day
    Day {
        /// Day to show (YYYY-MM-DD, defaults to today)
        date: Option<String>,
    },
    /// List upcoming events grouped by day
    Agenda {
        /// How many days ahead to list
        #[arg(long, default_value_t = 3)]
        days: i64,
    },
    /// Show the event nearest to now
    Next,
    /// Interactive navigation (reads keys from stdin)
    View,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = GlobalConfig::load()?;
    let tz = resolve_timezone(cli.tz.as_deref(), &config)?;

    match cli.command {
        Commands::Day { date } => commands::day::run(&config, tz, date.as_deref()),
        Commands::Agenda { days } => commands::agenda::run(&config, tz, days),
        Commands::Next => commands::next::run(&config, tz),
        Commands::View => commands::view::run(&config, tz),
    }
}

/// Display timezone: CLI flag, then config, then system detection, then UTC.
fn resolve_timezone(flag: Option<&str>, config: &GlobalConfig) -> Result<Tz> {
    if let Some(name) = flag.or(config.timezone.as_deref()) {
        return name
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown timezone '{}'", name));
    }

    let detected = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
    Ok(detected.parse().unwrap_or(chrono_tz::UTC))
}
