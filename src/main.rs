use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lichess_leaderboard::aggregate::{ProgressSink, TeamAggregator, TeamStore};
use lichess_leaderboard::bot::{discord, Bot, BotSettings};
use lichess_leaderboard::config::AppConfig;
use lichess_leaderboard::fetch::Fetcher;
use lichess_leaderboard::leaderboard::Leaderboard;
use lichess_leaderboard::lichess::LichessClient;

#[derive(Parser)]
#[command(name = "lichess-leaderboard")]
#[command(about = "Team leaderboards from Lichess Swiss tournaments")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Discord bot
    Bot,

    /// Refresh a team once and print its leaderboard
    Table {
        /// Team name or fragment
        team: String,

        /// Number of rows to show
        #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        top: Option<usize>,

        /// Also write the leaderboard as a PNG
        #[arg(long)]
        png: Option<PathBuf>,
    },

    /// Refresh a team once and print one player's results
    Player {
        /// Lichess username
        name: String,

        /// Team name or fragment
        team: String,
    },
}

/// Writes refresh progress to stderr.
struct StderrProgress;

#[async_trait]
impl ProgressSink for StderrProgress {
    async fn report(&mut self, text: &str) {
        eprintln!("{}", text);
    }
}

fn build_aggregator(config: &AppConfig) -> Result<TeamAggregator> {
    let fetcher = Fetcher::new(config.lichess.fetcher_config())
        .context("Failed to create HTTP client")?;
    let client = LichessClient::new(fetcher, &config.lichess.base_url)
        .context("Invalid Lichess base URL")?;
    Ok(TeamAggregator::new(
        Arc::new(client),
        Arc::new(TeamStore::new()),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    // Initialize tracing
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting lichess-leaderboard v{}", env!("CARGO_PKG_VERSION"));

    let aggregator = build_aggregator(&config)?;

    match cli.command {
        Commands::Bot => {
            let token = config
                .discord_token()
                .context("No Discord token configured (set DISCORD_TOKEN or discord.token)")?;
            let settings = BotSettings::from_config(&config.bot)?;
            let bot = Arc::new(Bot::new(aggregator, settings));
            discord::run(&token, bot).await?;
        }

        Commands::Table { team, top, png } => {
            let report = aggregator.refresh(&team, &mut StderrProgress).await?;
            let board =
                Leaderboard::from_table(&report.table, top.unwrap_or(config.bot.default_top));

            println!("{}", report.team.name);
            println!("{}", board.render_text());

            if let Some(path) = png {
                let bytes = board.render_png()?;
                std::fs::write(&path, bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!("Wrote leaderboard image to {}", path.display());
            }
        }

        Commands::Player { name, team } => {
            let report = aggregator.refresh(&team, &mut StderrProgress).await?;
            match Leaderboard::position_of(&report.table, &name) {
                Some(row) => println!(
                    "{} in {}: rank {}/{}, win {}, draw {}, loss {}, score {}",
                    row.name,
                    report.team.name,
                    row.rank,
                    report.table.len(),
                    row.tally.wins,
                    row.tally.draws,
                    row.tally.losses,
                    row.score
                ),
                None => println!(
                    "{} has not played in any tournament of {}",
                    name.to_lowercase(),
                    report.team.name
                ),
            }
        }
    }

    Ok(())
}
