use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use shuffle_lunch::allocate::allocate_with_retries;
use shuffle_lunch::config::{Config, ReportFormat};
use shuffle_lunch::{report, roster};

#[derive(Parser)]
#[command(name = "shuffle-lunch", about = "Shuffle a roster into lunch groups", version)]
struct Cli {
    /// Configuration file (defaults to ./shuffle-lunch.toml when present)
    #[arg(short, long, env = "SHUFFLE_LUNCH_CONFIG")]
    config: Option<PathBuf>,

    /// Roster CSV file
    #[arg(short, long)]
    roster: Option<PathBuf>,

    /// Members per group
    #[arg(short, long)]
    group_size: Option<usize>,

    /// Seed for the tie-break shuffle
    #[arg(short, long)]
    seed: Option<u64>,

    /// Attempts with successive seeds when a member cannot be placed
    #[arg(short, long)]
    attempts: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.roster {
            config.roster.path = path.clone();
        }
        if let Some(size) = self.group_size {
            config.allocation.group_size = size;
        }
        if let Some(seed) = self.seed {
            config.allocation.seed = Some(seed);
        }
        if let Some(attempts) = self.attempts {
            config.allocation.attempts = attempts;
        }
        if let Some(format) = self.format {
            config.report.format = format;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply(&mut config);
    config.validate()?;

    let members = roster::read_roster_file(&config.roster.path)
        .with_context(|| format!("reading roster {}", config.roster.path.display()))?;
    info!(members = members.len(), path = %config.roster.path.display(), "roster loaded");

    let seed = config.allocation.seed.unwrap_or_else(rand::random);
    let (allocation, seed) = allocate_with_retries(
        &members,
        config.allocation.group_size,
        seed,
        config.allocation.attempts,
    )
    .context("allocating lunch groups")?;
    info!(seed, "groups formed");

    let output = match config.report.format {
        ReportFormat::Text => report::render_text(&allocation.groups),
        ReportFormat::Json => report::render_json(&allocation.groups)? + "\n",
    };
    print!("{output}");
    Ok(())
}
