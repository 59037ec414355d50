use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use epicycles::cli::Args;
use epicycles::config::Config;
use epicycles::display::{terminal, Player};
use epicycles::path;

fn main() -> Result<()> {
    // Initialize logging on stderr so it stays out of the terminal UI
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("epicycles=info".parse()?),
        )
        .init();

    let args = Args::parse();

    if args.init_config {
        let path = Config::init_default_config()?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    // Load or create config, then let the command line win
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_from_default_path().unwrap_or_default(),
    };
    config.merge_args(&args);

    let file = args
        .file
        .as_deref()
        .context("No path file given")?;
    let points = path::load_points(file)?;
    info!("Loaded {} points from {}", points.len(), file.display());

    let tracer = epicycles::build_tracer(points, &config)
        .with_context(|| format!("Cannot draw {}", file.display()))?;
    info!(
        "Tracing with {} harmonics at {} rad/s",
        tracer.harmonics().len(),
        tracer.angular_velocity()
    );

    let player = Player::new(tracer, &config.display);
    terminal::run(player, &config.display)
}
