use anyhow::{Context, Result, bail};
use clap::Parser;
use neon_snake::game::GameConfig;
use neon_snake::modes::HumanMode;
use neon_snake::storage::{JsonFileStore, MemoryStore};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neon_snake")]
#[command(version, about = "Snake in the terminal")]
struct Cli {
    /// JSON file with game settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cells along each side of the square board
    #[arg(long)]
    grid_size: Option<usize>,

    /// Milliseconds between two ticks
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Where the high score is kept
    #[arg(long, default_value = ".neon_snake_high_score.json")]
    high_score_file: PathBuf,

    /// Keep the high score in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Log output; the terminal itself belongs to the game
    #[arg(long, default_value = "neon_snake.log")]
    log_file: PathBuf,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        if let Some(cells) = self.grid_size {
            config.display_size = match u32::try_from(cells)
                .ok()
                .and_then(|cells| cells.checked_mul(config.tile_size))
            {
                Some(size) => size,
                None => bail!("--grid-size {} is too large", cells),
            };
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_interval_ms = tick_ms;
        }

        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}


#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let config = cli.game_config()?;
    tracing::info!(
        grid = config.grid_size(),
        tick_ms = config.tick_interval_ms,
        "Starting neon_snake"
    );

    if cli.ephemeral {
        HumanMode::new(config, MemoryStore::new())?.run().await?;
    } else {
        let store = JsonFileStore::new(&cli.high_score_file);
        HumanMode::new(config, store)?.run().await?;
    }

    Ok(())
}
