use anyhow::Result;
use clap::{Parser, ValueEnum};
use grid_snake::game::{GameConfig, GameEngine, Level, Speed};
use grid_snake::logging;
use grid_snake::modes::HumanMode;
use grid_snake::storage::{HighScoreStore, JsonFileStore, MemoryStore};
use log::info;
use simplelog::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Snake on a square grid, in your terminal")]
struct Cli {
    /// Skip the menu and start at this level
    #[arg(long)]
    level: Option<Level>,

    /// Game speed
    #[arg(long, default_value = "slow")]
    speed: Speed,

    /// Where the high score is kept
    #[arg(long, default_value = ".grid_snake_high_score.json")]
    high_score_file: PathBuf,

    /// Keep the high score in memory only
    #[arg(long)]
    no_save: bool,

    /// Start with sound off
    #[arg(long)]
    mute: bool,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Log file
    #[arg(long, default_value = "grid_snake.log")]
    log_file: PathBuf,

    /// Log verbosity
    #[arg(long, default_value = "info")]
    log_level: LogLevel,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_file, cli.log_level.into())?;

    let store: Box<dyn HighScoreStore> = if cli.no_save {
        Box::new(MemoryStore::default())
    } else {
        info!("High score file: {:?}", cli.high_score_file);
        Box::new(JsonFileStore::new(&cli.high_score_file))
    };

    let config = GameConfig::new(cli.level.unwrap_or(Level::Rookie), cli.speed);
    let mut engine = match cli.seed {
        Some(seed) => GameEngine::with_seed(config, store, seed),
        None => GameEngine::new(config, store),
    };

    // An explicit level skips the menu
    if let Some(level) = cli.level {
        engine.start(level, cli.speed);
    }

    let mut human_mode = HumanMode::new(engine, !cli.mute);
    human_mode.run().await?;

    Ok(())
}
