//! File logging
//!
//! The terminal belongs to the game while it runs, so log output goes to a
//! file instead of stdout/stderr.

use anyhow::{Context, Result};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::Path;

/// Install a global logger that writes to `path`. `LevelFilter::Off` skips it entirely.
pub fn init(path: &Path, level: LevelFilter) -> Result<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {:?}", path))?;
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_location_level(LevelFilter::Off)
        .build();

    WriteLogger::init(level, config, file).context("Failed to initialize logger")?;
    Ok(())
}
