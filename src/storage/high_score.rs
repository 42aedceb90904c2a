//! High score persistence
//!
//! The engine only sees the [`HighScoreStore`] trait. The terminal game
//! uses [`JsonFileStore`]; tests and `--no-save` runs use [`MemoryStore`].

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Key-value persistence for the high score
pub trait HighScoreStore {
    /// Read the stored high score. A store that has never been written reads as 0.
    fn load(&self) -> Result<u32>;

    /// Replace the stored high score
    fn save(&mut self, high_score: u32) -> Result<()>;
}

/// On-disk layout of the high score file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub high_score: u32,

    /// Version of the crate that wrote the record
    pub version: String,
}

impl HighScoreRecord {
    pub fn new(high_score: u32) -> Self {
        Self {
            high_score,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// High score kept as pretty-printed JSON in a single file.
///
/// Saves go through a temporary file in the same directory that is renamed
/// over the target, so the file is either the old record or the new one.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `scores.json` -> `scores.json.bak`
    fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".bak");
        self.path.with_file_name(name)
    }

    /// Move an existing file that does not parse out of the way before it gets replaced
    fn back_up_unreadable(&self) -> Result<()> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read high score from {:?}", self.path));
            }
        };
        if serde_json::from_slice::<HighScoreRecord>(&bytes).is_ok() {
            return Ok(());
        }

        let backup = self.backup_path();
        warn!(
            "High score file {:?} is unreadable, moving it to {:?}",
            self.path, backup
        );
        std::fs::rename(&self.path, &backup)
            .with_context(|| format!("Failed to back up {:?} to {:?}", self.path, backup))?;
        Ok(())
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> Result<u32> {
        if !self.path.exists() {
            return Ok(0);
        }

        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read high score from {:?}", self.path))?;
        let record: HighScoreRecord =
            serde_json::from_str(&json).context("Failed to deserialize high score")?;

        Ok(record.high_score)
    }

    fn save(&mut self, high_score: u32) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {:?}", dir))?;

        self.back_up_unreadable()?;

        let json = serde_json::to_string_pretty(&HighScoreRecord::new(high_score))
            .context("Failed to serialize high score")?;

        let mut file = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
        file.write_all(json.as_bytes())
            .context("Failed to write high score")?;
        file.as_file()
            .sync_all()
            .context("Failed to flush high score")?;
        file.persist(&self.path)
            .with_context(|| format!("Failed to write high score to {:?}", self.path))?;

        Ok(())
    }
}

/// In-memory store. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Arc<AtomicU32>,
}

impl MemoryStore {
    pub fn new(initial: u32) -> Self {
        Self {
            value: Arc::new(AtomicU32::new(initial)),
        }
    }

    pub fn get(&self) -> u32 {
        self.value.load(Ordering::Relaxed)
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<u32> {
        Ok(self.get())
    }

    fn save(&mut self, high_score: u32) -> Result<()> {
        self.value.store(high_score, Ordering::Relaxed);
        Ok(())
    }
}
