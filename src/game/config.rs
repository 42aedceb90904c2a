use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Difficulty level: decides grid size, base tick interval and points per food
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Rookie,
    Hacker,
    Matrix,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Rookie, Level::Hacker, Level::Matrix];

    /// Level number as shown to the player, also the score multiplier
    pub fn number(&self) -> u32 {
        match self {
            Level::Rookie => 1,
            Level::Hacker => 2,
            Level::Matrix => 3,
        }
    }

    pub fn from_number(number: u32) -> Option<Level> {
        Self::ALL.into_iter().find(|level| level.number() == number)
    }

    /// Side length of the square board
    pub fn grid_size(&self) -> usize {
        match self {
            Level::Rookie => 15,
            Level::Hacker => 18,
            Level::Matrix => 20,
        }
    }

    /// Tick interval before the speed multiplier is applied
    pub fn base_interval(&self) -> Duration {
        match self {
            Level::Rookie => Duration::from_millis(400),
            Level::Hacker => Duration::from_millis(300),
            Level::Matrix => Duration::from_millis(200),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Level::Rookie => "ROOKIE",
            Level::Hacker => "HACKER",
            Level::Matrix => "MATRIX",
        }
    }

    /// Points awarded per food eaten
    pub fn food_points(&self) -> u32 {
        self.number() * 10
    }
}

/// Game speed, applied as a multiplier on the level's base interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Slow,
    Normal,
    Fast,
}

impl Speed {
    pub fn multiplier(&self) -> f64 {
        match self {
            Speed::Slow => 1.5,
            Speed::Normal => 1.0,
            Speed::Fast => 0.7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Speed::Slow => "Slow",
            Speed::Normal => "Normal",
            Speed::Fast => "Fast",
        }
    }

    /// Next speed in menu order, wrapping around
    pub fn next(&self) -> Speed {
        match self {
            Speed::Slow => Speed::Normal,
            Speed::Normal => Speed::Fast,
            Speed::Fast => Speed::Slow,
        }
    }
}

/// Tick interval for a level/speed pair, rounded to whole milliseconds
pub fn tick_interval(level: Level, speed: Speed) -> Duration {
    let millis = level.base_interval().as_millis() as f64 * speed.multiplier();
    Duration::from_millis(millis.round() as u64)
}

/// Level and speed selection for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub level: Level,
    pub speed: Speed,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            level: Level::Rookie,
            speed: Speed::Slow,
        }
    }
}

impl GameConfig {
    pub fn new(level: Level, speed: Speed) -> Self {
        Self { level, speed }
    }

    pub fn grid_size(&self) -> usize {
        self.level.grid_size()
    }

    pub fn tick_interval(&self) -> Duration {
        tick_interval(self.level, self.speed)
    }
}
