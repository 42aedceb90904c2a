//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Input arrives as [`Command`]s, output leaves as [`Snapshot`]s and [`GameEvent`]s,
//! and the high score goes through an injected [`crate::storage::HighScoreStore`].

pub mod action;
pub mod config;
pub mod engine;
pub mod events;
pub mod food;
pub mod state;

// Re-export commonly used types
pub use action::{Command, Direction};
pub use config::{GameConfig, Level, Speed, tick_interval};
pub use engine::{GameEngine, TickClock, TickOutcome};
pub use events::GameEvent;
pub use food::place_food;
pub use state::{
    Board, CollisionType, GameOverReason, GameState, Phase, Position, Snake, Snapshot,
};
