//! Grid Snake - a tick-driven Snake game
//!
//! This library provides:
//! - Core game logic: the engine state machine, food placement and scoring (game module)
//! - High score persistence behind a store trait (storage module)
//! - Audio hook for engine events (audio module)
//! - Keyboard mapping, TUI rendering and the terminal run loop (input, render, modes)

pub mod audio;
pub mod game;
pub mod input;
pub mod logging;
pub mod modes;
pub mod render;
pub mod storage;
