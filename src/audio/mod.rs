//! Audio hook
//!
//! The engine only emits [`GameEvent`]s. A sink decides what, if anything,
//! they sound like. The terminal has no synthesiser, so the audible sink
//! rings the bell for the events that matter.

use std::io::Write;

use crate::game::GameEvent;

pub trait AudioSink {
    fn play(&mut self, event: GameEvent);
}

/// Rings the terminal bell on food, crashes and a cleared board
pub struct TerminalBell<W: Write> {
    out: W,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Start and turns stay silent: a bell on every key press is noise.
    fn is_audible(event: GameEvent) -> bool {
        matches!(
            event,
            GameEvent::AteFood | GameEvent::Crashed | GameEvent::BoardCleared
        )
    }
}

impl<W: Write> AudioSink for TerminalBell<W> {
    fn play(&mut self, event: GameEvent) {
        if !Self::is_audible(event) {
            return;
        }

        // A lost bell is not worth interrupting the game for
        if let Err(err) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            log::debug!("Bell for {} failed: {err}", event.name());
        }
    }
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct Muted;

impl AudioSink for Muted {
    fn play(&mut self, _event: GameEvent) {}
}
