//! Tick timer owned by the run loop
//!
//! The scheduler follows the engine's [`TickClock`]: no clock means no
//! timer at all, so pausing, losing or returning to the menu cannot leave
//! a stray tick behind, and nothing is replayed on resume.

use log::debug;
use std::future;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use crate::game::TickClock;

pub struct TickScheduler {
    active: Option<(TickClock, Interval)>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Bring the timer in line with `clock`.
    ///
    /// A new clock starts a fresh interval whose first tick is one full
    /// period away. The same clock leaves the running interval alone.
    pub fn sync(&mut self, clock: Option<TickClock>) {
        match clock {
            None => {
                if let Some((old, _)) = self.active.take() {
                    debug!("Tick timer stopped (generation {})", old.generation);
                }
            }
            Some(clock) => {
                if self.clock() == Some(clock) {
                    return;
                }

                let mut timer = interval_at(Instant::now() + clock.period, clock.period);
                timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
                debug!(
                    "Tick timer started (generation {}, every {:?})",
                    clock.generation, clock.period
                );
                self.active = Some((clock, timer));
            }
        }
    }

    pub fn clock(&self) -> Option<TickClock> {
        self.active.as_ref().map(|(clock, _)| *clock)
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Resolves on the next tick; never resolves while stopped
    pub async fn tick(&mut self) {
        match self.active.as_mut() {
            Some((_, timer)) => {
                timer.tick().await;
            }
            None => future::pending::<()>().await,
        }
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}
