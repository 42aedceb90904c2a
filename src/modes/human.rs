use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use log::{debug, error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::interval;

use super::scheduler::TickScheduler;
use crate::audio::{AudioSink, Muted, TerminalBell};
use crate::game::{Command, GameEngine, Phase, Speed};
use crate::input::{InputHandler, KeyAction};
use crate::render::{Hud, Renderer};

pub struct HumanMode {
    engine: GameEngine,
    renderer: Renderer,
    input_handler: InputHandler,
    audio: Box<dyn AudioSink>,
    sound_enabled: bool,
    selected_speed: Speed,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(engine: GameEngine, sound_enabled: bool) -> Self {
        let selected_speed = engine.config().speed;

        Self {
            engine,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            audio: audio_sink(sound_enabled),
            sound_enabled,
            selected_speed,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw mode")?;

        // From here on the terminal is restored whatever happens
        let result = match setup_terminal() {
            Ok(mut terminal) => self.run_game_loop(&mut terminal).await,
            Err(err) => Err(err),
        };

        first_error(result, restore_terminal())
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut scheduler = TickScheduler::new();
        scheduler.sync(self.engine.clock());

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        info!("Game loop started in {:?}", self.engine.phase());

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Game logic tick, only armed while playing
                _ = scheduler.tick() => {
                    let outcome = self.engine.tick();
                    debug!("Tick: {outcome:?}");
                }

                // Render frame
                _ = render_timer.tick() => {
                    let hud = self.hud();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.engine.snapshot(), &hud);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            scheduler.sync(self.engine.clock());
            self.play_events();

            if self.should_quit {
                break;
            }
        }

        info!("Quit with high score {}", self.engine.high_score());
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            let action = self.input_handler.handle_key_event(key);
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: KeyAction) {
        let in_menu = self.engine.phase() == Phase::Menu;

        match action {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::ToggleSound => self.toggle_sound(),
            KeyAction::Turn(direction) => self.engine.apply(Command::Turn(direction)),
            KeyAction::TogglePause => self.engine.apply(Command::TogglePause),
            KeyAction::Restart => self.engine.apply(Command::Reset),
            KeyAction::Menu if in_menu => self.should_quit = true,
            KeyAction::Menu => self.engine.apply(Command::BackToMenu),
            KeyAction::StartLevel(level) if in_menu => self.engine.apply(Command::Start {
                level,
                speed: self.selected_speed,
            }),
            KeyAction::CycleSpeed if in_menu => self.selected_speed = self.selected_speed.next(),
            KeyAction::StartLevel(_) | KeyAction::CycleSpeed | KeyAction::None => {}
        }
    }

    fn toggle_sound(&mut self) {
        self.sound_enabled = !self.sound_enabled;
        self.audio = audio_sink(self.sound_enabled);
        info!("Sound {}", if self.sound_enabled { "on" } else { "off" });
    }

    fn play_events(&mut self) {
        for event in self.engine.drain_events() {
            debug!("Event: {}", event.name());
            self.audio.play(event);
        }
    }

    fn hud(&self) -> Hud {
        Hud {
            sound_enabled: self.sound_enabled,
            selected_speed: self.selected_speed,
        }
    }

}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stderr>>> {
    let mut stderr = stderr();
    execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.hide_cursor().context("Failed to hide cursor")?;
    terminal.clear().context("Failed to clear terminal")?;
    Ok(terminal)
}

/// Every step runs even if an earlier one fails
fn restore_terminal() -> Result<()> {
    let raw_mode = disable_raw_mode().context("Failed to disable raw mode");
    let screen = execute!(stderr(), LeaveAlternateScreen, Show)
        .context("Failed to leave alternate screen");
    raw_mode.and(screen)
}

/// The game loop's error wins; a cleanup error behind it is only logged
fn first_error(result: Result<()>, cleanup: Result<()>) -> Result<()> {
    match (result, cleanup) {
        (Err(err), Err(cleanup_err)) => {
            error!("Failed to restore terminal: {cleanup_err:#}");
            Err(err)
        }
        (Err(err), Ok(())) => Err(err),
        (Ok(()), cleanup) => cleanup,
    }
}

fn audio_sink(sound_enabled: bool) -> Box<dyn AudioSink> {
    if sound_enabled {
        Box::new(TerminalBell::new(stderr()))
    } else {
        Box::new(Muted)
    }
}
