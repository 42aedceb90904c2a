use super::{
    action::{Command, Direction},
    config::{GameConfig, Level, Speed},
    events::GameEvent,
    food::place_food,
    state::{Board, CollisionType, GameOverReason, GameState, Phase, Position, Snake, Snapshot},
};
use crate::storage::HighScoreStore;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing, nothing moved
    Idle,
    /// The snake moved without growing
    Moved,
    /// The snake ate and grew by one segment
    AteFood,
    /// The run ended in a collision; the snake was left unchanged
    Crashed(CollisionType),
    /// The snake ate the last free cell and the run ended
    BoardFilled,
}

/// Timer parameters for the current run.
///
/// `generation` changes every time the engine (re-)enters `Playing`, so a
/// scheduler can restart its timer on resume and reset even when the
/// period is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickClock {
    pub generation: u64,
    pub period: Duration,
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    state: GameState,
    rng: StdRng,
    store: Box<dyn HighScoreStore>,
    high_score: u32,
    generation: u64,
    events: Vec<GameEvent>,
}

impl GameEngine {
    /// Create an engine in the menu, loading the high score from `store`
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>) -> Self {
        Self::with_rng(config, store, StdRng::from_entropy())
    }

    /// Same as [`GameEngine::new`] with a deterministic food sequence
    pub fn with_seed(config: GameConfig, store: Box<dyn HighScoreStore>, seed: u64) -> Self {
        Self::with_rng(config, store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, store: Box<dyn HighScoreStore>, rng: StdRng) -> Self {
        let high_score = match store.load() {
            Ok(score) => score,
            Err(err) => {
                warn!("Failed to load high score, starting from 0: {err:#}");
                0
            }
        };
        debug!("Loaded high score {high_score}");

        Self {
            config,
            state: GameState::Menu,
            rng,
            store,
            high_score,
            generation: 0,
            events: Vec::new(),
        }
    }

    /// Currently selected level and speed
    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Begin a new run at the given level and speed
    pub fn start(&mut self, level: Level, speed: Speed) {
        self.config = GameConfig::new(level, speed);

        let grid_size = level.grid_size();
        let center = (grid_size / 2) as i32;
        let snake = Snake::new(Position::new(center, center), Direction::Right);
        let food = place_food(&mut self.rng, &snake, grid_size);

        info!(
            "Starting run: level {} ({}), speed {}, grid {grid_size}x{grid_size}",
            level.number(),
            level.name(),
            speed.name()
        );

        self.enter_playing(Board::new(snake, food, grid_size));
        self.events.push(GameEvent::Started);
    }

    /// Start over with the current level and speed. No-op in the menu.
    pub fn reset(&mut self) {
        if self.phase() == Phase::Menu {
            return;
        }

        self.start(self.config.level, self.config.speed);
    }

    /// Queue a direction for the next tick.
    ///
    /// Ignored unless playing, and ignored when it would reverse the
    /// snake's current heading.
    pub fn set_direction(&mut self, direction: Direction) {
        let GameState::Playing(board) = &mut self.state else {
            return;
        };

        if board.snake.direction.is_opposite(direction) {
            debug!("Rejected reversal to {direction:?}");
            return;
        }

        if board.next_direction() == direction {
            return;
        }

        board.pending_direction = Some(direction);
        self.events.push(GameEvent::Turned);
    }

    /// Advance the game by one step
    pub fn tick(&mut self) -> TickOutcome {
        let GameState::Playing(board) = &mut self.state else {
            return TickOutcome::Idle;
        };

        if let Some(direction) = board.pending_direction.take() {
            board.snake.direction = direction;
        }

        let new_head = board.snake.head().moved_in_direction(board.snake.direction);

        let collision = if !board.is_in_bounds(new_head) {
            Some(CollisionType::Wall)
        } else if board.snake.occupies(new_head) {
            Some(CollisionType::SelfCollision)
        } else {
            None
        };

        if let Some(collision) = collision {
            self.finish(GameOverReason::Collision(collision));
            self.events.push(GameEvent::Crashed);
            return TickOutcome::Crashed(collision);
        }

        let ate_food = board.food == Some(new_head);
        board.snake.advance_to(new_head, ate_food);

        if !ate_food {
            return TickOutcome::Moved;
        }

        board.score += self.config.level.food_points();
        board.food = place_food(&mut self.rng, &board.snake, board.grid_size);

        let score = board.score;
        let board_filled = board.food.is_none();

        self.events.push(GameEvent::AteFood);
        self.record_score(score);

        if board_filled {
            self.finish(GameOverReason::BoardFilled);
            self.events.push(GameEvent::BoardCleared);
            return TickOutcome::BoardFilled;
        }

        TickOutcome::AteFood
    }

    pub fn pause(&mut self) {
        self.state = match std::mem::replace(&mut self.state, GameState::Menu) {
            GameState::Playing(board) => {
                self.events.push(GameEvent::Paused);
                GameState::Paused(board)
            }
            other => other,
        };
    }

    pub fn resume(&mut self) {
        match std::mem::replace(&mut self.state, GameState::Menu) {
            GameState::Paused(board) => {
                self.events.push(GameEvent::Resumed);
                self.enter_playing(board);
            }
            other => self.state = other,
        }
    }

    /// Pause when playing, resume when paused
    pub fn toggle_pause(&mut self) {
        match self.phase() {
            Phase::Playing => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Menu | Phase::GameOver => {}
        }
    }

    pub fn back_to_menu(&mut self) {
        if self.phase() != Phase::Menu {
            debug!("Back to menu");
            self.state = GameState::Menu;
        }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Start { level, speed } => self.start(level, speed),
            Command::Turn(direction) => self.set_direction(direction),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::TogglePause => self.toggle_pause(),
            Command::Reset => self.reset(),
            Command::BackToMenu => self.back_to_menu(),
        }
    }

    /// Timer parameters while playing, `None` in every other phase
    pub fn clock(&self) -> Option<TickClock> {
        match self.state {
            GameState::Playing(_) => Some(TickClock {
                generation: self.generation,
                period: self.config.tick_interval(),
            }),
            _ => None,
        }
    }

    /// Read-only view of the current state
    pub fn snapshot(&self) -> Snapshot<'_> {
        let board = self.state.board();
        let game_over_reason = match &self.state {
            GameState::GameOver { reason, .. } => Some(*reason),
            _ => None,
        };

        Snapshot {
            phase: self.state.phase(),
            level: self.config.level,
            speed: self.config.speed,
            grid_size: board.map_or(self.config.grid_size(), |b| b.grid_size),
            snake: board.map(|b| b.snake.body.as_slice()).unwrap_or(&[]),
            food: board.and_then(|b| b.food),
            score: board.map_or(0, |b| b.score),
            high_score: self.high_score,
            game_over_reason,
        }
    }

    /// Take the events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn enter_playing(&mut self, board: Board) {
        self.generation += 1;
        self.state = GameState::Playing(board);
    }

    fn finish(&mut self, reason: GameOverReason) {
        self.state = match std::mem::replace(&mut self.state, GameState::Menu) {
            GameState::Playing(board) => {
                info!(
                    "Run over ({reason:?}): score {}, length {}",
                    board.score,
                    board.snake.len()
                );
                GameState::GameOver { board, reason }
            }
            other => other,
        };
    }

    fn record_score(&mut self, score: u32) {
        if score <= self.high_score {
            return;
        }

        self.high_score = score;
        if let Err(err) = self.store.save(score) {
            warn!("Failed to save high score {score}: {err:#}");
        }
        self.events.push(GameEvent::NewHighScore);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStore, MemoryStore};
    use anyhow::{Result, bail};

    fn engine_with(store: MemoryStore) -> GameEngine {
        GameEngine::with_seed(GameConfig::default(), Box::new(store), 7)
    }

    fn engine() -> GameEngine {
        engine_with(MemoryStore::default())
    }

    /// Engine already playing the given board
    fn playing(level: Level, board: Board) -> GameEngine {
        let mut engine = engine();
        engine.start(level, Speed::Normal);
        engine.state = GameState::Playing(board);
        engine.drain_events();
        engine
    }

    fn board(segments: &[(i32, i32)], direction: Direction, food: (i32, i32), size: usize) -> Board {
        let body = segments.iter().map(|&(x, y)| Position::new(x, y)).collect();
        let (fx, fy) = food;
        Board::new(
            Snake::from_segments(body, direction),
            Some(Position::new(fx, fy)),
            size,
        )
    }

    fn current_board(engine: &GameEngine) -> &Board {
        engine.state().board().unwrap()
    }

    struct BrokenStore;

    impl HighScoreStore for BrokenStore {
        fn load(&self) -> Result<u32> {
            bail!("disk on fire")
        }

        fn save(&mut self, _high_score: u32) -> Result<()> {
            bail!("disk on fire")
        }
    }

    #[test]
    fn test_starts_in_menu() {
        let engine = engine();
        assert_eq!(engine.phase(), Phase::Menu);
        assert!(engine.clock().is_none());

        let snapshot = engine.snapshot();
        assert!(snapshot.snake.is_empty());
        assert_eq!(snapshot.food, None);
        assert_eq!(snapshot.grid_size, 15);
    }

    #[test]
    fn test_start() {
        let mut engine = engine();
        engine.start(Level::Rookie, Speed::Slow);

        let board = current_board(&engine);
        assert_eq!(engine.phase(), Phase::Playing);
        assert_eq!(board.grid_size, 15);
        assert_eq!(board.snake.body, vec![Position::new(7, 7)]);
        assert_eq!(board.snake.direction, Direction::Right);
        assert_eq!(board.score, 0);

        let food = board.food.unwrap();
        assert!(!board.snake.occupies(food));
        assert!(board.is_in_bounds(food));

        assert_eq!(engine.drain_events(), vec![GameEvent::Started]);
    }

    #[test]
    fn test_start_centers_on_each_level() {
        let mut engine = engine();

        engine.start(Level::Hacker, Speed::Fast);
        assert_eq!(current_board(&engine).snake.head(), Position::new(9, 9));
        assert_eq!(engine.config(), GameConfig::new(Level::Hacker, Speed::Fast));

        engine.start(Level::Matrix, Speed::Normal);
        assert_eq!(current_board(&engine).snake.head(), Position::new(10, 10));
        assert_eq!(current_board(&engine).grid_size, 20);
    }

    #[test]
    fn test_three_ticks_without_food() {
        let mut engine = playing(Level::Rookie, board(&[(7, 7)], Direction::Right, (10, 10), 15));

        for _ in 0..3 {
            assert_eq!(engine.tick(), TickOutcome::Moved);
        }

        let board = current_board(&engine);
        assert_eq!(board.snake.head(), Position::new(10, 7));
        assert_eq!(board.snake.len(), 1);
        assert_eq!(board.food, Some(Position::new(10, 10)));
        assert_eq!(board.score, 0);
    }

    #[test]
    fn test_move_keeps_length() {
        let mut engine = playing(
            Level::Rookie,
            board(&[(5, 5), (6, 5)], Direction::Left, (0, 0), 15),
        );

        assert_eq!(engine.tick(), TickOutcome::Moved);
        assert_eq!(
            current_board(&engine).snake.body,
            vec![Position::new(4, 5), Position::new(5, 5)]
        );
    }

    #[test]
    fn test_moving_into_neck_is_self_collision() {
        let start = board(&[(5, 5), (4, 5)], Direction::Left, (0, 0), 15);
        let mut engine = playing(Level::Rookie, start.clone());

        assert_eq!(
            engine.tick(),
            TickOutcome::Crashed(CollisionType::SelfCollision)
        );
        assert_eq!(engine.phase(), Phase::GameOver);
        assert_eq!(current_board(&engine).snake.body, start.snake.body);
    }

    #[test]
    fn test_wall_collision() {
        let start = board(&[(0, 5)], Direction::Left, (3, 3), 15);
        let mut engine = playing(Level::Rookie, start.clone());

        assert_eq!(engine.tick(), TickOutcome::Crashed(CollisionType::Wall));
        assert_eq!(engine.phase(), Phase::GameOver);
        assert_eq!(current_board(&engine).snake.body, start.snake.body);
        assert_eq!(
            engine.snapshot().game_over_reason,
            Some(GameOverReason::Collision(CollisionType::Wall))
        );
        assert_eq!(engine.drain_events(), vec![GameEvent::Crashed]);
        assert!(engine.clock().is_none());
    }

    #[test]
    fn test_tail_cell_counts_as_collision() {
        // Head at (5,5) going Up into (5,4), which is the tail
        let mut engine = playing(
            Level::Rookie,
            board(&[(5, 5), (6, 5), (6, 4), (5, 4)], Direction::Up, (0, 0), 15),
        );

        assert_eq!(
            engine.tick(),
            TickOutcome::Crashed(CollisionType::SelfCollision)
        );
    }

    #[test]
    fn test_food_consumption() {
        let store = MemoryStore::default();
        let mut engine = engine_with(store.clone());
        engine.start(Level::Hacker, Speed::Normal);
        engine.state = GameState::Playing(board(&[(5, 5), (4, 5)], Direction::Right, (6, 5), 18));
        engine.drain_events();

        assert_eq!(engine.tick(), TickOutcome::AteFood);

        let board = current_board(&engine);
        assert_eq!(
            board.snake.body,
            vec![Position::new(6, 5), Position::new(5, 5), Position::new(4, 5)]
        );
        assert_eq!(board.score, 20);
        let food = board.food.unwrap();
        assert!(!board.snake.occupies(food));

        assert_eq!(engine.high_score(), 20);
        assert_eq!(store.get(), 20);
        assert_eq!(
            engine.drain_events(),
            vec![GameEvent::AteFood, GameEvent::NewHighScore]
        );
    }

    #[test]
    fn test_score_is_food_count_times_level_points() {
        for level in Level::ALL {
            let mut engine = playing(level, board(&[(2, 2)], Direction::Right, (3, 2), 15));

            for eaten in 1..=4u32 {
                let next = current_board(&engine).snake.head().moved_in_direction(Direction::Right);
                if let GameState::Playing(board) = &mut engine.state {
                    board.food = Some(next);
                }
                assert_eq!(engine.tick(), TickOutcome::AteFood);
                assert_eq!(current_board(&engine).score, eaten * level.number() * 10);
                assert_eq!(current_board(&engine).snake.len(), eaten as usize + 1);
            }
        }
    }

    #[test]
    fn test_reversal_rejected() {
        let headings = [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ];

        for heading in headings {
            let mut engine = playing(Level::Rookie, board(&[(7, 7)], heading, (0, 0), 15));

            engine.set_direction(heading.opposite());
            assert_eq!(current_board(&engine).pending_direction, None, "{heading:?}");
            assert!(engine.drain_events().is_empty(), "{heading:?}");

            engine.tick();
            let expected = Position::new(7, 7).moved_in_direction(heading);
            assert_eq!(current_board(&engine).snake.head(), expected, "{heading:?}");
        }
    }

    #[test]
    fn test_reversal_checked_against_heading() {
        let mut engine = playing(
            Level::Rookie,
            board(&[(7, 7), (6, 7)], Direction::Right, (0, 0), 15),
        );

        engine.set_direction(Direction::Up);
        engine.set_direction(Direction::Down);
        assert_eq!(current_board(&engine).pending_direction, Some(Direction::Down));

        assert_eq!(engine.tick(), TickOutcome::Moved);
        assert_eq!(current_board(&engine).snake.head(), Position::new(7, 8));
    }

    #[test]
    fn test_direction_applies_on_next_tick_only() {
        let mut engine = playing(Level::Rookie, board(&[(7, 7)], Direction::Right, (0, 0), 15));

        engine.set_direction(Direction::Down);
        assert_eq!(current_board(&engine).snake.head(), Position::new(7, 7));
        assert_eq!(current_board(&engine).snake.direction, Direction::Right);
        assert_eq!(engine.drain_events(), vec![GameEvent::Turned]);

        engine.tick();
        assert_eq!(current_board(&engine).snake.head(), Position::new(7, 8));
        assert_eq!(current_board(&engine).snake.direction, Direction::Down);
    }

    #[test]
    fn test_direction_ignored_outside_play() {
        let mut engine = engine();
        engine.set_direction(Direction::Up);
        assert_eq!(engine.phase(), Phase::Menu);

        engine.start(Level::Rookie, Speed::Normal);
        engine.pause();
        engine.set_direction(Direction::Up);
        assert_eq!(current_board(&engine).pending_direction, None);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut engine = engine();
        engine.pause();
        engine.resume();
        assert_eq!(engine.phase(), Phase::Menu);

        engine.start(Level::Rookie, Speed::Normal);
        let first = engine.clock().unwrap();
        let before = current_board(&engine).clone();

        engine.pause();
        assert_eq!(engine.phase(), Phase::Paused);
        assert!(engine.clock().is_none());
        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert_eq!(current_board(&engine), &before);

        engine.pause();
        assert_eq!(engine.phase(), Phase::Paused);

        engine.resume();
        assert_eq!(engine.phase(), Phase::Playing);
        let second = engine.clock().unwrap();
        assert_eq!(second.period, first.period);
        assert_ne!(second.generation, first.generation);
    }

    #[test]
    fn test_toggle_pause() {
        let mut engine = engine();
        engine.start(Level::Rookie, Speed::Normal);

        engine.toggle_pause();
        assert_eq!(engine.phase(), Phase::Paused);
        engine.toggle_pause();
        assert_eq!(engine.phase(), Phase::Playing);

        let events = engine.drain_events();
        assert_eq!(
            events,
            vec![GameEvent::Started, GameEvent::Paused, GameEvent::Resumed]
        );
    }

    #[test]
    fn test_reset_after_game_over() {
        let mut engine = playing(Level::Matrix, board(&[(0, 5)], Direction::Left, (3, 3), 20));
        engine.tick();
        assert_eq!(engine.phase(), Phase::GameOver);

        engine.reset();

        let board = current_board(&engine);
        assert_eq!(engine.phase(), Phase::Playing);
        assert_eq!(board.grid_size, 20);
        assert_eq!(board.score, 0);
        assert_eq!(board.snake.body, vec![Position::new(10, 10)]);
    }

    #[test]
    fn test_reset_ignored_in_menu() {
        let mut engine = engine();
        engine.reset();
        assert_eq!(engine.phase(), Phase::Menu);
    }

    #[test]
    fn test_back_to_menu() {
        let mut engine = engine();
        engine.start(Level::Hacker, Speed::Fast);
        engine.pause();

        engine.back_to_menu();

        assert_eq!(engine.phase(), Phase::Menu);
        assert!(engine.clock().is_none());
        assert_eq!(engine.tick(), TickOutcome::Idle);
        // Selection survives for the menu screen
        assert_eq!(engine.snapshot().level, Level::Hacker);
        assert_eq!(engine.snapshot().grid_size, 18);
    }

    #[test]
    fn test_board_filled_ends_run() {
        let mut engine = playing(
            Level::Rookie,
            board(&[(0, 0), (0, 1), (1, 1)], Direction::Right, (1, 0), 2),
        );

        assert_eq!(engine.tick(), TickOutcome::BoardFilled);
        assert_eq!(engine.phase(), Phase::GameOver);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.game_over_reason, Some(GameOverReason::BoardFilled));
        assert_eq!(snapshot.food, None);
        assert_eq!(snapshot.snake.len(), 4);
        assert_eq!(snapshot.score, 10);
        assert_eq!(engine.drain_events().last(), Some(&GameEvent::BoardCleared));
    }

    #[test]
    fn test_high_score_is_max_across_runs() {
        let store = MemoryStore::new(15);
        let mut engine = engine_with(store.clone());
        assert_eq!(engine.high_score(), 15);

        engine.start(Level::Rookie, Speed::Normal);
        for _ in 0..3 {
            let next = current_board(&engine).snake.head().moved_in_direction(Direction::Right);
            if let GameState::Playing(board) = &mut engine.state {
                board.food = Some(next);
            }
            engine.tick();
        }
        assert_eq!(engine.high_score(), 30);

        engine.reset();
        let next = current_board(&engine).snake.head().moved_in_direction(Direction::Right);
        if let GameState::Playing(board) = &mut engine.state {
            board.food = Some(next);
        }
        engine.tick();

        assert_eq!(current_board(&engine).score, 10);
        assert_eq!(engine.high_score(), 30);
        assert_eq!(store.get(), 30);
    }

    #[test]
    fn test_store_failures_do_not_stop_play() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), Box::new(BrokenStore), 3);
        assert_eq!(engine.high_score(), 0);

        engine.start(Level::Rookie, Speed::Normal);
        engine.state = GameState::Playing(board(&[(7, 7)], Direction::Right, (8, 7), 15));

        assert_eq!(engine.tick(), TickOutcome::AteFood);
        assert_eq!(engine.high_score(), 10);
    }

    #[test]
    fn test_unreadable_high_score_file_is_kept() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, r#"{"high_score": 99"#).unwrap();

        let store = JsonFileStore::new(&path);
        let mut engine = GameEngine::with_seed(GameConfig::default(), Box::new(store), 5);
        assert_eq!(engine.high_score(), 0);

        engine.start(Level::Rookie, Speed::Normal);
        engine.state = GameState::Playing(board(&[(7, 7)], Direction::Right, (8, 7), 15));
        assert_eq!(engine.tick(), TickOutcome::AteFood);

        assert_eq!(JsonFileStore::new(&path).load().unwrap(), 10);
        let backup = std::fs::read_to_string(dir.path().join("scores.json.bak")).unwrap();
        assert_eq!(backup, r#"{"high_score": 99"#);
    }

    #[test]
    fn test_apply_dispatches_commands() {
        let mut engine = engine();

        engine.apply(Command::Start {
            level: Level::Hacker,
            speed: Speed::Slow,
        });
        assert_eq!(engine.phase(), Phase::Playing);

        engine.apply(Command::Turn(Direction::Up));
        assert_eq!(current_board(&engine).pending_direction, Some(Direction::Up));

        engine.apply(Command::Pause);
        assert_eq!(engine.phase(), Phase::Paused);
        engine.apply(Command::Resume);
        assert_eq!(engine.phase(), Phase::Playing);
        engine.apply(Command::TogglePause);
        assert_eq!(engine.phase(), Phase::Paused);
        engine.apply(Command::Reset);
        assert_eq!(engine.phase(), Phase::Playing);
        engine.apply(Command::BackToMenu);
        assert_eq!(engine.phase(), Phase::Menu);
    }

    #[test]
    fn test_clock_period_follows_selection() {
        let mut engine = engine();
        engine.start(Level::Matrix, Speed::Fast);
        assert_eq!(engine.clock().unwrap().period, Duration::from_millis(140));

        engine.start(Level::Rookie, Speed::Slow);
        assert_eq!(engine.clock().unwrap().period, Duration::from_millis(600));
    }

    #[test]
    fn test_seeded_engines_place_food_identically() {
        let mut a = GameEngine::with_seed(GameConfig::default(), Box::new(MemoryStore::default()), 99);
        let mut b = GameEngine::with_seed(GameConfig::default(), Box::new(MemoryStore::default()), 99);

        a.start(Level::Matrix, Speed::Normal);
        b.start(Level::Matrix, Speed::Normal);

        assert_eq!(a.snapshot().food, b.snapshot().food);
    }
}
