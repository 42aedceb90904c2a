use super::action::Direction;
use super::config::{Level, Speed};

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Heading of the last executed move
    pub direction: Direction,
}

impl Snake {
    /// Create a one-segment snake
    pub fn new(head: Position, direction: Direction) -> Self {
        Self {
            body: vec![head],
            direction,
        }
    }

    /// Create a snake from explicit segments, head first
    pub fn from_segments(body: Vec<Position>, direction: Direction) -> Self {
        assert!(!body.is_empty(), "snake needs at least one segment");
        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Check if any segment, head included, sits on `pos`
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Prepend a new head; the tail is kept only when growing
    pub fn advance_to(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    Collision(CollisionType),
    /// The snake covers every cell, there is nowhere left to put food
    BoardFilled,
}

/// Everything that belongs to a single run
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub snake: Snake,
    /// `None` only once the snake fills the board
    pub food: Option<Position>,
    pub grid_size: usize,
    pub score: u32,
    /// Direction accepted since the last tick, applied by the next one
    pub pending_direction: Option<Direction>,
}

impl Board {
    pub fn new(snake: Snake, food: Option<Position>, grid_size: usize) -> Self {
        Self {
            snake,
            food,
            grid_size,
            score: 0,
            pending_direction: None,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        let size = self.grid_size as i32;
        pos.x >= 0 && pos.x < size && pos.y >= 0 && pos.y < size
    }

    /// Direction the next tick will move in
    pub fn next_direction(&self) -> Direction {
        self.pending_direction.unwrap_or(self.snake.direction)
    }
}

/// Game state machine. Board data lives inside the variants that need it.
#[derive(Debug, Clone, PartialEq)]
pub enum GameState {
    Menu,
    Playing(Board),
    Paused(Board),
    GameOver { board: Board, reason: GameOverReason },
}

impl GameState {
    pub fn phase(&self) -> Phase {
        match self {
            GameState::Menu => Phase::Menu,
            GameState::Playing(_) => Phase::Playing,
            GameState::Paused(_) => Phase::Paused,
            GameState::GameOver { .. } => Phase::GameOver,
        }
    }

    pub fn board(&self) -> Option<&Board> {
        match self {
            GameState::Menu => None,
            GameState::Playing(board) | GameState::Paused(board) => Some(board),
            GameState::GameOver { board, .. } => Some(board),
        }
    }
}

/// Data-free mirror of [`GameState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Read-only view handed to renderers after every tick or command
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<'a> {
    pub phase: Phase,
    pub level: Level,
    pub speed: Speed,
    pub grid_size: usize,
    /// Head first; empty in the menu
    pub snake: &'a [Position],
    pub food: Option<Position>,
    pub score: u32,
    pub high_score: u32,
    pub game_over_reason: Option<GameOverReason>,
}

impl Snapshot<'_> {
    pub fn head(&self) -> Option<Position> {
        self.snake.first().copied()
    }
}
