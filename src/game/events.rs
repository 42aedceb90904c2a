/// Discrete events emitted by the engine for an audio collaborator.
/// They carry no payload beyond their kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEvent {
    Started,
    Turned,
    AteFood,
    NewHighScore,
    Crashed,
    BoardCleared,
    Paused,
    Resumed,
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::Started => "started",
            GameEvent::Turned => "turned",
            GameEvent::AteFood => "ate_food",
            GameEvent::NewHighScore => "new_high_score",
            GameEvent::Crashed => "crashed",
            GameEvent::BoardCleared => "board_cleared",
            GameEvent::Paused => "paused",
            GameEvent::Resumed => "resumed",
        }
    }
}
