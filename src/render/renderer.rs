use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{CollisionType, GameOverReason, Level, Phase, Position, Snapshot, Speed};

/// Front-end settings that live outside the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub sound_enabled: bool,
    /// Speed highlighted on the menu screen
    pub selected_speed: Speed,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, snapshot: &Snapshot, hud: &Hud) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let header = self.render_stats(snapshot, hud);
        frame.render_widget(header, chunks[0]);

        // Center the play area horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        match snapshot.phase {
            Phase::Menu => frame.render_widget(self.render_menu(snapshot, hud), game_area),
            Phase::Playing => frame.render_widget(self.render_grid(snapshot), game_area),
            Phase::Paused => {
                let [grid_area, banner_area] = split_banner(game_area);
                frame.render_widget(self.render_grid(snapshot), grid_area);
                frame.render_widget(self.render_paused(), banner_area);
            }
            Phase::GameOver => {
                let [grid_area, banner_area] = split_banner(game_area);
                frame.render_widget(self.render_grid(snapshot), grid_area);
                frame.render_widget(self.render_game_over(snapshot), banner_area);
            }
        }

        let controls = self.render_controls(snapshot.phase);
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, snapshot: &Snapshot) -> Paragraph<'_> {
        let mut lines = Vec::with_capacity(snapshot.grid_size);

        for y in 0..snapshot.grid_size {
            let mut spans = Vec::with_capacity(snapshot.grid_size);

            for x in 0..snapshot.grid_size {
                let pos = Position::new(x as i32, y as i32);

                let cell = if Some(pos) == snapshot.head() {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if snapshot.snake.contains(&pos) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if Some(pos) == snapshot.food {
                    Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        let title = format!(
            " Level {}: {} ({}x{}) ",
            snapshot.level.number(),
            snapshot.level.name(),
            snapshot.grid_size,
            snapshot.grid_size
        );

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, snapshot: &Snapshot, hud: &Hud) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let mut spans = Vec::new();
        if snapshot.phase != Phase::Menu {
            spans.extend([
                Span::styled("Score: ", label),
                Span::styled(
                    snapshot.score.to_string(),
                    value.add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                Span::styled("Speed: ", label),
                Span::styled(snapshot.speed.name(), value),
                Span::raw("    "),
            ]);
        }
        spans.extend([
            Span::styled("High Score: ", label),
            Span::styled(snapshot.high_score.to_string(), value),
            Span::raw("    "),
            Span::styled("Sound: ", label),
            Span::styled(if hud.sound_enabled { "on" } else { "off" }, value),
        ]);

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_menu(&self, snapshot: &Snapshot, hud: &Hud) -> Paragraph<'_> {
        let mut text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "SNAKE GAME",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Choose your difficulty level and speed",
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
        ];

        let speeds: Vec<Span> = [Speed::Slow, Speed::Normal, Speed::Fast]
            .into_iter()
            .flat_map(|speed| {
                let style = if speed == hud.selected_speed {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                [Span::styled(format!(" {} ", speed.name()), style), Span::raw(" ")]
            })
            .collect();
        text.push(Line::from(
            [vec![Span::styled("Speed: ", Style::default().fg(Color::Yellow))], speeds].concat(),
        ));
        text.push(Line::from(""));

        for level in Level::ALL {
            text.push(Line::from(vec![
                Span::styled(
                    format!("[{}] ", level.number()),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("Level {}: {}", level.number(), level.name()),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("  ({}x{})", level.grid_size(), level.grid_size()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }

        if snapshot.high_score > 0 {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(
                format!("High Score: {}", snapshot.high_score),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
        }

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan)),
        )
    }

    fn render_paused(&self) -> Paragraph<'_> {
        Paragraph::new(Line::from(Span::styled(
            "PAUSED",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
    }

    fn render_game_over(&self, snapshot: &Snapshot) -> Paragraph<'_> {
        let (title, color) = match snapshot.game_over_reason {
            Some(GameOverReason::BoardFilled) => ("BOARD CLEARED", Color::Green),
            _ => ("GAME OVER", Color::Red),
        };
        let cause = match snapshot.game_over_reason {
            Some(GameOverReason::Collision(CollisionType::Wall)) => "hit the wall",
            Some(GameOverReason::Collision(CollisionType::SelfCollision)) => "ran into itself",
            Some(GameOverReason::BoardFilled) => "no room left",
            None => "",
        };

        let text = vec![
            Line::from(vec![
                Span::styled(
                    title,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" ({cause})"), Style::default().fg(Color::Gray)),
            ]),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    snapshot.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
    }

    fn render_controls(&self, phase: Phase) -> Paragraph<'_> {
        let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Cyan));

        let spans = match phase {
            Phase::Menu => vec![
                key("1-3"),
                Span::raw(" start level | "),
                key("Tab"),
                Span::raw(" speed | "),
                key("M"),
                Span::raw(" sound | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" quit"),
            ],
            Phase::Playing | Phase::Paused | Phase::GameOver => vec![
                key("↑↓←→"),
                Span::raw(" or "),
                key("WASD"),
                Span::raw(" move | "),
                key("Space"),
                Span::raw(" pause | "),
                key("R"),
                Span::raw(" restart | "),
                key("Esc"),
                Span::raw(" menu | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" quit"),
            ],
        };

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split an area into the grid and a short banner underneath
fn split_banner(area: Rect) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(4)])
        .split(area);
    [chunks[0], chunks[1]]
}
