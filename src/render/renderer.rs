use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{GameState, Position, RunStatus};
use crate::metrics::GameMetrics;

const SNAKE_COLOR: Color = Color::Rgb(0, 255, 204);
const FOOD_COLOR: Color = Color::Rgb(255, 0, 255);

/// Draws the game; holds no state of its own
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        state: &GameState,
        high_score: u32,
        metrics: &GameMetrics,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(state, high_score, metrics);
        frame.render_widget(stats, chunks[0]);

        // Each cell is two columns wide, plus the border
        let board_width = u16::try_from(state.grid_size * 2 + 2).unwrap_or(u16::MAX);
        let board_height = u16::try_from(state.grid_size + 2).unwrap_or(u16::MAX);
        let board_area = centered(chunks[1], board_width, board_height);

        frame.render_widget(self.render_grid(state), board_area);

        match state.status {
            RunStatus::Running => {}
            RunStatus::NotStarted => {
                let popup = centered(board_area, 30, 7);
                frame.render_widget(Clear, popup);
                frame.render_widget(self.render_title(), popup);
            }
            RunStatus::GameOver => {
                let popup = centered(board_area, 34, 9);
                frame.render_widget(Clear, popup);
                frame.render_widget(self.render_game_over(state), popup);
            }
        }

        let controls = self.render_controls();
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let head = state.snake.head();
        let mut lines = Vec::with_capacity(state.grid_size);

        for y in 0..state.grid_size {
            let mut spans = Vec::with_capacity(state.grid_size);

            for x in 0..state.grid_size {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == head {
                    Span::styled(
                        "██",
                        Style::default()
                            .fg(SNAKE_COLOR)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.snake.occupies(pos) {
                    Span::styled("▓▓", Style::default().fg(SNAKE_COLOR))
                } else if pos == state.food {
                    Span::styled(
                        "● ",
                        Style::default()
                            .fg(FOOD_COLOR)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(SNAKE_COLOR))
                .title(" Snake "),
        )
    }

    fn render_stats(
        &self,
        state: &GameState,
        high_score: u32,
        metrics: &GameMetrics,
    ) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(state.score.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled("High Score: ", label),
            Span::styled(high_score.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
            Span::raw("    "),
            Span::styled("Games: ", label),
            Span::styled(metrics.games_played.to_string(), value),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM))
    }

    fn render_title(&self) -> Paragraph<'_> {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "NEON SNAKE",
                Style::default()
                    .fg(SNAKE_COLOR)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            start_prompt("START"),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(SNAKE_COLOR)),
        )
    }

    fn render_game_over(&self, state: &GameState) -> Paragraph<'_> {
        let mut text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        if state.new_high_score {
            text.push(Line::from(Span::styled(
                "New high score!",
                Style::default().fg(FOOD_COLOR),
            )));
        } else {
            text.push(Line::from(""));
        }

        text.push(Line::from(""));
        text.push(start_prompt("PLAY AGAIN"));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Enter", Style::default().fg(Color::Green)),
            Span::raw(" to start | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn start_prompt(label: &str) -> Line<'_> {
    Line::from(vec![
        Span::styled("Press ", Style::default().fg(Color::Gray)),
        Span::styled(
            "Enter",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" to ", Style::default().fg(Color::Gray)),
        Span::styled(
            label,
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

/// A `width` x `height` rect centred in `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Snake};
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(state: &GameState, high_score: u32) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let renderer = Renderer::new();
        let metrics = GameMetrics::new();

        terminal
            .draw(|frame| renderer.render(frame, state, high_score, &metrics))
            .unwrap();

        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn running_state() -> GameState {
        GameState::new(
            Snake::new(Position::new(10, 10), Direction::Right, 3),
            Position::new(15, 15),
            20,
        )
    }

    #[test]
    fn test_running_board_shows_snake_and_food() {
        let mut state = running_state();
        state.score = 40;
        let screen = draw(&state, 90);

        assert!(screen.contains("Score: 40"));
        assert!(screen.contains("High Score: 90"));
        assert!(screen.contains("██"));
        assert!(screen.contains("▓▓"));
        assert!(screen.contains('●'));
        assert!(!screen.contains("GAME OVER"));
    }

    #[test]
    fn test_title_overlay_before_start() {
        let mut state = running_state();
        state.status = RunStatus::NotStarted;
        let screen = draw(&state, 0);

        assert!(screen.contains("NEON SNAKE"));
        assert!(screen.contains("START"));
    }

    #[test]
    fn test_game_over_overlay() {
        let mut state = running_state();
        state.status = RunStatus::GameOver;
        state.score = 30;
        let screen = draw(&state, 50);

        assert!(screen.contains("GAME OVER"));
        assert!(screen.contains("Final Score: 30"));
        assert!(screen.contains("PLAY AGAIN"));
        assert!(!screen.contains("New high score!"));
    }

    #[test]
    fn test_game_over_flags_new_high_score() {
        let mut state = running_state();
        state.status = RunStatus::GameOver;
        state.score = 50;
        state.new_high_score = true;

        assert!(draw(&state, 50).contains("New high score!"));
    }

    #[test]
    fn test_tying_stored_high_score_is_not_a_record() {
        let mut state = running_state();
        state.status = RunStatus::GameOver;
        state.score = 50;

        let screen = draw(&state, 50);
        assert!(screen.contains("Final Score: 50"));
        assert!(!screen.contains("New high score!"));
    }

    #[test]
    fn test_centered_clips_to_area() {
        let area = Rect::new(0, 0, 10, 4);
        let rect = centered(area, 20, 8);
        assert_eq!(rect, area);

        let rect = centered(Rect::new(0, 0, 10, 10), 4, 2);
        assert_eq!(rect, Rect::new(3, 4, 4, 2));
    }
}
