use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::interval;

use super::schedule::TickSchedule;
use crate::game::{GameConfig, GameEngine};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;
use crate::storage::HighScoreStore;

/// Interactive keyboard-driven game in the terminal
pub struct HumanMode<S: HighScoreStore> {
    engine: GameEngine<S>,
    schedule: TickSchedule,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    needs_redraw: bool,
}

impl<S: HighScoreStore> HumanMode<S> {
    pub fn new(config: GameConfig, store: S) -> Result<Self> {
        let schedule = TickSchedule::new(config.tick_interval());

        Ok(Self {
            engine: GameEngine::new(config, store)?,
            schedule,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            needs_redraw: true,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Redraw at most 30 times a second, and only after something changed
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => {
                            return Err(err).context("Failed to read terminal event");
                        }
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick; pending while no game is running
                _ = self.schedule.tick() => {
                    self.update_game();
                }

                // Render frame
                _ = render_timer.tick() => {
                    let previous_time = self.metrics.elapsed_time.as_secs();
                    self.metrics.update();
                    if self.metrics.elapsed_time.as_secs() != previous_time {
                        self.needs_redraw = true;
                    }

                    if self.needs_redraw {
                        let state = self.engine.state();
                        let high_score = self.engine.high_score();
                        terminal.draw(|frame| {
                            self.renderer.render(frame, state, high_score, &self.metrics);
                        }).context("Failed to draw frame")?;
                        self.needs_redraw = false;
                    }
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        tracing::info!(
            games_played = self.metrics.games_played,
            high_score = self.engine.high_score(),
            "Session ended"
        );

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                // Only process key press events, not release
                if key.kind != KeyEventKind::Press {
                    return;
                }

                match self.input_handler.handle_key_event(key) {
                    KeyAction::Steer(direction) => {
                        if self.engine.set_direction(direction) {
                            self.needs_redraw = true;
                        }
                    }
                    KeyAction::Start => self.start_game(),
                    KeyAction::Quit => self.should_quit = true,
                    KeyAction::None => {}
                }
            }
            Event::Resize(_, _) => self.needs_redraw = true,
            _ => {}
        }
    }

    fn update_game(&mut self) {
        let result = self.engine.tick();

        if result.terminated {
            self.schedule.stop();
            if result.collision_type.is_some() {
                self.metrics.on_game_over(self.engine.state().score);
            }
        }

        self.needs_redraw = true;
    }

    /// Start or restart; the old tick schedule is replaced, never doubled
    fn start_game(&mut self) {
        self.engine.start();
        self.schedule.start();
        self.metrics.on_game_start();
        self.needs_redraw = true;
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
