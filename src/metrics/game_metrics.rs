use std::time::{Duration, Instant};

/// Per-session counters shown in the header; nothing here is persisted
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub games_played: u32,
    pub best_this_session: u32,
    /// The clock only advances while a game is in progress
    running: bool,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            games_played: 0,
            best_this_session: 0,
            running: false,
        }
    }

    pub fn update(&mut self) {
        if self.running {
            self.elapsed_time = self.start_time.elapsed();
        }
    }

    pub fn on_game_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
        self.running = true;
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.update();
        self.running = false;
        self.games_played += 1;
        self.best_this_session = self.best_this_session.max(final_score);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
