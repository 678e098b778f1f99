use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    action::Direction,
    config::GameConfig,
    state::{CollisionType, GameState, Position, RunStatus, Snake},
};
use crate::storage::HighScoreStore;

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickResult {
    /// Whether the game is over (or was never running) after this tick
    pub terminated: bool,
    /// Whether the snake ate food this tick
    pub ate_food: bool,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
    /// Whether this tick raised the high score
    pub new_high_score: bool,
}

/// The game engine that handles all game logic
///
/// Owns the whole game: state, high score and the store it persists to.
/// It has no notion of time; a host calls [`GameEngine::tick`] on its own
/// schedule and [`GameEngine::set_direction`] whenever input arrives.
pub struct GameEngine<S: HighScoreStore> {
    config: GameConfig,
    state: GameState,
    high_score: u32,
    store: S,
    rng: StdRng,
}

impl<S: HighScoreStore> GameEngine<S> {
    /// Create a new engine; the high score is read from `store`.
    /// Fails if `config` describes a board the game cannot be played on.
    pub fn new(config: GameConfig, store: S) -> Result<Self> {
        Self::with_rng(config, store, StdRng::from_entropy())
    }

    /// Create an engine with a deterministic food sequence
    pub fn with_seed(config: GameConfig, store: S, seed: u64) -> Result<Self> {
        Self::with_rng(config, store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, store: S, rng: StdRng) -> Result<Self> {
        config.validate().context("Invalid game configuration")?;

        let high_score = match store.load_high_score() {
            Ok(score) => score,
            Err(err) => {
                tracing::warn!("Failed to load high score, starting from 0: {:#}", err);
                0
            }
        };

        let snake = Snake::new(
            config.start_position(),
            Direction::Right,
            config.initial_snake_length,
        );
        let mut state = GameState::new(snake, config.initial_food, config.grid_size());
        state.status = RunStatus::NotStarted;

        Ok(Self {
            config,
            state,
            high_score,
            store,
            rng,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start a new game, discarding whatever was in progress
    pub fn start(&mut self) {
        let snake = Snake::new(
            self.config.start_position(),
            Direction::Right,
            self.config.initial_snake_length,
        );

        self.state = GameState::new(snake, self.config.initial_food, self.config.grid_size());
        self.spawn_food();

        tracing::info!(
            grid = self.state.grid_size,
            high_score = self.high_score,
            "Game started"
        );
    }

    /// Move the food to a random free cell and return it
    ///
    /// Does not terminate if the snake covers the entire board.
    pub fn spawn_food(&mut self) -> Position {
        let size = self.state.grid_size as i32;
        let food = loop {
            let pos = Position::new(self.rng.gen_range(0..size), self.rng.gen_range(0..size));
            if !self.state.snake.occupies(pos) {
                break pos;
            }
        };

        self.state.food = food;
        tracing::debug!(x = food.x, y = food.y, "Food placed");
        food
    }

    /// Request a turn; returns whether it was committed
    ///
    /// Requests are dropped while the game is not running, after a change has
    /// already been committed this tick, or when they would reverse the snake.
    pub fn set_direction(&mut self, requested: Direction) -> bool {
        let state = &mut self.state;

        if !state.is_running()
            || state.direction_latched
            || state.snake.direction.is_opposite(requested)
        {
            tracing::trace!(?requested, current = ?state.snake.direction, "Direction ignored");
            return false;
        }

        state.snake.direction = requested;
        state.direction_latched = true;
        tracing::debug!(direction = ?requested, "Direction changed");
        true
    }

    /// Advance the game by one cell
    pub fn tick(&mut self) -> TickResult {
        if !self.state.is_running() {
            return TickResult {
                terminated: true,
                ..Default::default()
            };
        }

        self.state.direction_latched = false;
        self.state.ticks += 1;

        let new_head = self
            .state
            .snake
            .head()
            .moved_in_direction(self.state.snake.direction);

        if let Some(collision_type) = self.check_collision(new_head) {
            self.state.status = RunStatus::GameOver;
            tracing::info!(
                score = self.state.score,
                high_score = self.high_score,
                cause = ?collision_type,
                "Game over"
            );

            return TickResult {
                terminated: true,
                collision_type: Some(collision_type),
                ..Default::default()
            };
        }

        let ate_food = new_head == self.state.food;
        self.state.snake.advance_to(new_head, ate_food);

        let mut new_high_score = false;
        if ate_food {
            self.state.score += self.config.food_reward;
            new_high_score = self.record_score();
            self.spawn_food();
        }

        TickResult {
            terminated: false,
            ate_food,
            collision_type: None,
            new_high_score,
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, pos: Position) -> Option<CollisionType> {
        if !self.state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        // The tail has not moved yet, so stepping onto it counts too.
        if self.state.snake.occupies(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Raise and persist the high score if the current score beats it
    fn record_score(&mut self) -> bool {
        if self.state.score <= self.high_score {
            return false;
        }

        self.high_score = self.state.score;
        self.state.new_high_score = true;
        tracing::info!(high_score = self.high_score, "New high score");

        if let Err(err) = self.store.save_high_score(self.high_score) {
            tracing::warn!("Failed to save high score: {:#}", err);
        }
        true
    }
}
