use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::state::Position;

/// Largest board side, in cells, the game accepts
pub const MAX_GRID_SIZE: usize = 100;

/// Configuration for the game
///
/// The board is square: its side in cells is `display_size / tile_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side of the drawing surface, in pixels
    pub display_size: u32,
    /// Side of one cell, in pixels
    pub tile_size: u32,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Score awarded for each food eaten
    pub food_reward: u32,
    /// Period between two ticks, in milliseconds
    pub tick_interval_ms: u64,
    /// Where the food sits before the first game starts
    pub initial_food: Position,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            display_size: 400,
            tile_size: 20,
            initial_snake_length: 3,
            food_reward: 10,
            tick_interval_ms: 100,
            initial_food: Position::new(15, 15),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a board of `cells` x `cells`
    pub fn new(cells: usize) -> Self {
        let defaults = Self::default();
        Self {
            display_size: cells as u32 * defaults.tile_size,
            ..defaults
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10)
    }

    /// Load a configuration from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))
    }

    /// Number of cells along each side of the board
    pub fn grid_size(&self) -> usize {
        if self.tile_size == 0 {
            return 0;
        }
        (self.display_size / self.tile_size) as usize
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Head position of a freshly started snake (board centre)
    pub fn start_position(&self) -> Position {
        let centre = (self.grid_size() / 2) as i32;
        Position::new(centre, centre)
    }

    /// Reject configurations the engine cannot play on
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            bail!("tile_size must be greater than zero");
        }
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be greater than zero");
        }
        if self.initial_snake_length == 0 {
            bail!("initial_snake_length must be at least 1");
        }

        let grid = self.grid_size();
        if grid > MAX_GRID_SIZE {
            bail!(
                "a {}x{} board exceeds the {}x{} limit",
                grid,
                grid,
                MAX_GRID_SIZE,
                MAX_GRID_SIZE
            );
        }
        // The body trails left of the centre, and there must be room for food.
        if self.initial_snake_length > grid / 2 + 1 || grid * grid <= self.initial_snake_length {
            bail!(
                "a {}x{} board cannot hold a snake of length {}",
                grid,
                grid,
                self.initial_snake_length
            );
        }

        Ok(())
    }
}
