//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O, timing or
//! rendering dependencies. Hosts drive it by calling `tick` on a schedule.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use config::{GameConfig, MAX_GRID_SIZE};
pub use engine::{GameEngine, TickResult};
pub use state::{CollisionType, GameState, Position, RunStatus, Snake};
