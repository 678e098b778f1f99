//! Neon Snake - a terminal Snake game with a persistent high score
//!
//! This library provides:
//! - Core game logic with no I/O or timing (game module)
//! - Keyboard mapping (input module)
//! - TUI rendering (render module)
//! - High-score persistence (storage module)
//! - The interactive host loop and its tick schedule (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod storage;
