//! High-score persistence
//!
//! The engine only needs one durable integer. Stores are synchronous and
//! best-effort: callers log failures and keep playing.

pub mod high_score;

pub use high_score::{HIGH_SCORE_KEY, HighScoreStore, JsonFileStore, MemoryStore};
