use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Key under which the high score lives in the key-value file
pub const HIGH_SCORE_KEY: &str = "snakeHighScore";

/// Durable storage for a single high-score value
pub trait HighScoreStore {
    /// Read the stored high score; a store with nothing saved yields 0
    fn load_high_score(&self) -> Result<u32>;

    /// Overwrite the stored high score
    fn save_high_score(&mut self, score: u32) -> Result<()>;
}

/// Key-value store backed by a JSON object on disk
///
/// Other keys in the file are preserved on write. Values saved as numeric
/// strings (as browser local storage does) are accepted on read.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read high score file {:?}", self.path))?;
        if json.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse high score file {:?}", self.path))?
        {
            Value::Object(entries) => Ok(entries),
            other => bail!("Expected a JSON object in {:?}, found {}", self.path, other),
        }
    }
}

impl HighScoreStore for JsonFileStore {
    fn load_high_score(&self) -> Result<u32> {
        let entries = self.read_entries()?;

        match entries.get(HIGH_SCORE_KEY) {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .with_context(|| format!("High score {} is not a valid score", n)),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .with_context(|| format!("High score {:?} is not a valid score", s)),
            Some(other) => bail!("High score has unexpected type: {}", other),
        }
    }

    fn save_high_score(&mut self, score: u32) -> Result<()> {
        // A corrupt file is replaced rather than blocking the save.
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(HIGH_SCORE_KEY.to_string(), Value::from(score));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(&Value::Object(entries))
            .context("Failed to serialize high score")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write high score to {:?}", self.path))?;

        Ok(())
    }
}

/// In-memory store; nothing survives the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub value: u32,
    /// Number of successful saves
    pub writes: usize,
    /// Make every save fail, to exercise error paths
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: u32) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }
}

impl HighScoreStore for MemoryStore {
    fn load_high_score(&self) -> Result<u32> {
        Ok(self.value)
    }

    fn save_high_score(&mut self, score: u32) -> Result<()> {
        if self.fail_writes {
            bail!("storage unavailable");
        }
        self.value = score;
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_zero() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("scores.json"));
        assert_eq!(store.load_high_score().unwrap(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("scores.json");
        let mut store = JsonFileStore::new(&path);

        store.save_high_score(120).unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load_high_score().unwrap(), 120);
    }

    #[test]
    fn test_save_preserves_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, r#"{ "token": "abc", "snakeHighScore": 10 }"#).unwrap();

        let mut store = JsonFileStore::new(&path);
        store.save_high_score(30).unwrap();

        let entries: Map<String, Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(entries["token"], Value::from("abc"));
        assert_eq!(entries[HIGH_SCORE_KEY], Value::from(30));
    }

    #[test]
    fn test_string_value_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, r#"{ "snakeHighScore": "250" }"#).unwrap();

        assert_eq!(JsonFileStore::new(&path).load_high_score().unwrap(), 250);
    }

    #[test]
    fn test_garbage_value_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, r#"{ "snakeHighScore": -4 }"#).unwrap();
        assert!(JsonFileStore::new(&path).load_high_score().is_err());

        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(JsonFileStore::new(&path).load_high_score().is_err());
    }

    #[test]
    fn test_corrupt_file_is_overwritten_on_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, "not json").unwrap();

        let mut store = JsonFileStore::new(&path);
        store.save_high_score(40).unwrap();
        assert_eq!(store.load_high_score().unwrap(), 40);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::with_value(5);
        assert_eq!(store.load_high_score().unwrap(), 5);

        store.save_high_score(20).unwrap();
        assert_eq!(store.value, 20);
        assert_eq!(store.writes, 1);

        let mut failing = MemoryStore::failing();
        assert!(failing.save_high_score(1).is_err());
        assert_eq!(failing.value, 0);
    }
}
