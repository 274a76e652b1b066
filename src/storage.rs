use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::target::{Difficulty, GameMode};

pub fn high_score_key(mode: GameMode, difficulty: Difficulty) -> String {
    format!(
        "highScore_{}_{}",
        mode.to_string().to_lowercase(),
        difficulty.to_string().to_lowercase()
    )
}

pub fn best_streak_key(mode: GameMode, difficulty: Difficulty) -> String {
    format!(
        "bestStreak_{}_{}",
        mode.to_string().to_lowercase(),
        difficulty.to_string().to_lowercase()
    )
}

/// Key-value persistence for per-mode bests. The session holds this behind
/// a trait so the core never touches a storage backend directly.
pub trait ScoreStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// In-memory store for tests and for running without a writable home dir.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    values: HashMap<String, String>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores all bests in one JSON map under the project config dir.
#[derive(Debug)]
pub struct FileScoreStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileScoreStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::scores_path().unwrap_or_else(|| PathBuf::from("aimdrill_scores.json"));
        Self::with_path(path)
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        let path = p.as_ref().to_path_buf();
        let values = fs::read(&path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<HashMap<String, String>>(&bytes).ok())
            .unwrap_or_default();
        Self { path, values }
    }
}

impl ScoreStore for FileScoreStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&self.values).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn keys_are_lowercase_mode_and_difficulty() {
        assert_eq!(
            high_score_key(GameMode::Gridshot, Difficulty::Medium),
            "highScore_gridshot_medium"
        );
        assert_eq!(
            best_streak_key(GameMode::Precision, Difficulty::Hard),
            "bestStreak_precision_hard"
        );
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryScoreStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "42").unwrap();
        assert_eq!(store.get("k"), Some("42".to_string()));
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");

        let mut store = FileScoreStore::with_path(&path);
        store.set("highScore_gridshot_medium", "17").unwrap();
        store.set("bestStreak_gridshot_medium", "9").unwrap();

        let reloaded = FileScoreStore::with_path(&path);
        assert_eq!(
            reloaded.get("highScore_gridshot_medium"),
            Some("17".to_string())
        );
        assert_eq!(
            reloaded.get("bestStreak_gridshot_medium"),
            Some("9".to_string())
        );
    }

    #[test]
    fn file_store_tolerates_missing_or_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");
        assert_eq!(FileScoreStore::with_path(&path).get("k"), None);

        fs::write(&path, "not json").unwrap();
        assert_eq!(FileScoreStore::with_path(&path).get("k"), None);
    }
}
