use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::target::{Difficulty, GameMode};

pub const MIN_TARGET_COUNT: u32 = 1;
pub const MAX_TARGET_COUNT: u32 = 15;
pub const MIN_GAME_TIME_SECS: u32 = 10;
pub const MAX_GAME_TIME_SECS: u32 = 120;
pub const MIN_SIZE_MULTIPLIER: f64 = 0.5;
pub const MAX_SIZE_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub difficulty: Difficulty,
    pub mode: GameMode,
    pub target_count: u32,
    pub game_time_secs: u32,
    pub target_size_multiplier: f64,
    pub lives_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            mode: GameMode::Gridshot,
            target_count: 5,
            game_time_secs: 60,
            target_size_multiplier: 1.0,
            lives_enabled: false,
        }
    }
}

impl Config {
    /// The settings surface validates before handing values over, but the
    /// core clamps anyway so out-of-range input can never break geometry
    /// or session length.
    pub fn clamped(mut self) -> Self {
        self.target_count = self.target_count.clamp(MIN_TARGET_COUNT, MAX_TARGET_COUNT);
        self.game_time_secs = self
            .game_time_secs
            .clamp(MIN_GAME_TIME_SECS, MAX_GAME_TIME_SECS);
        self.target_size_multiplier = self
            .target_size_multiplier
            .clamp(MIN_SIZE_MULTIPLIER, MAX_SIZE_MULTIPLIER);
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("aimdrill_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg.clamped();
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            difficulty: Difficulty::Hard,
            mode: GameMode::Precision,
            target_count: 8,
            game_time_secs: 30,
            target_size_multiplier: 1.5,
            lives_enabled: true,
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn load_clamps_out_of_range_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            target_count: 99,
            game_time_secs: 5,
            target_size_multiplier: 10.0,
            ..Config::default()
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.target_count, MAX_TARGET_COUNT);
        assert_eq!(loaded.game_time_secs, MIN_GAME_TIME_SECS);
        assert_eq!(loaded.target_size_multiplier, MAX_SIZE_MULTIPLIER);
    }

    #[test]
    fn clamped_leaves_valid_values_alone() {
        let cfg = Config::default().clamped();
        assert_eq!(cfg, Config::default());
    }
}
