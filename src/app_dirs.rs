use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "aimdrill").map(|pd| pd.config_dir().to_path_buf())
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.json"))
    }

    pub fn scores_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("scores.json"))
    }

    pub fn history_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("history.csv"))
    }
}
