//! Configuration module for the keychain generator
//!
//! This module handles:
//! - Application state persistence (last inputs, recent generations)
//! - Generator settings (see [`settings`])
//! - Locations of the base model folder and default output file
//!
//! # App Data Location
//!
//! Application data is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/spotify-keychain/`
//! - **macOS**: `~/Library/Application Support/spotify-keychain/`
//! - **Windows**: `%APPDATA%\spotify-keychain\`
//!
//! # Files
//!
//! - `app_state.json` - Last used inputs, recent generations, UI preferences
//! - `generator.toml` - Generator settings
//! - `logs/` - Daily rolling log files

pub mod settings;

pub use settings::*;

use crate::error::{KeychainError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "spotify-keychain";

/// App state filename
pub const APP_STATE_FILE: &str = "app_state.json";

/// Log directory name inside the app data directory
pub const LOG_DIR: &str = "logs";

/// Folder next to the executable that holds base models
pub const BASE_MODELS_DIR: &str = "base_models";

/// Default output filename
pub const DEFAULT_OUTPUT_FILE: &str = "model.stl";

/// Maximum number of recent generations to remember
pub const MAX_RECENT_GENERATIONS: usize = 10;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        KeychainError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            KeychainError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the app state file
pub fn app_state_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(APP_STATE_FILE))
}

/// Get the log directory path
pub fn log_dir() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(LOG_DIR))
}

/// Directory containing the running executable
///
/// Falls back to the working directory when the executable path is unknown.
pub fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default base model folder (`<executable dir>/base_models`)
pub fn default_base_models_dir() -> PathBuf {
    executable_dir().join(BASE_MODELS_DIR)
}

/// Default output file (`<executable dir>/model.stl`)
pub fn default_output_path() -> PathBuf {
    executable_dir().join(DEFAULT_OUTPUT_FILE)
}

// ==================== Recent Generation Entry ====================

/// A keychain generated in an earlier session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentGeneration {
    /// Spotify URI the code was generated for
    pub uri: String,

    /// Exported STL file
    pub output_path: PathBuf,

    /// Base model file name
    pub base_model: String,

    /// Number of relief bars
    pub bar_count: usize,

    /// When the model was written
    pub created_at: DateTime<Utc>,
}

impl RecentGeneration {
    pub fn new(
        uri: impl Into<String>,
        output_path: impl Into<PathBuf>,
        base_model: impl Into<String>,
        bar_count: usize,
    ) -> Self {
        Self {
            uri: uri.into(),
            output_path: output_path.into(),
            base_model: base_model.into(),
            bar_count,
            created_at: Utc::now(),
        }
    }

    /// Check if the exported file still exists
    pub fn exists(&self) -> bool {
        self.output_path.exists()
    }
}

// ==================== App State ====================

/// Persistent application state
///
/// Remembers the last inputs so the window reopens where the user left off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Version for future migration support
    #[serde(default = "default_app_state_version")]
    pub version: u32,

    /// Last URL entered
    #[serde(default)]
    pub last_url: String,

    /// Last output path chosen
    #[serde(default)]
    pub last_output_path: Option<PathBuf>,

    /// File name of the last selected base model
    #[serde(default)]
    pub last_base_model: Option<String>,

    /// Base model folder override
    #[serde(default)]
    pub base_models_dir: Option<PathBuf>,

    /// Recently generated keychains, newest first
    #[serde(default)]
    pub recent_generations: Vec<RecentGeneration>,

    /// UI preferences
    #[serde(default)]
    pub ui_preferences: UiPreferences,
}

fn default_app_state_version() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: 1,
            last_url: String::new(),
            last_output_path: None,
            last_base_model: None,
            base_models_dir: None,
            recent_generations: Vec::new(),
            ui_preferences: UiPreferences::default(),
        }
    }
}

impl AppState {
    /// Load app state from the default location
    pub fn load() -> Result<Self> {
        let path = app_state_path().ok_or_else(|| {
            KeychainError::Config("Could not determine app state path".to_string())
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(path)
    }

    /// Load app state from an explicit file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| KeychainError::Config(format!("Failed to read app state: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| KeychainError::Config(format!("Failed to parse app state: {}", e)))
    }

    /// Load app state, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load app state, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save app state to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(APP_STATE_FILE))
    }

    /// Save app state to an explicit file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| KeychainError::Config(format!("Failed to serialize app state: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| KeychainError::Config(format!("Failed to write app state: {}", e)))
    }

    /// Record a finished generation at the front of the recents list
    pub fn add_recent_generation(&mut self, entry: RecentGeneration) {
        self.recent_generations
            .retain(|g| g.output_path != entry.output_path || g.uri != entry.uri);
        self.recent_generations.insert(0, entry);
        self.recent_generations.truncate(MAX_RECENT_GENERATIONS);
    }

    /// Drop recent generations whose files were deleted
    pub fn cleanup_missing_generations(&mut self) {
        self.recent_generations.retain(|g| g.exists());
    }

    /// Base model folder in effect
    pub fn base_models_dir(&self) -> PathBuf {
        self.base_models_dir
            .clone()
            .unwrap_or_else(default_base_models_dir)
    }

    /// Output path in effect
    pub fn output_path(&self) -> PathBuf {
        self.last_output_path
            .clone()
            .unwrap_or_else(default_output_path)
    }
}

/// UI preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiPreferences {
    /// Enable dark mode
    #[serde(default = "default_true")]
    pub dark_mode: bool,

    /// Font scale factor
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
}

fn default_true() -> bool {
    true
}

fn default_font_scale() -> f32 {
    1.0
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            font_scale: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_default() {
        let state = AppState::default();
        assert!(state.recent_generations.is_empty());
        assert!(state.last_output_path.is_none());
        assert!(state.base_models_dir().ends_with(BASE_MODELS_DIR));
        assert!(state.output_path().ends_with(DEFAULT_OUTPUT_FILE));
    }

    #[test]
    fn test_recent_generations_are_capped_and_deduplicated() {
        let mut state = AppState::default();
        for i in 0..(MAX_RECENT_GENERATIONS + 5) {
            state.add_recent_generation(RecentGeneration::new(
                format!("spotify:track:{}", i),
                format!("/out/model{}.stl", i),
                "keychain.step",
                23,
            ));
        }
        assert_eq!(state.recent_generations.len(), MAX_RECENT_GENERATIONS);
        assert_eq!(state.recent_generations[0].uri, "spotify:track:14");

        let again = RecentGeneration::new("spotify:track:10", "/out/model10.stl", "a.step", 23);
        state.add_recent_generation(again);
        let count = state
            .recent_generations
            .iter()
            .filter(|g| g.uri == "spotify:track:10")
            .count();
        assert_eq!(count, 1);
        assert_eq!(state.recent_generations[0].uri, "spotify:track:10");
    }

    #[test]
    fn test_app_state_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(APP_STATE_FILE);

        let mut state = AppState::default();
        state.last_url = "https://open.spotify.com/track/4cOdK2wGLETKBW3PvgPWqT".to_string();
        state.last_base_model = Some("round.step".to_string());
        state.ui_preferences.dark_mode = false;
        state.save_to(&path).unwrap();

        let loaded = AppState::load_from(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_app_state_tolerates_missing_fields() {
        let state: AppState = serde_json::from_str(r#"{"last_url": "x"}"#).unwrap();
        assert_eq!(state.last_url, "x");
        assert_eq!(state.version, 1);
        assert!(state.ui_preferences.dark_mode);
    }

    #[test]
    fn test_cleanup_missing_generations() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.stl");
        std::fs::write(&kept, b"solid x\nendsolid x\n").unwrap();

        let mut state = AppState::default();
        state.add_recent_generation(RecentGeneration::new("a", &kept, "m.step", 1));
        state.add_recent_generation(RecentGeneration::new(
            "b",
            dir.path().join("gone.stl"),
            "m.step",
            1,
        ));
        state.cleanup_missing_generations();
        assert_eq!(state.recent_generations.len(), 1);
        assert_eq!(state.recent_generations[0].uri, "a");
    }
}
