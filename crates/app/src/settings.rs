//! Settings Management
//!
//! Persists session defaults (tool, color, stroke width, font size) and
//! export preferences to a JSON file in the user's config directory. A
//! missing file means defaults; a broken file is an error the caller can
//! ignore in favor of defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use snipmark_core::{Color, SessionConfig, Tool, DEFAULT_FONT_SIZE};

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Stroke color for new annotations.
    pub color: Color,

    /// Explicit stroke width; `None` uses the active tool's default.
    pub stroke_width: Option<f64>,

    /// Font size for text annotations.
    pub font_size: f64,

    /// Tool selected when a session opens.
    pub tool: Tool,

    /// Whether export defaults to the clipboard sink.
    pub copy_to_clipboard: bool,

    /// Quality used when exporting JPEG files (1-100).
    pub jpeg_quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: Color::RED,
            stroke_width: None,
            font_size: DEFAULT_FONT_SIZE,
            tool: Tool::None,
            copy_to_clipboard: true,
            jpeg_quality: 90,
        }
    }
}

impl Settings {
    /// Session configuration carrying these defaults.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            color: self.color,
            stroke_width: self.stroke_width,
            font_size: self.font_size,
            tool: self.tool,
        }
    }
}

/// Loads and saves [`Settings`] at a fixed storage path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Settings,
    storage_path: PathBuf,
}

impl SettingsStore {
    /// Creates a store pointing at the default storage path.
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            storage_path: Self::default_storage_path(),
        }
    }

    /// Creates a store with a custom storage path (for testing).
    #[cfg(test)]
    pub fn with_storage_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            settings: Settings::default(),
            storage_path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the default storage path for settings
    ///
    /// - macOS: ~/Library/Application Support/snipmark/settings.json
    /// - Linux: ~/.config/snipmark/settings.json
    /// - Windows: %APPDATA%\snipmark\settings.json
    fn default_storage_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("snipmark").join("settings.json")
        } else {
            // Fallback to current directory
            PathBuf::from("settings.json")
        }
    }

    /// Path of the backing settings file.
    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable settings access; call [`SettingsStore::save`] to persist.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Loads settings from disk. A missing file leaves the defaults.
    pub fn load(&mut self) -> Result<(), SettingsError> {
        if !self.storage_path.exists() {
            return Ok(());
        }

        let contents =
            fs::read_to_string(&self.storage_path).map_err(SettingsError::IoError)?;
        self.settings = serde_json::from_str(&contents).map_err(SettingsError::ParseError)?;

        Ok(())
    }

    /// Saves settings to disk.
    pub fn save(&self) -> Result<(), SettingsError> {
        // Ensure parent directory exists
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent).map_err(SettingsError::IoError)?;
        }

        let json =
            serde_json::to_string_pretty(&self.settings).map_err(SettingsError::ParseError)?;
        fs::write(&self.storage_path, json).map_err(SettingsError::IoError)
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during settings operations
#[derive(Debug)]
pub enum SettingsError {
    /// I/O error reading or writing the settings file
    IoError(io::Error),
    /// Settings file contents are not valid JSON
    ParseError(serde_json::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::IoError(e) => write!(f, "Settings I/O error: {}", e),
            SettingsError::ParseError(e) => write!(f, "Settings parse error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::IoError(e) => Some(e),
            SettingsError::ParseError(e) => Some(e),
        }
    }
}
