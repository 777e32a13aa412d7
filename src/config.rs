use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entity::DEFAULT_HISTORY_LIMIT;
use crate::error::{NotesError, Result};

const CONFIG_FILE: &str = "config.yaml";

/// Colour scheme applied to note bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Background colour written into the note body for this theme.
    pub fn background_color(&self) -> &'static str {
        match self {
            Theme::Light => "white",
            Theme::Dark => "silver",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Invalid theme: {}", s)),
        }
    }
}

/// Project settings, stored as `.notes/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// Entries kept per undo/redo log; 0 keeps everything
    pub history_limit: usize,
    /// Whether search matches case exactly
    pub case_sensitive_search: bool,
    pub theme: Theme,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            case_sensitive_search: true,
            theme: Theme::default(),
        }
    }
}

impl NotesConfig {
    pub fn path(notes_dir: &Path) -> PathBuf {
        notes_dir.join(CONFIG_FILE)
    }

    /// Load from the project directory, falling back to defaults when the
    /// file does not exist.
    pub fn load(notes_dir: &Path) -> Result<Self> {
        let path = Self::path(notes_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)?;
        serde_yaml::from_str(&text)
            .map_err(|e| NotesError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, notes_dir: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| NotesError::Config(format!("YAML serialization failed: {}", e)))?;
        fs::write(Self::path(notes_dir), yaml)?;
        Ok(())
    }

    /// The history bound in the form `UndoRedoStack` takes.
    pub fn history_capacity(&self) -> Option<usize> {
        (self.history_limit > 0).then_some(self.history_limit)
    }
}
