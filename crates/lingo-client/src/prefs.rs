//! Durable client-side preferences.
//!
//! A small JSON snapshot in the platform data directory: the configured
//! server address and the last authenticated user, restoring session and
//! routing across restarts.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use lingo_shared::UserPublic;

use crate::error::PrefsError;

/// Server address assumed when none has been configured.
pub const DEFAULT_SERVER_ADDRESS: &str = "localhost:3001";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Prefs {
    /// User-configured server address (`host:port` or a full URL).
    #[serde(default)]
    pub server_address: Option<String>,

    /// Snapshot of the last authenticated user, secret stripped.
    #[serde(default)]
    pub last_user: Option<UserPublic>,
}

impl Prefs {
    /// Platform-appropriate location of the preferences file,
    /// e.g. `~/.local/share/lingo/prefs.json` on Linux.
    pub fn default_path() -> Result<PathBuf, PrefsError> {
        let project_dirs =
            ProjectDirs::from("com", "lingo", "lingo").ok_or(PrefsError::NoDataDir)?;
        Ok(project_dirs.data_dir().join("prefs.json"))
    }

    /// Load preferences, treating a missing file as defaults.
    pub fn load(path: &Path) -> Result<Self, PrefsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Persist preferences, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), PrefsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// The configured server address, or the default.
    pub fn server_address(&self) -> &str {
        self.server_address
            .as_deref()
            .unwrap_or(DEFAULT_SERVER_ADDRESS)
    }
}
