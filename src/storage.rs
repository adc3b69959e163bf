// Storage module - JSON state blobs on disk
//
// All runtime state (notification settings, cooldown map, dispatch history,
// the financial plan) persists as independent pretty-printed JSON files
// under the data directory. Loads are parse-or-default: a missing or
// corrupt blob falls back to the type's default instead of failing, so a
// bad file can never take the alert engine down. There is no transactional
// guarantee across blobs; notifications are best-effort.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths of the persisted state blobs, all rooted in one data directory.
#[derive(Debug, Clone)]
pub struct StateFiles {
    dir: PathBuf,
}

impl StateFiles {
    /// Root the state files in `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).context("Failed to create data directory")?;
        Ok(Self { dir })
    }

    pub fn settings(&self) -> PathBuf {
        self.dir.join("notification_settings.json")
    }

    pub fn cooldown(&self) -> PathBuf {
        self.dir.join("cooldown_state.json")
    }

    pub fn history(&self) -> PathBuf {
        self.dir.join("notification_history.json")
    }

    pub fn plan(&self) -> PathBuf {
        self.dir.join("plan.json")
    }
}

/// Read a JSON blob, falling back to the default on a missing file or
/// malformed content. Malformed content is logged, never fatal.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!("Invalid state file {:?}, using defaults: {}", path, e);
            T::default()
        }),
        Err(_) => T::default(),
    }
}

/// Write a JSON blob, creating the parent directory if needed.
pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create state directory")?;
    }
    let json = serde_json::to_string_pretty(value).context("Failed to serialize state")?;
    fs::write(path, json).with_context(|| format!("Failed to write state file {:?}", path))
}

/// Remove a persisted blob. Missing files are fine.
pub fn remove(path: &Path) {
    let _ = fs::remove_file(path);
}
