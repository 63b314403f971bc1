use crate::kernel::services::ports::WorkspaceConfig;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR: &str = ".vfs_workspace";
pub const CONFIG_FILE: &str = "settings.json";

#[derive(Debug)]
pub enum SettingsError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "settings IO error: {}", e),
            SettingsError::Parse(e) => write!(f, "invalid settings: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<io::Error> for SettingsError {
    fn from(e: io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

/// `<base>/.vfs_workspace/settings.json`
pub fn settings_path(base: &Path) -> PathBuf {
    base.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Writes the default settings if the file does not exist yet.
pub fn ensure_config_file(path: &Path) -> Result<PathBuf, SettingsError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&WorkspaceConfig::default())?;
        std::fs::write(path, content)?;
    }
    Ok(path.to_path_buf())
}

/// A missing file yields the defaults; a malformed one is an error.
pub fn load_config(path: &Path) -> Result<WorkspaceConfig, SettingsError> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(WorkspaceConfig::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config = serde_json::from_str(&data)?;
    Ok(config)
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
