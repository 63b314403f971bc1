use crate::models::{DEFAULT_HISTORY_LIMIT, DEFAULT_SAVED_HISTORY_LIMIT};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Live-buffer undo entries kept per open file.
    pub history_limit: usize,
    /// Saved revisions kept per file.
    pub saved_history_limit: usize,
    pub archive: ArchiveConfig,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            saved_history_limit: DEFAULT_SAVED_HISTORY_LIMIT,
            archive: ArchiveConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Extensions rejected on import in addition to the built-in list,
    /// without the leading dot.
    pub extra_denied_extensions: Vec<String>,
    /// Nest every exported entry under `<project name>/`.
    pub wrap_in_project_dir: bool,
}

impl ArchiveConfig {
    pub fn denies_extra(&self, extension: &str) -> bool {
        self.extra_denied_extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
}
