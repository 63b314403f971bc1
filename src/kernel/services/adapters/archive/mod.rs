//! Zip import/export for the virtual tree.

pub mod classify;
pub mod export;
pub mod import;

pub use export::export_archive;
pub use import::{import_archive, import_archive_blocking};

use crate::kernel::workspace::Workspace;
use crate::models::FileTree;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum ArchiveError {
    /// Export was asked for without a usable project name.
    EmptyProjectName,
    Zip(zip::result::ZipError),
    Io(io::Error),
    Task(tokio::task::JoinError),
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::EmptyProjectName => write!(f, "project name must not be empty"),
            ArchiveError::Zip(e) => write!(f, "archive error: {}", e),
            ArchiveError::Io(e) => write!(f, "IO error: {}", e),
            ArchiveError::Task(e) => write!(f, "archive worker failed: {}", e),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::EmptyProjectName => None,
            ArchiveError::Zip(e) => Some(e),
            ArchiveError::Io(e) => Some(e),
            ArchiveError::Task(e) => Some(e),
        }
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(e: zip::result::ZipError) -> Self {
        ArchiveError::Zip(e)
    }
}

impl From<io::Error> for ArchiveError {
    fn from(e: io::Error) -> Self {
        ArchiveError::Io(e)
    }
}

impl From<tokio::task::JoinError> for ArchiveError {
    fn from(e: tokio::task::JoinError) -> Self {
        ArchiveError::Task(e)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// Rejected by extension before decoding.
    Extension,
    /// Not valid text.
    Binary,
    /// The entry's data could not be decompressed.
    Unreadable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsupportedFile {
    /// Path as it appeared in the archive, normalized.
    pub path: String,
    pub reason: UnsupportedReason,
}

#[derive(Debug)]
pub struct ImportedArchive {
    pub tree: FileTree,
    pub unsupported_files: Vec<UnsupportedFile>,
    /// Name of the lone top-level folder that was unwrapped, if any.
    pub single_root_dir_name: Option<String>,
    /// Entries whose parent could not be resolved. They were attached at the
    /// top level when possible, dropped otherwise.
    pub orphaned: Vec<String>,
    pub pruned_folders: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub unsupported_files: Vec<UnsupportedFile>,
    pub single_root_dir_name: Option<String>,
    pub orphaned: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ExportedArchive {
    /// Suggested download name, `<project>.zip`.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Workspace {
    /// Replaces the workspace with an imported tree.
    pub fn load_imported(&mut self, imported: ImportedArchive) -> ImportReport {
        let ImportedArchive {
            tree,
            unsupported_files,
            single_root_dir_name,
            orphaned,
            ..
        } = imported;
        self.replace_tree(tree);
        ImportReport {
            unsupported_files,
            single_root_dir_name,
            orphaned,
        }
    }

    pub async fn import_archive(&mut self, bytes: Vec<u8>) -> Result<ImportReport, ArchiveError> {
        let imported = import_archive(bytes, self.config()).await?;
        Ok(self.load_imported(imported))
    }

    pub fn export_archive(&self, project_name: &str) -> Result<ExportedArchive, ArchiveError> {
        export_archive(self.tree(), project_name, &self.config().archive)
    }
}
