//! vfs_workspace - in-memory virtual file system for a browser IDE
//!
//! Module layout:
//! - models: paths, the node tree (`FileTree`), bounded edit history
//! - kernel: `Workspace` mutations, live buffers, zip import/export, settings
//! - logging: tracing subscriber setup for embedding hosts

pub mod kernel;
pub mod logging;
pub mod models;

pub use kernel::{
    export_archive, import_archive, import_archive_blocking, ArchiveConfig, ArchiveError,
    ContentBuffers, ExportedArchive, ImportReport, ImportedArchive, Mutation, UnsupportedFile,
    UnsupportedReason, Workspace, WorkspaceConfig,
};
pub use models::{FileTree, FileTreeError, Node, NodeId, NodeKind, NodeSnapshot};
