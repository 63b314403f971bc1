//! Headless workspace core: structural mutations, live buffers, services.

pub mod buffers;
pub mod services;
pub mod workspace;

pub use buffers::{ContentBuffers, LiveBuffer};
pub use services::adapters::{
    export_archive, import_archive, import_archive_blocking, ArchiveError, ExportedArchive,
    ImportReport, ImportedArchive, UnsupportedFile, UnsupportedReason,
};
pub use services::ports::{ArchiveConfig, WorkspaceConfig};
pub use workspace::{Mutation, Workspace};
