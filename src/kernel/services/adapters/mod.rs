//! Service adapters: archive codec and settings IO.

pub mod archive;
pub mod settings;

pub use archive::{
    export_archive, import_archive, import_archive_blocking, ArchiveError, ExportedArchive,
    ImportReport, ImportedArchive, UnsupportedFile, UnsupportedReason,
};
pub use settings::{ensure_config_file, load_config, settings_path, SettingsError};
