//! Tree → zip. Exports saved content only; open buffers are ignored.

use super::{ArchiveError, ExportedArchive};
use crate::kernel::services::ports::ArchiveConfig;
use crate::models::FileTree;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Every folder becomes a directory entry (empty ones included), every file
/// a deflated entry holding its saved content.
pub fn export_archive(
    tree: &FileTree,
    project_name: &str,
    config: &ArchiveConfig,
) -> Result<ExportedArchive, ArchiveError> {
    let project_name = project_name.trim();
    if project_name.is_empty() {
        return Err(ArchiveError::EmptyProjectName);
    }

    let prefix = if config.wrap_in_project_dir {
        format!("{}/", project_name.trim_matches('/'))
    } else {
        String::new()
    };

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    if !prefix.is_empty() {
        writer.add_directory(prefix.clone(), entry_options())?;
    }

    let mut files = 0usize;
    let mut folders = 0usize;
    for node in tree.walk() {
        let entry_name = format!("{}{}", prefix, node.path().trim_start_matches('/'));
        match node.content() {
            Some(content) => {
                writer.start_file(entry_name, entry_options())?;
                writer.write_all(content.as_bytes())?;
                files += 1;
            }
            None => {
                writer.add_directory(format!("{entry_name}/"), entry_options())?;
                folders += 1;
            }
        }
    }

    let bytes = writer.finish()?.into_inner();
    tracing::info!(
        project = %project_name,
        files,
        folders,
        size = bytes.len(),
        "archive exported"
    );

    Ok(ExportedArchive {
        file_name: format!("{project_name}.zip"),
        bytes,
    })
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/archive/export.rs"]
mod tests;
