//! Zip → normalized tree.

use super::classify;
use super::{ArchiveError, ImportedArchive, UnsupportedFile, UnsupportedReason};
use crate::kernel::services::ports::{ArchiveConfig, WorkspaceConfig};
use crate::models::{path, FileTree, NodeId, NodeKind};
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read};
use tokio::task::JoinSet;
use zip::ZipArchive;

struct RawEntries {
    folders: BTreeSet<String>,
    files: Vec<(String, Vec<u8>)>,
    unsupported: Vec<UnsupportedFile>,
}

/// Reads a zip into a normalized tree. Entries that cannot be used end up in
/// the report; only an unreadable archive is an error.
pub async fn import_archive(
    bytes: Vec<u8>,
    config: &WorkspaceConfig,
) -> Result<ImportedArchive, ArchiveError> {
    let archive_config = config.archive.clone();
    let raw = tokio::task::spawn_blocking(move || read_entries(bytes, &archive_config)).await??;
    let RawEntries {
        folders,
        files,
        mut unsupported,
    } = raw;

    let mut decodes = JoinSet::new();
    for (entry_path, data) in files {
        decodes.spawn_blocking(move || {
            let text = classify::decode_text(data);
            (entry_path, text)
        });
    }

    let mut texts = BTreeMap::new();
    while let Some(joined) = decodes.join_next().await {
        let (entry_path, text) = joined?;
        match text {
            Some(text) => {
                texts.insert(entry_path, text);
            }
            None => unsupported.push(UnsupportedFile {
                path: entry_path,
                reason: UnsupportedReason::Binary,
            }),
        }
    }
    unsupported.sort_by(|a, b| a.path.cmp(&b.path));

    let (mut tree, orphaned) = build_tree(folders, texts, config.saved_history_limit);
    let pruned_folders = tree.prune_empty_folders();
    let single_root_dir_name = tree.unwrap_single_root();

    tracing::info!(
        nodes = tree.len(),
        unsupported = unsupported.len(),
        orphaned = orphaned.len(),
        pruned_folders,
        single_root = ?single_root_dir_name,
        "archive imported"
    );

    Ok(ImportedArchive {
        tree,
        unsupported_files: unsupported,
        single_root_dir_name,
        orphaned,
        pruned_folders,
    })
}

/// Synchronous wrapper for callers without a runtime.
pub fn import_archive_blocking(
    bytes: Vec<u8>,
    config: &WorkspaceConfig,
) -> Result<ImportedArchive, ArchiveError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(import_archive(bytes, config))
}

fn read_entries(
    bytes: Vec<u8>,
    config: &ArchiveConfig,
) -> Result<RawEntries, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut raw = RawEntries {
        folders: BTreeSet::new(),
        files: Vec::new(),
        unsupported: Vec::new(),
    };

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let entry_name = entry.name().to_string();
        if classify::is_os_metadata(&entry_name) {
            tracing::trace!(entry = %entry_name, "skipping os metadata");
            continue;
        }
        let entry_path = path::normalize(&entry_name);
        if path::is_root(&entry_path) {
            continue;
        }
        if entry.is_dir() {
            raw.folders.insert(entry_path);
            continue;
        }

        let name = path::file_name(&entry_path).unwrap_or_default();
        if !classify::is_supported(name, config) {
            raw.unsupported.push(UnsupportedFile {
                path: entry_path,
                reason: UnsupportedReason::Extension,
            });
            continue;
        }

        let mut data = Vec::with_capacity(entry.size().min(16 * 1024 * 1024) as usize);
        if let Err(err) = entry.read_to_end(&mut data) {
            tracing::warn!(entry = %entry_path, error = %err, "entry could not be decompressed");
            raw.unsupported.push(UnsupportedFile {
                path: entry_path,
                reason: UnsupportedReason::Unreadable,
            });
            continue;
        }
        raw.files.push((entry_path, data));
    }

    Ok(raw)
}

/// Registers every ancestor of `entry_path` as a folder unless the path is
/// already claimed.
fn insert_ancestors(entries: &mut BTreeMap<String, Option<String>>, entry_path: &str) {
    let mut ancestor = path::parent(entry_path);
    while !path::is_root(&ancestor) {
        entries.entry(ancestor.clone()).or_insert(None);
        ancestor = path::parent(&ancestor);
    }
}

/// Builds the tree from sorted paths so every folder precedes its contents.
/// Intermediate folders missing from the archive are synthesized. An entry
/// whose parent is not a folder is attached at the top level and reported.
fn build_tree(
    folders: BTreeSet<String>,
    texts: BTreeMap<String, String>,
    saved_history_limit: usize,
) -> (FileTree, Vec<String>) {
    let mut entries: BTreeMap<String, Option<String>> = BTreeMap::new();
    let mut orphaned = Vec::new();
    for folder in folders {
        insert_ancestors(&mut entries, &folder);
        entries.insert(folder, None);
    }
    for (file_path, text) in texts {
        insert_ancestors(&mut entries, &file_path);
        // A folder entry already claims this path; keep the folder.
        if entries.get(&file_path).is_some_and(Option::is_none) {
            tracing::warn!(path = %file_path, "file shadows a folder entry, dropped");
            orphaned.push(file_path);
            continue;
        }
        entries.insert(file_path, Some(text));
    }

    let mut tree = FileTree::with_saved_history_limit(saved_history_limit);
    let mut folder_ids: FxHashMap<String, NodeId> = FxHashMap::default();

    for (entry_path, content) in entries {
        let Some(name) = path::file_name(&entry_path) else {
            continue;
        };
        let parent_path = path::parent(&entry_path);
        let parent = if path::is_root(&parent_path) {
            Some(None)
        } else {
            folder_ids.get(&parent_path).map(|&id| Some(id))
        };
        let parent = match parent {
            Some(parent) => parent,
            None => {
                tracing::warn!(path = %entry_path, "parent unresolved, attaching at top level");
                orphaned.push(entry_path.clone());
                None
            }
        };

        let inserted = match &content {
            Some(text) => tree.insert_file(parent, name, text),
            None => tree.insert(parent, name, NodeKind::Folder),
        };
        match inserted {
            Ok(id) => {
                if content.is_none() {
                    folder_ids.insert(entry_path, id);
                }
            }
            Err(err) => {
                tracing::warn!(path = %entry_path, error = %err, "entry dropped");
                if orphaned.last() != Some(&entry_path) {
                    orphaned.push(entry_path);
                }
            }
        }
    }

    (tree, orphaned)
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/archive/import.rs"]
mod tests;
