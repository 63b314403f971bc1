use super::*;
use crate::kernel::workspace::Workspace;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

enum Entry<'a> {
    Dir(&'a str),
    File(&'a str, &'a [u8]),
}

fn build_zip(entries: &[Entry<'_>]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for entry in entries {
        match entry {
            Entry::Dir(name) => writer
                .add_directory(*name, SimpleFileOptions::default())
                .unwrap(),
            Entry::File(name, data) => {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(data).unwrap();
            }
        }
    }
    writer.finish().unwrap().into_inner()
}

fn paths(tree: &FileTree) -> Vec<String> {
    tree.walk().iter().map(|n| n.path().to_string()).collect()
}

async fn import(entries: &[Entry<'_>]) -> ImportedArchive {
    import_archive(build_zip(entries), &WorkspaceConfig::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_single_root_folder_is_unwrapped() {
    let imported = import(&[
        Entry::File("project/src/index.ts", b"export {}"),
        Entry::File("project/README.md", b"# project"),
    ])
    .await;

    assert_eq!(imported.single_root_dir_name.as_deref(), Some("project"));
    assert_eq!(
        paths(&imported.tree),
        vec!["/src", "/src/index.ts", "/README.md"]
    );
    assert_eq!(
        imported
            .tree
            .find_by_path("/src/index.ts")
            .and_then(|n| n.content()),
        Some("export {}")
    );
    assert!(imported.unsupported_files.is_empty());
    imported.tree.check_invariants().unwrap();
}

#[tokio::test]
async fn test_unsupported_extensions_are_reported() {
    let imported = import(&[
        Entry::File("notes.txt", b"remember"),
        Entry::File("photo.png", b"\x89PNG"),
        Entry::File("archive.zip", b"PK"),
    ])
    .await;

    assert_eq!(paths(&imported.tree), vec!["/notes.txt"]);
    assert_eq!(imported.single_root_dir_name, None);
    assert_eq!(
        imported.unsupported_files,
        vec![
            UnsupportedFile {
                path: "/archive.zip".to_string(),
                reason: UnsupportedReason::Extension,
            },
            UnsupportedFile {
                path: "/photo.png".to_string(),
                reason: UnsupportedReason::Extension,
            },
        ]
    );
}

#[tokio::test]
async fn test_binary_content_is_reported() {
    let imported = import(&[
        Entry::File("src/main.rs", b"fn main() {}"),
        Entry::File("src/blob.dat", &[0x00, 0x9F, 0x92, 0x96]),
        Entry::File("data.txt", b"plain"),
    ])
    .await;

    assert_eq!(
        imported.unsupported_files,
        vec![UnsupportedFile {
            path: "/src/blob.dat".to_string(),
            reason: UnsupportedReason::Binary,
        }]
    );
    assert!(imported.tree.find_by_path("/src/blob.dat").is_none());
    assert!(imported.tree.find_by_path("/src/main.rs").is_some());
}

#[tokio::test]
async fn test_os_metadata_is_skipped_silently() {
    let imported = import(&[
        Entry::Dir("__MACOSX/"),
        Entry::File("__MACOSX/app/._main.rs", b"\x00\x05\x16\x07"),
        Entry::File("app/.DS_Store", b"\x00\x00"),
        Entry::File("app/main.rs", b"fn main() {}"),
        Entry::File("lib.rs", b""),
    ])
    .await;

    assert_eq!(paths(&imported.tree), vec!["/app", "/app/main.rs", "/lib.rs"]);
    assert!(imported.unsupported_files.is_empty());
}

#[tokio::test]
async fn test_implicit_folders_are_synthesized() {
    let imported = import(&[
        Entry::File("a/b/c/deep.txt", b"deep"),
        Entry::File("top.txt", b"top"),
    ])
    .await;

    assert_eq!(
        paths(&imported.tree),
        vec!["/a", "/a/b", "/a/b/c", "/a/b/c/deep.txt", "/top.txt"]
    );
    assert!(imported.tree.find_by_path("/a/b").unwrap().is_folder());
    imported.tree.check_invariants().unwrap();
}

#[tokio::test]
async fn test_folder_entry_without_parent_entry() {
    let imported = import(&[
        Entry::Dir("docs/src/"),
        Entry::File("src/main.ts", b"main()"),
        Entry::File("README.md", b"# readme"),
    ])
    .await;

    assert!(imported.orphaned.is_empty());
    assert_eq!(
        imported.tree.find_by_path("/src/main.ts").and_then(|n| n.content()),
        Some("main()")
    );
    assert_eq!(paths(&imported.tree), vec!["/src", "/src/main.ts", "/README.md"]);
    assert_eq!(imported.pruned_folders, 2);
    imported.tree.check_invariants().unwrap();
}

#[tokio::test]
async fn test_nested_folder_entry_keeps_its_files() {
    let imported = import(&[
        Entry::Dir("app/lib/"),
        Entry::File("app/lib/util.rs", b"pub fn util() {}"),
        Entry::File("Cargo.toml", b"[package]"),
    ])
    .await;

    assert!(imported.orphaned.is_empty());
    assert_eq!(
        paths(&imported.tree),
        vec!["/app", "/app/lib", "/app/lib/util.rs", "/Cargo.toml"]
    );
}

#[tokio::test]
async fn test_empty_folders_are_pruned() {
    let imported = import(&[
        Entry::Dir("empty/"),
        Entry::Dir("nested/"),
        Entry::Dir("nested/inner/"),
        Entry::Dir("only-images/"),
        Entry::File("only-images/logo.png", b"png"),
        Entry::File("keep/file.md", b"kept"),
        Entry::File("other.md", b""),
    ])
    .await;

    assert_eq!(imported.pruned_folders, 4);
    assert_eq!(paths(&imported.tree), vec!["/keep", "/keep/file.md", "/other.md"]);
}

#[tokio::test]
async fn test_pruning_happens_before_unwrap() {
    let imported = import(&[
        Entry::Dir("project/"),
        Entry::Dir("project/assets/"),
        Entry::File("project/assets/icon.ico", b"ico"),
        Entry::File("project/index.html", b"<html></html>"),
    ])
    .await;

    assert_eq!(imported.single_root_dir_name.as_deref(), Some("project"));
    assert_eq!(paths(&imported.tree), vec!["/index.html"]);
}

#[tokio::test]
async fn test_entry_under_a_file_is_orphaned_at_top_level() {
    let imported = import(&[
        Entry::File("notes", b"a file"),
        Entry::File("notes/todo.txt", b"buy milk"),
        Entry::File("other.txt", b""),
    ])
    .await;

    assert_eq!(imported.orphaned, vec!["/notes/todo.txt".to_string()]);
    assert_eq!(
        imported.tree.find_by_path("/todo.txt").and_then(|n| n.content()),
        Some("buy milk")
    );
    assert_eq!(
        imported.tree.find_by_path("/notes").and_then(|n| n.content()),
        Some("a file")
    );
    imported.tree.check_invariants().unwrap();
}

#[tokio::test]
async fn test_extra_denied_extensions_from_config() {
    let mut config = WorkspaceConfig::default();
    config.archive.extra_denied_extensions = vec!["lock".to_string()];
    let bytes = build_zip(&[
        Entry::File("Cargo.toml", b"[package]"),
        Entry::File("Cargo.lock", b"# generated"),
    ]);

    let imported = import_archive(bytes, &config).await.unwrap();
    assert_eq!(paths(&imported.tree), vec!["/Cargo.toml"]);
    assert_eq!(imported.unsupported_files.len(), 1);
}

#[tokio::test]
async fn test_bom_is_stripped_on_import() {
    let imported = import(&[
        Entry::File("bom.txt", b"\xEF\xBB\xBFhello"),
        Entry::File("plain.txt", b"hello"),
    ])
    .await;
    assert_eq!(
        imported.tree.find_by_path("/bom.txt").and_then(|n| n.content()),
        Some("hello")
    );
}

#[tokio::test]
async fn test_corrupt_archive_is_an_error() {
    let result = import_archive(b"definitely not a zip".to_vec(), &WorkspaceConfig::default()).await;
    assert!(matches!(result, Err(ArchiveError::Zip(_))));
}

#[tokio::test]
async fn test_empty_archive_yields_empty_tree() {
    let imported = import(&[]).await;
    assert!(imported.tree.is_empty());
    assert!(imported.unsupported_files.is_empty());
    assert_eq!(imported.single_root_dir_name, None);
}

#[test]
fn test_blocking_import() {
    let bytes = build_zip(&[
        Entry::File("src/lib.rs", b"pub fn f() {}"),
        Entry::File("Cargo.toml", b"[package]"),
    ]);
    let imported = import_archive_blocking(bytes, &WorkspaceConfig::default()).unwrap();
    assert_eq!(
        paths(&imported.tree),
        vec!["/src", "/src/lib.rs", "/Cargo.toml"]
    );
}

#[tokio::test]
async fn test_workspace_import_replaces_tree() {
    let mut ws = Workspace::default();
    ws.create(None, "stale.txt", NodeKind::File).unwrap();
    ws.update_live("/stale.txt", "draft").unwrap();

    let bytes = build_zip(&[
        Entry::File("project/main.rs", b"fn main() {}"),
        Entry::File("project/image.gif", b"GIF89a"),
    ]);
    let report = ws.import_archive(bytes).await.unwrap();

    assert_eq!(report.single_root_dir_name.as_deref(), Some("project"));
    assert_eq!(report.unsupported_files.len(), 1);
    assert!(ws.find_by_path("/stale.txt").is_none());
    assert!(ws.buffers().open_ids().is_empty());
    assert_eq!(
        ws.find_by_path("/main.rs").and_then(|n| n.content()),
        Some("fn main() {}")
    );
}
