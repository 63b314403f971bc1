use super::*;

#[test]
fn test_normalize() {
    assert_eq!(normalize(""), "/");
    assert_eq!(normalize("/"), "/");
    assert_eq!(normalize("src/main.rs"), "/src/main.rs");
    assert_eq!(normalize("//src///lib//"), "/src/lib");
    assert_eq!(normalize("/a/./b"), "/a/b");
    assert_eq!(normalize("a\\b"), "/a/b");
}

#[test]
fn test_normalize_clamps_parent_segments() {
    assert_eq!(normalize("/a/../../b"), "/b");
    assert_eq!(normalize("/.."), "/");
}

#[test]
fn test_join() {
    assert_eq!(join("/", "a"), "/a");
    assert_eq!(join("/a", "b.txt"), "/a/b.txt");
    assert_eq!(join("/a/", "b"), "/a/b");
    assert_eq!(join("/a", ""), "/a");
}

#[test]
fn test_resolve_relative() {
    assert_eq!(resolve_relative("/src", "lib.rs"), "/src/lib.rs");
    assert_eq!(resolve_relative("/src/kernel", "../models"), "/src/models");
    assert_eq!(resolve_relative("/src", "./a/./b"), "/src/a/b");
    assert_eq!(resolve_relative("/src", "/etc"), "/etc");
}

#[test]
fn test_resolve_relative_past_root_clamps() {
    assert_eq!(resolve_relative("/a", "../../../.."), "/");
    assert_eq!(resolve_relative("/", ".."), "/");
    assert_eq!(resolve_relative("/a/b", "../../../c"), "/c");
}

#[test]
fn test_parent_and_file_name() {
    assert_eq!(parent("/a/b/c"), "/a/b");
    assert_eq!(parent("/a"), "/");
    assert_eq!(parent("/"), "/");
    assert_eq!(file_name("/a/b.txt"), Some("b.txt"));
    assert_eq!(file_name("dir/"), Some("dir"));
    assert_eq!(file_name("/"), None);
}

#[test]
fn test_split() {
    assert_eq!(split("/a//b/c"), vec!["a", "b", "c"]);
    assert!(split("/").is_empty());
}

#[test]
fn test_is_ancestor() {
    assert!(is_ancestor("/a", "/a/b"));
    assert!(is_ancestor("/", "/a"));
    assert!(!is_ancestor("/a", "/a"));
    assert!(!is_ancestor("/a", "/ab/c"));
}

#[test]
fn test_extension() {
    assert_eq!(extension("photo.PNG"), Some("png".to_string()));
    assert_eq!(extension("archive.tar.gz"), Some("gz".to_string()));
    assert_eq!(extension(".gitignore"), None);
    assert_eq!(extension(".eslintrc.json"), Some("json".to_string()));
    assert_eq!(extension("Makefile"), None);
    assert_eq!(extension("trailing."), None);
}

#[test]
fn test_is_valid_name() {
    assert!(is_valid_name("main.rs"));
    assert!(is_valid_name(".env"));
    assert!(!is_valid_name(""));
    assert!(!is_valid_name("."));
    assert!(!is_valid_name(".."));
    assert!(!is_valid_name("a/b"));
}
