//! Entry classification for archive import.

use crate::kernel::services::ports::ArchiveConfig;
use crate::models::path;

const OS_METADATA_NAMES: &[&str] = &[
    "__MACOSX",
    ".DS_Store",
    ".Spotlight-V100",
    ".Trashes",
    ".fseventsd",
    ".TemporaryItems",
    "Thumbs.db",
    "desktop.ini",
];

/// Formats that are never text. Decode failure remains the final word on
/// anything this list misses.
const DENIED_EXTENSIONS: &[&str] = &[
    // archives
    "zip", "rar", "7z", "tar", "gz", "tgz", "bz2", "xz", "zst", "lz", "cab", "jar", "war",
    // office documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "pages", "numbers",
    "key",
    // audio / video
    "mp3", "wav", "ogg", "flac", "aac", "m4a", "wma", "mp4", "m4v", "mov", "avi", "mkv", "webm",
    "wmv", "flv",
    // executables / installers
    "exe", "msi", "dmg", "pkg", "deb", "rpm", "apk", "ipa", "app", "iso", "bin", "com",
    // design tools
    "psd", "ai", "sketch", "fig", "xd", "indd", "blend",
    // compiled objects
    "o", "obj", "so", "dll", "dylib", "a", "lib", "class", "pyc", "pyo", "wasm", "rlib",
    // raster images
    "png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "ico", "webp", "heic", "avif",
    // fonts
    "ttf", "otf", "woff", "woff2", "eot",
];

/// Resource forks, Finder/Explorer droppings and similar. These are skipped
/// silently rather than reported.
pub fn is_os_metadata(entry_path: &str) -> bool {
    entry_path
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .any(|segment| OS_METADATA_NAMES.contains(&segment) || segment.starts_with("._"))
}

/// Extensionless names and bare dotfiles count as text.
pub fn is_supported(name: &str, config: &ArchiveConfig) -> bool {
    match path::extension(name) {
        Some(ext) => !DENIED_EXTENSIONS.contains(&ext.as_str()) && !config.denies_extra(&ext),
        None => true,
    }
}

/// Decodes UTF-8 text, dropping a leading BOM. NUL bytes mark binary data
/// even when the bytes happen to be valid UTF-8.
pub fn decode_text(mut bytes: Vec<u8>) -> Option<String> {
    if memchr::memchr(0, &bytes).is_some() {
        return None;
    }
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(..3);
    }
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/archive/classify.rs"]
mod tests;
