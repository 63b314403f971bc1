//! 虚拟路径工具
//!
//! 路径均为以 `/` 分隔的绝对路径；根为 `/`，其余路径不带结尾斜杠。

pub const ROOT: &str = "/";

/// Collapses repeated slashes, drops `.` segments, resolves `..` (clamped at
/// root) and guarantees a single leading slash.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    push_segments(&mut segments, path);
    render(&segments)
}

pub fn join(base: &str, name: &str) -> String {
    let name = name.trim_matches('/');
    if name.is_empty() {
        return base.to_string();
    }
    if base == ROOT || base.is_empty() {
        format!("/{name}")
    } else {
        format!("{}/{name}", base.trim_end_matches('/'))
    }
}

/// Resolves `target` against `base`. Absolute targets restart from root;
/// walking above root clamps to root instead of failing.
pub fn resolve_relative(base: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    if !is_absolute(target) {
        push_segments(&mut segments, base);
    }
    push_segments(&mut segments, target);
    render(&segments)
}

pub fn parent(path: &str) -> String {
    let path = normalize(path);
    match path.rfind('/') {
        Some(0) | None => ROOT.to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Last segment of a path; `None` for root.
pub fn file_name(path: &str) -> Option<&str> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .next_back()
}

pub fn split(path: &str) -> Vec<String> {
    let normalized = normalize(path);
    normalized
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn is_root(path: &str) -> bool {
    normalize(path) == ROOT
}

/// True when `path` lies strictly below `ancestor`.
pub fn is_ancestor(ancestor: &str, path: &str) -> bool {
    if ancestor == ROOT {
        return path != ROOT;
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// Lower-cased extension of a file name. Dotfiles such as `.gitignore`
/// have none; `.eslintrc.json` has `json`.
pub fn extension(name: &str) -> Option<String> {
    let idx = name.rfind('.')?;
    if idx == 0 || idx + 1 == name.len() {
        return None;
    }
    Some(name[idx + 1..].to_ascii_lowercase())
}

/// A node name must be a single, non-empty, non-navigational segment.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || path.starts_with('\\')
}

fn push_segments<'a>(segments: &mut Vec<&'a str>, path: &'a str) {
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
}

fn render(segments: &[&str]) -> String {
    if segments.is_empty() {
        return ROOT.to_string();
    }
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/models/path.rs"]
mod tests;
