//! Relative-path and URL segment utilities.
//!
//! Discovered entries carry a slash-normalized relative path which doubles as
//! URL suffix and output name, so it must never contain `..`.

use std::path::{Component, Path};

/// Convert a relative path to a `/`-joined string.
///
/// Returns `None` for paths with `..`, a root, or a drive prefix.
/// `.` components are dropped.
pub fn to_slash(rel: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_owned()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.join("/"))
}

/// Check whether a URL path contains a `..` segment.
///
/// Backslashes count as separators so `..\secret` is caught on every OS.
pub fn has_parent_segment(url_path: &str) -> bool {
    url_path.split(['/', '\\']).any(|segment| segment == "..")
}

/// A decoded URL path is lexically safe when it names no parent segment,
/// no NUL byte, and no drive prefix.
pub fn is_lexically_safe(url_path: &str) -> bool {
    !has_parent_segment(url_path) && !url_path.contains('\0') && !url_path.contains(':')
}
