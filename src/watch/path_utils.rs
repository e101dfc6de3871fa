// src/watch/path_utils.rs

//! Path helpers shared by discovery and the watch filter.

use std::path::Path;

/// `path` relative to `root`, with forward slashes.
///
/// Tries a plain prefix strip first. Notify may report paths through a
/// different absolute prefix than the one we were given (symlinked temp
/// dirs, `/private/var` on macOS), so on failure both sides are
/// canonicalized and stripped again.
///
/// Returns `None` if `path` is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok()?;
    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}

fn to_slash(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_prefix() {
        assert_eq!(
            relative_str(Path::new("/proj"), Path::new("/proj/sub/a.v")).as_deref(),
            Some("sub/a.v")
        );
    }

    #[test]
    fn unrelated_nonexistent_path_is_none() {
        assert_eq!(
            relative_str(Path::new("/no/such/root"), Path::new("/other/a.v")),
            None
        );
    }
}
