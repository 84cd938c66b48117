//! Cache directory layout.
//!
//! Working copies live under `<cache root>/<kind>/<host>/<path>`, keyed by
//! the repository URL. The cache holds nothing that cannot be re-cloned.

use std::path::{Path, PathBuf};

/// Directory for the working copy of `url` under `root`.
///
/// The scheme and any user info are dropped and `host:path` scp-style URLs
/// are split like `host/path`, so `https://github.com/org/repo.git` and
/// `git@github.com:org/repo.git` share one cache entry. Empty, `.` and `..`
/// segments are skipped so the result always stays below `root/kind`.
pub fn cache_dir_for(root: &Path, kind: &str, url: &str) -> PathBuf {
    let without_scheme = match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url,
    };
    let without_user = match without_scheme.split_once('@') {
        Some((user, rest)) if !user.contains('/') => rest,
        _ => without_scheme,
    };

    let mut dir = root.join(kind);
    for segment in without_user.split(['/', ':', '\\']) {
        if segment.is_empty() || segment == "." || segment == ".." {
            continue;
        }
        dir.push(segment);
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/cache")
    }

    #[test]
    fn https_url() {
        assert_eq!(
            cache_dir_for(&root(), "state", "https://github.com/org/repo.git"),
            PathBuf::from("/cache/state/github.com/org/repo.git")
        );
    }

    #[test]
    fn scp_style_url_matches_https() {
        assert_eq!(
            cache_dir_for(&root(), "state", "git@github.com:org/repo.git"),
            cache_dir_for(&root(), "state", "https://github.com/org/repo.git"),
        );
    }

    #[test]
    fn kinds_are_separate() {
        assert_ne!(
            cache_dir_for(&root(), "state", "github.com/org/repo"),
            cache_dir_for(&root(), "configuration", "github.com/org/repo"),
        );
    }

    #[test]
    fn local_path_stays_under_root() {
        let dir = cache_dir_for(&root(), "configuration", "/tmp/../upstream");
        assert_eq!(dir, PathBuf::from("/cache/configuration/tmp/upstream"));
    }

    #[test]
    fn user_info_dropped_from_ssh_url() {
        assert_eq!(
            cache_dir_for(&root(), "state", "ssh://git@example.com/org/repo.git"),
            PathBuf::from("/cache/state/example.com/org/repo.git")
        );
    }
}
