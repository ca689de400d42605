//! On-disk repository mirrors
//!
//! Each upstream repository gets one reusable mirror directory under a
//! cache root, by default named after the last segment of its URL (locale
//! mirrors are named after the locale code instead). Refreshing a
//! mirror is idempotent: a healthy mirror is pulled and updated in place,
//! anything else at that path is replaced by a fresh clone.

use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::repository::VcsOperations;

/// Last path segment of a repository URL or path, ignoring trailing slashes.
pub fn repo_basename(url: &str) -> Option<&str> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Mirror location of `url` under `cache_root`.
pub fn cache_path(cache_root: &Path, url: &str) -> Result<PathBuf> {
    repo_basename(url)
        .map(|name| cache_root.join(name))
        .ok_or_else(|| Error::Cache {
            message: format!("cannot derive a cache directory name from '{}'", url),
        })
}

/// Ensure `dest` holds an up-to-date mirror of `url`.
///
/// For callers whose mirrors cannot be named after the URL, such as locale
/// repositories that all share the same last path segment.
pub fn ensure_mirror(vcs: &dyn VcsOperations, url: &str, dest: &Path) -> Result<()> {
    if dest.is_dir() {
        if vcs.is_healthy(dest) {
            info!("Cache location {} exists, using it", dest.display());
            vcs.pull(dest, url)?;
            vcs.update(dest, None)?;
            return Ok(());
        }
        warn!(
            "Cache location {} is not a usable repository, recreating it",
            dest.display()
        );
        fs::remove_dir_all(dest)?;
    } else if dest.exists() {
        fs::remove_file(dest)?;
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    info!("Creating cache location {}", dest.display());
    vcs.clone_repo(url, dest)
}
