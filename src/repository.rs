//! # Repository Checkouts
//!
//! This module provides the `RepositoryManager`, which produces working
//! checkouts of Mercurial repositories, optionally at a pinned revision or
//! tag, going through a local mirror when a cache root is configured.
//!
//! ## Design
//!
//! Version-control actions sit behind the `VcsOperations` trait. The
//! application uses `DefaultVcsOperations`, which drives the system `hg`
//! binary; tests substitute an in-memory implementation so checkout,
//! caching and locale synchronization can be exercised without a network
//! or an `hg` installation.

use log::info;
use std::fs;
use std::path::Path;

use crate::cache;
use crate::error::{Error, Result};
use crate::hg::TipInfo;

/// Trait for version-control operations - allows mocking in tests
pub trait VcsOperations: Send + Sync {
    /// Cheap probe: is `dir` a healthy working copy?
    fn is_healthy(&self, dir: &Path) -> bool;

    /// Clones `source` (a URL or a local mirror path) into `dest`.
    fn clone_repo(&self, source: &str, dest: &Path) -> Result<()>;

    /// Pulls new changesets from `source` into the repository at `dir`.
    fn pull(&self, dir: &Path, source: &str) -> Result<()>;

    /// Updates the working copy to `revision`, or to tip when `None`.
    fn update(&self, dir: &Path, revision: Option<&str>) -> Result<()>;

    /// Returns the repository tip.
    fn tip(&self, dir: &Path) -> Result<TipInfo>;

    /// Returns the full node of the working copy parent.
    fn parent_node(&self, dir: &Path) -> Result<String>;
}

/// The default implementation of `VcsOperations`, backed by the system `hg`.
pub struct DefaultVcsOperations;

impl VcsOperations for DefaultVcsOperations {
    fn is_healthy(&self, dir: &Path) -> bool {
        crate::hg::summary(dir)
    }

    fn clone_repo(&self, source: &str, dest: &Path) -> Result<()> {
        crate::hg::clone(source, dest)
    }

    fn pull(&self, dir: &Path, source: &str) -> Result<()> {
        crate::hg::pull(dir, source)
    }

    fn update(&self, dir: &Path, revision: Option<&str>) -> Result<()> {
        crate::hg::update(dir, revision)
    }

    fn tip(&self, dir: &Path) -> Result<TipInfo> {
        crate::hg::tip(dir)
    }

    fn parent_node(&self, dir: &Path) -> Result<String> {
        crate::hg::parent_node(dir)
    }
}

/// The main entry point for obtaining working checkouts.
pub struct RepositoryManager {
    vcs: Box<dyn VcsOperations>,
}

impl Default for RepositoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryManager {
    /// Creates a manager backed by the system `hg`.
    pub fn new() -> Self {
        Self {
            vcs: Box::new(DefaultVcsOperations),
        }
    }

    /// Creates a manager with a custom `VcsOperations` implementation.
    pub fn with_operations(vcs: Box<dyn VcsOperations>) -> Self {
        Self { vcs }
    }

    /// Produces a working checkout of `url` in `dest`.
    ///
    /// When `cache_root` is given the mirror named after the URL under it is
    /// refreshed first and the clone is taken from it. After cloning, the
    /// working copy is updated to `revision` (tip when `None`). A failed
    /// update to an explicit revision is reported as `RevisionNotFound`.
    pub fn checkout(
        &self,
        url: &str,
        cache_root: Option<&Path>,
        dest: &Path,
        revision: Option<&str>,
    ) -> Result<()> {
        let mirror = cache_root
            .map(|root| cache::cache_path(root, url))
            .transpose()?;
        self.checkout_from_mirror(url, mirror.as_deref(), dest, revision)
    }

    /// Like [`checkout`](Self::checkout), with an explicit mirror directory.
    pub fn checkout_from_mirror(
        &self,
        url: &str,
        mirror: Option<&Path>,
        dest: &Path,
        revision: Option<&str>,
    ) -> Result<()> {
        let source = match mirror {
            Some(mirror) => {
                info!(
                    "*** Checking out source from {} using cache from {} ***",
                    url,
                    mirror.display()
                );
                cache::ensure_mirror(self.vcs.as_ref(), url, mirror)?;
                mirror.to_string_lossy().into_owned()
            }
            None => {
                info!("*** Checking out source from {} ***", url);
                url.to_string()
            }
        };

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        self.vcs.clone_repo(&source, dest)?;

        self.vcs.update(dest, revision).map_err(|e| match revision {
            Some(rev) => Error::RevisionNotFound {
                revision: rev.to_string(),
                source_repo: url.to_string(),
            },
            None => e,
        })
    }

    /// Tip of the repository checked out at `dir`.
    pub fn tip(&self, dir: &Path) -> Result<TipInfo> {
        self.vcs.tip(dir)
    }

    /// Full node of the working copy parent at `dir`.
    pub fn parent_node(&self, dir: &Path) -> Result<String> {
        self.vcs.parent_node(dir)
    }
}

/// In-memory `VcsOperations` used by unit tests across the crate.
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// An upstream repository known to the mock.
    #[derive(Debug, Clone, Default)]
    pub struct MockRepo {
        pub tip: u64,
        pub revisions: HashSet<String>,
        pub files: Vec<(String, String)>,
    }

    impl MockRepo {
        pub fn new(tip: u64) -> Self {
            Self {
                tip,
                ..Default::default()
            }
        }

        pub fn with_revision(mut self, revision: &str) -> Self {
            self.revisions.insert(revision.to_string());
            self
        }

        pub fn with_file(mut self, path: &str, content: &str) -> Self {
            self.files.push((path.to_string(), content.to_string()));
            self
        }
    }

    #[derive(Debug, Default)]
    struct MockState {
        upstream: HashMap<String, MockRepo>,
        /// Local working copy -> (upstream url, local tip)
        local: HashMap<PathBuf, (String, u64)>,
        calls: Vec<String>,
    }

    /// Shared handle, so a test can keep inspecting state after handing a
    /// boxed clone to a `RepositoryManager`.
    #[derive(Debug, Clone, Default)]
    pub struct MockVcs {
        state: Arc<Mutex<MockState>>,
    }

    pub fn node_for(tip: u64) -> String {
        format!("{:012x}", tip.wrapping_mul(0x9e37_79b9) & 0xffff_ffff_ffff)
    }

    impl MockVcs {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_upstream(&self, url: &str, repo: MockRepo) {
            self.state
                .lock()
                .unwrap()
                .upstream
                .insert(url.to_string(), repo);
        }

        pub fn set_upstream_tip(&self, url: &str, tip: u64) {
            if let Some(repo) = self.state.lock().unwrap().upstream.get_mut(url) {
                repo.tip = tip;
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.state.lock().unwrap().calls.clone()
        }

        pub fn manager(&self) -> RepositoryManager {
            RepositoryManager::with_operations(Box::new(self.clone()))
        }

        fn failure(command: &str, location: &str, stderr: &str) -> Error {
            Error::VcsCommand {
                command: command.to_string(),
                location: location.to_string(),
                stderr: stderr.to_string(),
            }
        }
    }

    impl VcsOperations for MockVcs {
        fn is_healthy(&self, dir: &Path) -> bool {
            let state = self.state.lock().unwrap();
            state.local.contains_key(dir) && dir.join(".hg").is_dir()
        }

        fn clone_repo(&self, source: &str, dest: &Path) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("clone {} {}", source, dest.display()));

            let (url, tip) = match state.local.get(Path::new(source)) {
                Some(local) => local.clone(),
                None => match state.upstream.get(source) {
                    Some(repo) => (source.to_string(), repo.tip),
                    None => {
                        return Err(Self::failure(
                            "hg clone",
                            source,
                            "abort: repository not found",
                        ))
                    }
                },
            };

            if dest.exists() && fs::read_dir(dest)?.next().is_some() {
                return Err(Self::failure(
                    "hg clone",
                    source,
                    "abort: destination is not empty",
                ));
            }
            fs::create_dir_all(dest.join(".hg"))?;
            if let Some(repo) = state.upstream.get(&url) {
                for (path, content) in &repo.files {
                    let full = dest.join(path);
                    if let Some(parent) = full.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(full, content)?;
                }
            }
            state.local.insert(dest.to_path_buf(), (url, tip));
            Ok(())
        }

        fn pull(&self, dir: &Path, source: &str) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("pull {} {}", dir.display(), source));
            let tip = state
                .upstream
                .get(source)
                .map(|repo| repo.tip)
                .ok_or_else(|| Self::failure("hg pull", source, "abort: repository not found"))?;
            match state.local.get_mut(dir) {
                Some(local) if local.0 == source => {
                    local.1 = tip;
                    Ok(())
                }
                Some(_) => Err(Self::failure(
                    "hg pull",
                    source,
                    "abort: repository is unrelated",
                )),
                None => Err(Self::failure("hg pull", source, "abort: no repository found")),
            }
        }

        fn update(&self, dir: &Path, revision: Option<&str>) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!(
                "update {} {}",
                dir.display(),
                revision.unwrap_or("tip")
            ));
            let url = state
                .local
                .get(dir)
                .map(|(url, _)| url.clone())
                .ok_or_else(|| Self::failure("hg update", "", "abort: no repository found"))?;
            if let Some(rev) = revision {
                let known = state
                    .upstream
                    .get(&url)
                    .is_some_and(|repo| repo.revisions.contains(rev));
                if !known {
                    return Err(Self::failure(
                        "hg update",
                        &dir.display().to_string(),
                        &format!("abort: unknown revision '{}'", rev),
                    ));
                }
            }
            Ok(())
        }

        fn tip(&self, dir: &Path) -> Result<TipInfo> {
            let state = self.state.lock().unwrap();
            let (_, tip) = state
                .local
                .get(dir)
                .ok_or_else(|| Self::failure("hg tip", "", "abort: no repository found"))?;
            Ok(TipInfo {
                rev: *tip,
                node: node_for(*tip),
            })
        }

        fn parent_node(&self, dir: &Path) -> Result<String> {
            let tip = self.tip(dir)?;
            Ok(format!("{:0<40}", tip.node))
        }
    }
}
