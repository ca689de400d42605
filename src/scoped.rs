//! Side effects undone on scope exit.

use log::{debug, error};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A directory rename that is reverted when the guard is dropped.
///
/// The rename back happens on every exit path, including early returns
/// through `?` and unwinding panics.
#[derive(Debug)]
pub struct ScopedRename {
    from: PathBuf,
    to: PathBuf,
}

impl ScopedRename {
    /// Rename `from` to `to`.
    pub fn new(from: &Path, to: &Path) -> Result<Self> {
        fs::rename(from, to)?;
        debug!("Renamed {} to {}", from.display(), to.display());
        Ok(Self {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        })
    }
}

impl Drop for ScopedRename {
    fn drop(&mut self) {
        match fs::rename(&self.to, &self.from) {
            Ok(()) => debug!("Renamed {} back to {}", self.to.display(), self.from.display()),
            Err(e) => error!(
                "Failed to rename {} back to {}: {}",
                self.to.display(),
                self.from.display(),
                e
            ),
        }
    }
}
