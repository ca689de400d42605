//! Locale synchronization
//!
//! Checks out one l10n repository per locale into `l10n/<code>`, strictly
//! one at a time and in manifest order, and records the changeset each
//! was taken at in `l10n/changesets`.
//!
//! A locale whose checkout fails is logged, its partial directory removed,
//! and synchronization moves on: whether the missing locale matters is
//! decided later by validation. Failing to find a pinned revision for a
//! locale is not a checkout failure and aborts the run.

use log::{info, warn};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::locales::{Blacklist, LocaleManifest, ObtainedLocales, RevisionMap, SOURCE_LOCALE};
use crate::repository::RepositoryManager;

/// Name of the changeset manifest inside the l10n directory.
pub const CHANGESETS_FILE: &str = "changesets";

/// Placeholder for the locale code in an l10n base template.
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

/// Which revision each locale repository is updated to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalePins {
    /// Tip of every repository.
    Unpinned,
    /// The same release tag everywhere.
    Tag(String),
    /// Per-locale revisions; every synchronized locale must be listed.
    Revisions(RevisionMap),
}

impl LocalePins {
    fn revision_for(&self, code: &str) -> Result<Option<&str>> {
        match self {
            LocalePins::Unpinned => Ok(None),
            LocalePins::Tag(tag) => Ok(Some(tag)),
            LocalePins::Revisions(map) => {
                map.get(code)
                    .map(Some)
                    .ok_or_else(|| Error::MissingLocaleRevision {
                        locale: code.to_string(),
                    })
            }
        }
    }
}

/// Repository URL of `code` given an l10n base.
///
/// The base is either a template containing `{locale}` or a prefix the
/// code is appended to as a path segment.
pub fn locale_repo_url(l10n_base: &str, code: &str) -> String {
    if l10n_base.contains(LOCALE_PLACEHOLDER) {
        l10n_base.replace(LOCALE_PLACEHOLDER, code)
    } else {
        format!("{}/{}", l10n_base.trim_end_matches('/'), code)
    }
}

/// Drives per-locale checkouts.
pub struct LocaleSynchronizer<'a> {
    pub manager: &'a RepositoryManager,
    pub l10n_base: &'a str,
    /// Cache root for locale mirrors (already including the `l10n` level).
    /// Each mirror is named after its locale code.
    pub cache_root: Option<PathBuf>,
    pub pins: &'a LocalePins,
    pub blacklist: &'a Blacklist,
}

impl LocaleSynchronizer<'_> {
    /// Synchronize every locale of `manifests` into `l10n_dir`.
    ///
    /// Manifests are processed in order and a code is attempted at most
    /// once across all of them. The source locale and blacklisted codes
    /// are never attempted.
    pub fn run(&self, manifests: &[LocaleManifest], l10n_dir: &Path) -> Result<ObtainedLocales> {
        fs::create_dir_all(l10n_dir)?;

        let mut obtained = ObtainedLocales::new();
        let mut attempted: HashSet<&str> = HashSet::new();

        for entry in manifests.iter().flat_map(|m| m.entries()) {
            let code = entry.code.as_str();
            if code == SOURCE_LOCALE || !attempted.insert(code) {
                continue;
            }
            if self.blacklist.contains(code) {
                info!("Not checking out blacklisted locale {}", code);
                continue;
            }

            let revision = self.pins.revision_for(code)?;
            let dest = l10n_dir.join(code);

            match self.checkout_locale(code, revision, &dest) {
                Ok(changeset) => {
                    obtained.record(code, &changeset);
                    info!("Got changeset {} for {}", changeset, code);
                }
                Err(e) => {
                    warn!("Failed to checkout {}: {}", code, e);
                    if dest.exists() {
                        fs::remove_dir_all(&dest)?;
                    }
                }
            }
        }

        let mut changesets = fs::File::create(l10n_dir.join(CHANGESETS_FILE))?;
        for locale in obtained.iter() {
            writeln!(changesets, "{}", locale)?;
        }
        changesets.flush()?;
        info!("Obtained {} locales", obtained.len());
        Ok(obtained)
    }

    fn checkout_locale(&self, code: &str, revision: Option<&str>, dest: &Path) -> Result<String> {
        let url = locale_repo_url(self.l10n_base, code);
        let mirror = self.cache_root.as_ref().map(|root| root.join(code));
        self.manager
            .checkout_from_mirror(&url, mirror.as_deref(), dest, revision)?;
        let changeset = self.manager.tip(dest)?.to_string();
        if changeset.trim().is_empty() {
            return Err(Error::VcsCommand {
                command: "hg tip".to_string(),
                location: dest.display().to_string(),
                stderr: "empty changeset".to_string(),
            });
        }
        Ok(changeset)
    }
}
