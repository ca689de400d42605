//! # Locale Manifests
//!
//! Plain-text inputs that drive locale synchronization and validation:
//!
//! - **Locale manifests** (`shipped-locales`, `all-locales`): one locale
//!   per line, optionally followed by the platforms it ships on, e.g.
//!   `ja-JP-mac osx` or `fr linux win32`. Lines starting with `#` are
//!   comments.
//! - **Blacklists**: one locale per line; everything from the first `#`
//!   on is a comment, so a line that is entirely a comment is ignored.
//! - **Revision maps** (`l10n_changesets.txt`): `<locale> <revision>`
//!   pairs pinning each locale repository for a release build.
//!
//! The result of synchronization, `ObtainedLocales`, also lives here: the
//! ordered record of locales that were checked out, each with the changeset
//! it was taken at.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// The source locale. It is never translated and never synchronized.
pub const SOURCE_LOCALE: &str = "en-US";

/// The only platform this build targets.
pub const TARGET_PLATFORM: &str = "linux";

/// One manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleEntry {
    pub code: String,
    /// Platforms the locale ships on. Empty means every platform.
    pub platforms: Vec<String>,
}

impl LocaleEntry {
    pub fn ships_on(&self, platform: &str) -> bool {
        self.platforms.is_empty() || self.platforms.iter().any(|p| p == platform)
    }

    pub fn is_source_locale(&self) -> bool {
        self.code == SOURCE_LOCALE
    }
}

/// An ordered locale manifest, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleManifest {
    entries: Vec<LocaleEntry>,
}

impl LocaleManifest {
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                let code = fields.next()?.to_string();
                Some(LocaleEntry {
                    code,
                    platforms: fields.map(str::to_string).collect(),
                })
            })
            .collect();
        Self { entries }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::InputFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::parse(&content))
    }

    pub fn entries(&self) -> &[LocaleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Locale codes never shipped, regardless of manifest membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    codes: HashSet<String>,
}

impl Blacklist {
    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default().trim())
            .filter(|code| !code.is_empty())
            .collect()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::InputFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::parse(&content))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Blacklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Per-locale revisions for a pinned release build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionMap {
    revisions: HashMap<String, String>,
}

impl RevisionMap {
    /// Parse `<locale> <revision>` lines; `source` names the input in errors.
    pub fn parse(content: &str, source: &str) -> Result<Self> {
        let mut revisions = HashMap::new();
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(locale), Some(revision)) => {
                    revisions.insert(locale.to_string(), revision.to_string());
                }
                _ => {
                    return Err(Error::InputFile {
                        path: source.to_string(),
                        message: format!(
                            "line {}: expected '<locale> <revision>', got '{}'",
                            number + 1,
                            line
                        ),
                    })
                }
            }
        }
        Ok(Self { revisions })
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.revisions.get(locale).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }
}

/// A locale that was checked out successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObtainedLocale {
    code: String,
    changeset: String,
}

impl fmt::Display for ObtainedLocale {
    /// Formats as a `l10n/changesets` line (without newline).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.changeset)
    }
}

/// Locales obtained by synchronization, in processing order.
///
/// Never contains the source locale, and every entry carries a non-empty
/// changeset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObtainedLocales {
    locales: Vec<ObtainedLocale>,
}

impl ObtainedLocales {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `code` as obtained at `changeset`.
    ///
    /// Returns `false`, recording nothing, for the source locale, an empty
    /// changeset or an already recorded code.
    pub fn record(&mut self, code: &str, changeset: &str) -> bool {
        let changeset = changeset.trim();
        if code == SOURCE_LOCALE || changeset.is_empty() || self.contains(code) {
            return false;
        }
        self.locales.push(ObtainedLocale {
            code: code.to_string(),
            changeset: changeset.to_string(),
        });
        true
    }

    pub fn contains(&self, code: &str) -> bool {
        self.locales.iter().any(|l| l.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObtainedLocale> {
        self.locales.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.locales.iter().map(|l| l.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}
