//! # Package Version Resolution
//!
//! The package version is derived in one of two mutually exclusive ways:
//!
//! - **Snapshot**: no release was requested. The tree's declared upstream
//!   version is suffixed with the push date and local revision number of
//!   the checked-out tip: `68.0~a1` becomes `68.0~a1~hg20190701r12345`.
//!
//! - **Release**: a release tag such as `FIREFOX_68_0b3_BUILD2` (or a
//!   `--version`/`--build` pair) is parsed into version components and an
//!   optional build number: `68.0~b3+build2`.
//!
//! ## Tilde convention
//!
//! Pre-release suffixes must sort before the final release, so a `~` is
//! inserted between the leading numeric part of a version and whatever
//! follows it (`68.0a1` → `68.0~a1`, `0b3` → `0~b3`). Purely numeric
//! versions are left untouched.
//!
//! ## Tag grammar
//!
//! `<PRODUCT>_<component>[_<component>...][_BUILD<n>|_RELEASE]`. The first
//! underscore-separated field names the product and is dropped. A `BUILD`
//! or `RELEASE` component terminates the tag: nothing may follow it, and at
//! least one version component must precede it.
//!
//! Whatever the mode, the resolved version must start with the upstream
//! version declared by the tree, otherwise the tag (or version) does not
//! describe the tree that was checked out.

use regex::Regex;
use std::fmt;
use std::path::Path;
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::hg::TipInfo;

/// Version file, relative to the application directory.
pub const VERSION_FILE: &str = "config/version.txt";

/// How the package version is to be derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// Unreleased tip of the tree.
    Snapshot {
        upstream_version: String,
        tip: TipInfo,
        pushed: OffsetDateTime,
    },
    /// A tagged or numbered release build.
    Release {
        components: Vec<String>,
        /// Build number digits, kept as written in the tag.
        build: Option<String>,
    },
}

/// The final package version. Only produced by [`VersionSpec::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion(String);

impl ResolvedVersion {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResolvedVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl VersionSpec {
    /// Parse a release tag into a `Release` spec.
    pub fn from_tag(tag: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidTag {
            tag: tag.to_string(),
            reason,
        };

        let mut components = Vec::new();
        let mut build = None;
        let mut terminated = false;

        for component in tag.split('_').skip(1) {
            if terminated {
                return Err(invalid(format!(
                    "component '{}' follows a terminal marker",
                    component
                )));
            }

            if let Some(number) = component.strip_prefix("BUILD") {
                if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid(format!(
                        "'{}' is not a valid build number",
                        component
                    )));
                }
                build = Some(number.to_string());
                terminated = true;
            } else if component.starts_with("RELEASE") {
                terminated = true;
            } else if component.is_empty() {
                return Err(invalid("empty version component".to_string()));
            } else {
                components.push(normalize_component(component)?);
            }

            if terminated && components.is_empty() {
                return Err(invalid(format!(
                    "'{}' is not preceded by a version",
                    component
                )));
            }
        }

        if components.is_empty() {
            return Err(invalid("no version components".to_string()));
        }

        Ok(VersionSpec::Release { components, build })
    }

    /// A `Release` spec from an explicit version and build number.
    pub fn from_release(version: &str, build: u32) -> Result<Self> {
        let version = version.trim();
        if version.is_empty() {
            return Err(Error::InvalidTag {
                tag: version.to_string(),
                reason: "empty release version".to_string(),
            });
        }
        Ok(VersionSpec::Release {
            components: vec![normalize_upstream(version)?],
            build: Some(build.to_string()),
        })
    }

    /// Compute the package version and check it against `upstream`, the
    /// tilde-normalized version declared by the tree.
    pub fn resolve(&self, upstream: &str) -> Result<ResolvedVersion> {
        let version = match self {
            VersionSpec::Snapshot {
                upstream_version,
                tip,
                pushed,
            } => format!(
                "{}~hg{:04}{:02}{:02}r{}",
                upstream_version,
                pushed.year(),
                u8::from(pushed.month()),
                pushed.day(),
                tip.rev
            ),
            VersionSpec::Release { components, build } => {
                let mut version = components.join(".");
                if let Some(build) = build {
                    version.push_str(&format!("+build{}", build));
                }
                version
            }
        };

        if !version.starts_with(upstream) {
            return Err(Error::VersionMismatch {
                version,
                upstream: upstream.to_string(),
            });
        }

        Ok(ResolvedVersion(version))
    }
}

/// Split `value` into the part matched by `prefix` and the remainder, then
/// join them with `~`, dropping one trailing `~`.
fn insert_tilde(prefix: &str, value: &str) -> Result<String> {
    let regex = Regex::new(prefix).map_err(Error::Regex)?;
    let split = regex.find(value).map(|m| m.end()).unwrap_or(0);
    let (numeric, rest) = value.split_at(split);
    let joined = format!("{}~{}", numeric, rest);
    Ok(joined
        .strip_suffix('~')
        .map(str::to_string)
        .unwrap_or(joined))
}

/// Tilde-normalize a whole dotted version, e.g. `68.0a1` → `68.0~a1`.
pub fn normalize_upstream(raw: &str) -> Result<String> {
    insert_tilde(r"^[0-9.]*", raw.trim())
}

/// Tilde-normalize one tag component, e.g. `0b3` → `0~b3`.
///
/// Components without a leading digit pass through unchanged.
pub fn normalize_component(component: &str) -> Result<String> {
    if !component.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(component.to_string());
    }
    insert_tilde(r"^[0-9]*", component)
}

/// Read and normalize the upstream version declared in `path`.
pub fn read_upstream_version(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::InputFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let declared = content.trim();
    if declared.is_empty() {
        return Err(Error::InputFile {
            path: path.display().to_string(),
            message: "no version declared".to_string(),
        });
    }
    normalize_upstream(declared)
}
