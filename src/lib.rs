//! # orig-tarball
//!
//! This library assembles reproducible `.orig` source tarballs for a large
//! multi-locale application: a Mercurial source tree plus one translation
//! repository per locale, pinned to matching revisions, checked for
//! completeness and packed under a canonical package version. It backs the
//! `orig-tarball` command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use orig_tarball::locales::LocaleManifest;
//! use orig_tarball::version::VersionSpec;
//!
//! // Release tags map onto Debian-style versions
//! let spec = VersionSpec::from_tag("FIREFOX_68_0b3_BUILD2").unwrap();
//! assert_eq!(spec.resolve("68.0~b3").unwrap().as_str(), "68.0~b3+build2");
//!
//! // Locale manifests keep their file order and platform lists
//! let shipped = LocaleManifest::parse("en-US\nfr linux\nja-JP-mac osx\n");
//! assert_eq!(shipped.len(), 3);
//! assert!(!shipped.entries()[2].ships_on("linux"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The JSON packaging policy (includes,
//!   excludes, blacklist, auxiliary checkouts).
//! - **Repository Management (`repository`, `hg`, `cache`)**: Working
//!   checkouts through optional local mirrors, behind a mockable trait.
//! - **Locales (`locales`)**: Manifests, blacklists, revision maps and the
//!   record of obtained locales.
//! - **Versions (`version`)**: Tag grammar, tilde normalization and the
//!   snapshot/release version formats.
//! - **Metadata (`metadata`)**: Pushlog dates and release-candidate
//!   revision listings fetched over HTTP.
//! - **Archiving (`archive`, `scoped`)**: The `tar` invocation and the
//!   rename that is always undone.
//!
//! ## Execution Flow
//!
//! The main entry point is `phases::orchestrator::execute_build`:
//!
//! 1.  **Probe**: Make sure `hg` and `tar` are installed.
//! 2.  **Pin**: Resolve revisions from a tag or release-candidate metadata.
//! 3.  **Checkout**: Main tree and auxiliary repositories in a temporary root.
//! 4.  **Sync**: One checkout per locale; failures are logged and skipped.
//! 5.  **Validate**: Every locale required on Linux must be present.
//! 6.  **Version**: Resolve and check against the tree's `version.txt`.
//! 7.  **Package**: Archive `<name>-<version>/` into the invocation directory.

pub mod archive;
pub mod cache;
pub mod config;
pub mod error;
pub mod hg;
pub mod locales;
pub mod metadata;
pub mod output;
pub mod phases;
pub mod process;
pub mod repository;
pub mod scoped;
pub mod version;

#[cfg(test)]
mod version_proptest;
