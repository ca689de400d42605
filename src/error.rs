//! # Error Handling
//!
//! This module defines the centralized error type for `orig-tarball`. It uses
//! `thiserror` to build a single `Error` enum covering every failure mode of
//! a tarball run, each carrying the input that caused it (URL, tag, locale
//! code or path) so the top-level message is actionable on its own.
//!
//! ## Propagation
//!
//! Only per-locale checkout failures are absorbed, by the locale
//! synchronizer, which logs them and drops the locale. Every other variant
//! aborts the whole run:
//!
//! - `DependencyNotFound`: a required external tool is missing from `PATH`.
//! - `RevisionNotFound`: a checkout could not be updated to the requested
//!   revision or tag.
//! - `InvalidTag`: a release tag does not follow the tag grammar.
//! - `VersionMismatch`: the resolved version does not belong to the
//!   checked-out tree.
//! - `LocaleCompleteness`: a required locale is missing after sync.
//! - `Archive`: the archival tool failed.
//!
//! The remaining variants describe configuration, manifest, metadata and
//! version-control plumbing failures.

use thiserror::Error;

/// Main error type for orig-tarball operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required external tool could not be found on `PATH`.
    #[error("Dependency not found: {tool}. Please install package {package}")]
    DependencyNotFound { tool: String, package: String },

    /// The working copy could not be updated to the requested revision.
    #[error("Revision {revision} not found in {source_repo}")]
    RevisionNotFound {
        revision: String,
        source_repo: String,
    },

    /// A release tag does not follow `<PRODUCT>_<component>..._[BUILD<n>|RELEASE]`.
    #[error("Tag {tag} is invalid: {reason}")]
    InvalidTag { tag: String, reason: String },

    /// The resolved version does not start with the tree's upstream version.
    #[error("Version '{version}' does not match upstream version '{upstream}'")]
    VersionMismatch { version: String, upstream: String },

    /// A locale required for the target platform was not obtained.
    #[error("Locale {locale} is missing from the source tarball")]
    LocaleCompleteness { locale: String },

    /// The archival tool failed to produce the tarball.
    #[error("Failed to create archive {output}: {message}")]
    Archive { output: String, message: String },

    /// A version-control command failed.
    #[error("hg command failed in {location}: {command} - {stderr}")]
    VcsCommand {
        command: String,
        location: String,
        stderr: String,
    },

    /// An error occurred with a repository cache operation.
    #[error("Cache operation error: {message}")]
    Cache { message: String },

    /// An error occurred while parsing the tarball configuration file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An input file (locale manifest, revision listing, version file) is
    /// unreadable or malformed.
    #[error("Invalid input file {path}: {message}")]
    InputFile { path: String, message: String },

    /// Revisions are pinned but none is known for this locale.
    #[error("Revision for locale '{locale}' is not present in l10n_changesets.txt")]
    MissingLocaleRevision { locale: String },

    /// Remote metadata could not be fetched or understood.
    #[error("Metadata error for {url}: {message}")]
    Metadata { url: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_dependency_not_found() {
        let error = Error::DependencyNotFound {
            tool: "hg".to_string(),
            package: "mercurial".to_string(),
        };
        let display = format!("{}", error);
        assert_eq!(
            display,
            "Dependency not found: hg. Please install package mercurial"
        );
    }

    #[test]
    fn test_error_display_revision_not_found() {
        let error = Error::RevisionNotFound {
            revision: "FIREFOX_68_0_RELEASE".to_string(),
            source_repo: "https://hg.example.org/l10n/de".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("FIREFOX_68_0_RELEASE"));
        assert!(display.contains("https://hg.example.org/l10n/de"));
    }

    #[test]
    fn test_error_display_invalid_tag() {
        let error = Error::InvalidTag {
            tag: "FIREFOX_BUILD1_68".to_string(),
            reason: "component '68' follows a terminal marker".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.starts_with("Tag FIREFOX_BUILD1_68 is invalid"));
        assert!(display.contains("terminal marker"));
    }

    #[test]
    fn test_error_display_version_mismatch() {
        let error = Error::VersionMismatch {
            version: "67.0+build1".to_string(),
            upstream: "68.0".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("'67.0+build1'"));
        assert!(display.contains("'68.0'"));
    }

    #[test]
    fn test_error_display_locale_completeness() {
        let error = Error::LocaleCompleteness {
            locale: "de".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Locale de is missing from the source tarball"
        );
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "missing field `includes`".to_string(),
            hint: Some("List the top-level paths to pack under 'includes'".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("hint:"));
        assert!(display.contains("'includes'"));
    }

    #[test]
    fn test_error_display_vcs_command() {
        let error = Error::VcsCommand {
            command: "hg pull".to_string(),
            location: "/var/cache/l10n/fr".to_string(),
            stderr: "abort: repository not found".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("hg pull"));
        assert!(display.contains("/var/cache/l10n/fr"));
        assert!(display.contains("repository not found"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{unclosed").unwrap_err();
        let error: Error = json_error.into();
        assert!(format!("{}", error).contains("JSON parsing error"));
    }
}
