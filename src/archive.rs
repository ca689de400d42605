//! Archive creation
//!
//! The tarball itself is produced by the system `tar`. This module turns
//! the packaging policy into its argument list and runs it.

use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};
use crate::process;

/// One exclude pattern from the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExcludeRule {
    pub path: String,
    /// Whether `*` in `path` may match across `/`.
    pub wms: bool,
}

impl ExcludeRule {
    fn wildcard_flag(&self) -> &'static str {
        if self.wms {
            "--wildcards-match-slash"
        } else {
            "--no-wildcards-match-slash"
        }
    }
}

/// What goes into the archive and where it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSpec {
    pub includes: Vec<String>,
    pub excludes: Vec<ExcludeRule>,
    pub output: PathBuf,
}

impl ArchiveSpec {
    /// `tar` arguments with every path rooted at `topsrcdir`.
    ///
    /// Excludes come first, each preceded by its wildcard flag, then the
    /// output file, then the includes, all in configuration order.
    pub fn tar_args(&self, topsrcdir: &str) -> Vec<String> {
        let mut args = vec!["-jc".to_string(), "--exclude-vcs".to_string()];
        for exclude in &self.excludes {
            args.push(exclude.wildcard_flag().to_string());
            args.push("--exclude".to_string());
            args.push(format!("{}/{}", topsrcdir, exclude.path));
        }
        args.push("-f".to_string());
        args.push(self.output.display().to_string());
        for include in &self.includes {
            args.push(format!("{}/{}", topsrcdir, include));
        }
        args
    }
}

/// Trait for the archival tool - allows simulating failures in tests
pub trait Archiver: Send + Sync {
    /// Pack `topsrcdir` (a directory inside `cwd`) according to `spec`.
    fn archive(&self, cwd: &Path, topsrcdir: &str, spec: &ArchiveSpec) -> Result<()>;
}

/// The default `Archiver`, running `tar -j` (bzip2).
pub struct TarArchiver;

impl Archiver for TarArchiver {
    fn archive(&self, cwd: &Path, topsrcdir: &str, spec: &ArchiveSpec) -> Result<()> {
        let mut command = Command::new("tar");
        command.args(spec.tar_args(topsrcdir)).current_dir(cwd);

        let message = match process::run(&mut command, true) {
            Ok(output) if output.success() => return Ok(()),
            Ok(output) => format!(
                "tar exited with {}: {}",
                output.status,
                output.stderr.trim()
            ),
            Err(e) => e.to_string(),
        };

        // A failed tar may have written part of the archive
        let output = cwd.join(&spec.output);
        if output.is_file() {
            if let Err(e) = fs::remove_file(&output) {
                warn!("Failed to remove partial archive {}: {}", output.display(), e);
            }
        }

        Err(Error::Archive {
            output: spec.output.display().to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ArchiveSpec {
        ArchiveSpec {
            includes: vec!["browser".to_string(), "l10n".to_string()],
            excludes: vec![
                ExcludeRule {
                    path: "obj-*".to_string(),
                    wms: false,
                },
                ExcludeRule {
                    path: "*/test/*.pyc".to_string(),
                    wms: true,
                },
            ],
            output: PathBuf::from("/build/firefox_68.0+build1.orig.tar.bz2"),
        }
    }

    #[test]
    fn test_tar_args_order() {
        let args = spec().tar_args("firefox-68.0+build1");
        assert_eq!(
            args,
            vec![
                "-jc",
                "--exclude-vcs",
                "--no-wildcards-match-slash",
                "--exclude",
                "firefox-68.0+build1/obj-*",
                "--wildcards-match-slash",
                "--exclude",
                "firefox-68.0+build1/*/test/*.pyc",
                "-f",
                "/build/firefox_68.0+build1.orig.tar.bz2",
                "firefox-68.0+build1/browser",
                "firefox-68.0+build1/l10n",
            ]
        );
    }

    #[test]
    fn test_tar_args_without_excludes() {
        let mut spec = spec();
        spec.excludes.clear();
        let args = spec.tar_args("top");
        assert_eq!(args[2], "-f");
        assert_eq!(args.len(), 6);
    }

    #[test]
    fn test_exclude_rule_deserialize() {
        let rule: ExcludeRule = serde_json::from_str(r#"{"path": "a/*", "wms": true}"#).unwrap();
        assert_eq!(rule.wildcard_flag(), "--wildcards-match-slash");
    }

    #[cfg(unix)]
    #[test]
    #[serial_test::serial]
    fn test_tar_failure_removes_partial_archive() {
        if crate::process::find_executable("tar").is_none() {
            return;
        }
        let temp_dir = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("top/browser")).unwrap();
        fs::write(temp_dir.path().join("top/browser/app.js"), "// app\n").unwrap();
        let output = temp_dir.path().join("out.orig.tar.bz2");
        let spec = ArchiveSpec {
            includes: vec!["browser".to_string(), "no-such-dir".to_string()],
            excludes: Vec::new(),
            output: output.clone(),
        };

        let err = TarArchiver
            .archive(temp_dir.path(), "top", &spec)
            .unwrap_err();

        assert!(matches!(err, Error::Archive { .. }), "{err}");
        assert!(err.to_string().contains("no-such-dir"), "{err}");
        assert!(!output.exists());
    }
}
