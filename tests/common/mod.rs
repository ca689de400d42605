//! Shared test utilities for E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! #[allow(dead_code)]
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_minimal_config();
//!     fixture.command().arg("--help").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    #[cfg(unix)]
    #[allow(unused_imports)]
    pub use super::stub_tools;
    pub use super::TestFixture;
}

/// Common `tarball.conf` snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// Minimal valid configuration.
    pub const MINIMAL: &str = r#"{
  "excludes": [],
  "includes": ["browser", "l10n", "SOURCE_CHANGESET"]
}"#;

    /// Configuration with excludes and a blacklist.
    pub const FULL: &str = r#"{
  "excludes": [
    { "path": "obj-*", "wms": false },
    { "path": "*/test/*.pyc", "wms": true }
  ],
  "includes": ["browser", "l10n", "SOURCE_CHANGESET"],
  "l10n-blacklist": "debian/config/locales.blacklist"
}"#;

    /// Exclude entry without `wms`.
    pub const MISSING_WMS: &str = r#"{
  "excludes": [ { "path": "obj-*" } ],
  "includes": ["browser"]
}"#;

    /// Not JSON at all.
    pub const INVALID_JSON: &str = "excludes = []";
}

/// A PATH directory with `hg` and `tar` stand-ins, enough to get past the
/// dependency check. Both fail if actually run.
#[cfg(unix)]
pub fn stub_tools() -> assert_fs::TempDir {
    use std::os::unix::fs::PermissionsExt;

    let tools = assert_fs::TempDir::new().expect("Failed to create temp directory");
    for tool in ["hg", "tar"] {
        let stub = tools.child(tool);
        stub.write_str("#!/bin/sh\nexit 1\n")
            .expect("Failed to write stub");
        std::fs::set_permissions(stub.path(), std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make stub executable");
    }
    tools
}

/// Default configuration path, relative to the fixture root.
pub const CONFIG_PATH: &str = "debian/config/tarball.conf";

/// A temporary invocation directory with optional configuration.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add `debian/config/tarball.conf` with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file(CONFIG_PATH, content)
    }

    pub fn with_minimal_config(self) -> Self {
        self.with_config(configs::MINIMAL)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn child_path(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    /// A command running in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("orig-tarball");
        cmd.current_dir(self.path())
            .env_remove("ORIG_TARBALL_CACHE")
            .env_remove("ORIG_TARBALL_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    /// `create` with the required flags for a snapshot build.
    pub fn create_command(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.args([
            "create",
            "--repo",
            "https://hg.example.org/releases/mozilla-release",
            "--name",
            "firefox",
            "--application",
            "browser",
        ]);
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
