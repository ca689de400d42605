//! # Tarball Configuration
//!
//! The packaging policy of a source package lives in a small JSON file,
//! conventionally `debian/config/tarball.conf`:
//!
//! ```json
//! {
//!   "excludes": [ { "path": "obj-*", "wms": false } ],
//!   "includes": [ "browser", "l10n", "SOURCE_CHANGESET" ],
//!   "l10n-blacklist": "debian/config/locales.blacklist",
//!   "auxiliary-checkouts": [
//!     { "url": "https://hg.mozilla.org/build/compare-locales",
//!       "path": "python/compare-locales" }
//!   ]
//! }
//! ```
//!
//! - `excludes`: paths (relative to the versioned top directory) passed to
//!   the archival tool as `--exclude` patterns. `wms` selects whether `*`
//!   may match across `/` for that entry.
//! - `includes`: top-level paths that make up the archive, in order.
//! - `l10n-blacklist`: optional file of locale codes never shipped,
//!   resolved against the invocation directory.
//! - `auxiliary-checkouts`: extra repositories checked out into the tree.
//! - `candidates-url`: base URL of published release-candidate metadata.

use serde::Deserialize;
use std::path::Path;

use crate::archive::ExcludeRule;
use crate::error::{Error, Result};

/// Default location of the configuration, relative to the invocation directory.
pub const DEFAULT_CONFIG_PATH: &str = "debian/config/tarball.conf";

/// Default base URL for release-candidate metadata.
pub const DEFAULT_CANDIDATES_URL: &str = "https://ftp.mozilla.org/pub";

/// Parsed `tarball.conf`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TarballConfig {
    pub excludes: Vec<ExcludeRule>,
    pub includes: Vec<String>,
    #[serde(default)]
    pub l10n_blacklist: Option<String>,
    #[serde(default)]
    pub auxiliary_checkouts: Vec<AuxiliaryCheckout>,
    #[serde(default)]
    pub candidates_url: Option<String>,
}

/// An extra repository checked out into the assembled tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuxiliaryCheckout {
    pub url: String,
    /// Destination relative to the auxiliary source-tree subdirectory.
    pub path: String,
    /// Pinned revision. When absent the release tag is used if there is one.
    #[serde(default)]
    pub revision: Option<String>,
}

impl TarballConfig {
    pub fn candidates_url(&self) -> &str {
        self.candidates_url
            .as_deref()
            .unwrap_or(DEFAULT_CANDIDATES_URL)
    }
}

/// Parse a configuration from its JSON text.
pub fn parse(json_content: &str) -> Result<TarballConfig> {
    let config: TarballConfig =
        serde_json::from_str(json_content).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            hint: hint_for(&e),
        })?;

    if config.includes.is_empty() {
        return Err(Error::ConfigParse {
            message: "'includes' is empty, the archive would contain nothing".to_string(),
            hint: Some("List the top-level paths to pack under 'includes'".to_string()),
        });
    }

    for exclude in &config.excludes {
        if exclude.path.is_empty() {
            return Err(Error::ConfigParse {
                message: "exclude entry with an empty path".to_string(),
                hint: None,
            });
        }
    }

    Ok(config)
}

fn hint_for(error: &serde_json::Error) -> Option<String> {
    let message = error.to_string();
    if message.contains("missing field `wms`") {
        Some("Every exclude needs \"wms\": true or false".to_string())
    } else if message.contains("missing field `includes`") {
        Some("List the top-level paths to pack under 'includes'".to_string())
    } else {
        None
    }
}

/// Load and parse a configuration file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<TarballConfig> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}
