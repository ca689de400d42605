//! # Remote Build Metadata
//!
//! Two kinds of remote metadata feed the pipeline:
//!
//! - **Pushlog**: `<repo>/pushlog?changeset=<node>` returns an Atom feed
//!   whose first `updated` element is the UTC time the changeset was
//!   pushed. Snapshot versions embed that date.
//! - **Release candidates**: for a `--version`/`--build` release, the
//!   published candidate directory lists the main revision
//!   (`linux-x86_64/en-US/<basename>-<version>.txt`, a line
//!   `<repo>/rev/<revision>`) and the locale revisions
//!   (`l10n_changesets.txt`).
//!
//! Fetching is behind the `MetadataSource` trait so tests can serve canned
//! documents.

use log::info;
use regex::Regex;
use std::time::Duration;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};
use url::Url;
use xot::Xot;

use crate::error::{Error, Result};
use crate::locales::RevisionMap;

/// Fetches a remote document by URL.
pub trait MetadataSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// `MetadataSource` over HTTP(S).
pub struct HttpMetadataSource {
    client: reqwest::blocking::Client,
}

impl HttpMetadataSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Metadata {
                url: String::new(),
                message: format!("cannot build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

impl MetadataSource for HttpMetadataSource {
    fn fetch(&self, url: &str) -> Result<String> {
        let failed = |e: reqwest::Error| Error::Metadata {
            url: url.to_string(),
            message: e.to_string(),
        };
        self.client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(failed)
    }
}

/// Pushlog query URL for `changeset` in `repo`.
pub fn pushlog_url(repo: &str, changeset: &str) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/pushlog", repo.trim_end_matches('/')))?;
    url.query_pairs_mut().append_pair("changeset", changeset);
    Ok(url)
}

/// Extract the push time from a pushlog Atom document.
pub fn parse_push_date(document: &str, url: &str) -> Result<OffsetDateTime> {
    let failed = |message: String| Error::Metadata {
        url: url.to_string(),
        message,
    };

    let mut xot = Xot::new();
    let root = xot
        .parse(document)
        .map_err(|e| failed(format!("invalid XML: {}", e)))?;

    let updated = xot
        .descendants(root)
        .find(|node| {
            xot.element(*node)
                .is_some_and(|element| xot.local_name_str(element.name()) == "updated")
        })
        .ok_or_else(|| failed("no 'updated' element".to_string()))?;

    let stamp = xot
        .text_content_str(updated)
        .map(str::trim)
        .ok_or_else(|| failed("empty 'updated' element".to_string()))?;

    PrimitiveDateTime::parse(
        stamp,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z"),
    )
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|e| failed(format!("bad timestamp '{}': {}", stamp, e)))
}

/// Push time of `changeset` in `repo`.
pub fn push_date(source: &dyn MetadataSource, repo: &str, changeset: &str) -> Result<OffsetDateTime> {
    let url = pushlog_url(repo, changeset)?;
    info!("Querying push date of {} from {}", changeset, url);
    let document = source.fetch(url.as_str())?;
    parse_push_date(&document, url.as_str())
}

/// Published metadata of one release candidate build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub base_url: &'a str,
    pub basename: &'a str,
    pub version: &'a str,
    pub build: u32,
}

impl Candidate<'_> {
    fn build_dir(&self) -> String {
        format!(
            "{}/{}/candidates/{}-candidates/build{}",
            self.base_url.trim_end_matches('/'),
            self.basename,
            self.version,
            self.build
        )
    }

    /// Build info listing the main revision.
    pub fn info_url(&self) -> String {
        format!(
            "{}/linux-x86_64/en-US/{}-{}.txt",
            self.build_dir(),
            self.basename,
            self.version
        )
    }

    /// Per-locale revision listing.
    pub fn l10n_changesets_url(&self) -> String {
        format!("{}/l10n_changesets.txt", self.build_dir())
    }

    /// Revision of `repo` this candidate was built from.
    pub fn main_revision(&self, source: &dyn MetadataSource, repo: &str) -> Result<String> {
        let url = self.info_url();
        let content = source.fetch(&url)?;
        let revision = parse_main_revision(&content, repo, &url)?;
        info!("Revision to be used for main checkout: {}", revision);
        Ok(revision)
    }

    /// Locale revisions this candidate was built from.
    pub fn locale_revisions(&self, source: &dyn MetadataSource) -> Result<RevisionMap> {
        let url = self.l10n_changesets_url();
        let content = source.fetch(&url)?;
        let revisions = RevisionMap::parse(&content, &url)?;
        info!("Got revisions for {} locales", revisions.len());
        Ok(revisions)
    }
}

/// Find `<repo>/rev/<revision>` among the lines of a build info file.
pub fn parse_main_revision(content: &str, repo: &str, url: &str) -> Result<String> {
    let pattern = Regex::new(&format!(r"^{}/rev/(\S+)$", regex::escape(repo)))?;

    let line = content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(repo))
        .ok_or_else(|| Error::Metadata {
            url: url.to_string(),
            message: "Failed to determine revision for main checkout".to_string(),
        })?;

    pattern
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::Metadata {
            url: url.to_string(),
            message: format!("Badly formatted line '{}'", line),
        })
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned documents keyed by URL and records requests.
    #[derive(Debug, Default)]
    pub struct MockMetadataSource {
        documents: HashMap<String, String>,
        pub requests: Mutex<Vec<String>>,
    }

    impl MockMetadataSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_document(mut self, url: &str, content: &str) -> Self {
            self.documents.insert(url.to_string(), content.to_string());
            self
        }
    }

    impl MetadataSource for MockMetadataSource {
        fn fetch(&self, url: &str) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.documents
                .get(url)
                .cloned()
                .ok_or_else(|| Error::Metadata {
                    url: url.to_string(),
                    message: "404 Not Found".to_string(),
                })
        }
    }
}
