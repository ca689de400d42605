//! # Version Command Implementation
//!
//! Resolves the release version a tag (or version/build pair) would give a
//! tree, without checking anything out. Only the tree's `version.txt` is
//! read. Useful to check a tag before starting a long build.

use anyhow::Result;
use clap::{ArgGroup, Args};
use std::path::PathBuf;

use orig_tarball::version::{self, ResolvedVersion, VersionSpec};

/// Arguments for the version command
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("release")
        .required(true)
        .args(["tag", "release_version"])
))]
pub struct VersionArgs {
    /// Upstream version file (e.g. browser/config/version.txt)
    #[arg(short = 'f', long, value_name = "FILE")]
    pub version_file: PathBuf,

    /// Release tag
    #[arg(short, long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Release version
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    pub release_version: Option<String>,

    /// Build number of --version [default: 1]
    #[arg(short, long, value_name = "N", requires = "release_version")]
    pub build: Option<u32>,
}

fn resolve(args: &VersionArgs) -> Result<ResolvedVersion> {
    let upstream = version::read_upstream_version(&args.version_file)?;
    let spec = match (&args.tag, &args.release_version) {
        (Some(tag), _) => VersionSpec::from_tag(tag)?,
        (None, Some(release)) => VersionSpec::from_release(release, args.build.unwrap_or(1))?,
        (None, None) => anyhow::bail!("Either --tag or --version is required"),
    };
    Ok(spec.resolve(&upstream)?)
}

/// Execute the version command
pub fn execute(args: VersionArgs) -> Result<()> {
    println!("{}", resolve(&args)?);
    Ok(())
}
