//! Packaging
//!
//! The assembled tree `<root>/<name>` is renamed to `<name>-<version>` so
//! that archive members carry the versioned top directory, archived, and
//! renamed back whatever the outcome.

use log::info;
use std::path::{Path, PathBuf};

use crate::archive::{ArchiveSpec, Archiver, ExcludeRule};
use crate::error::Result;
use crate::scoped::ScopedRename;
use crate::version::ResolvedVersion;

/// File name of the archive for `name` at `version`.
pub fn tarball_name(name: &str, version: &ResolvedVersion) -> String {
    format!("{}_{}.orig.tar.bz2", name, version)
}

/// Archive `<root>/<name>` into `output_dir`, returning the archive path.
pub fn execute(
    archiver: &dyn Archiver,
    root: &Path,
    name: &str,
    version: &ResolvedVersion,
    includes: &[String],
    excludes: &[ExcludeRule],
    output_dir: &Path,
) -> Result<PathBuf> {
    let topsrcdir = format!("{}-{}", name, version);
    let output = output_dir.join(tarball_name(name, version));
    let spec = ArchiveSpec {
        includes: includes.to_vec(),
        excludes: excludes.to_vec(),
        output: output.clone(),
    };

    let _renamed = ScopedRename::new(&root.join(name), &root.join(&topsrcdir))?;

    info!("*** Creating {} ***", output.display());
    archiver.archive(root, &topsrcdir, &spec)?;

    Ok(output)
}
