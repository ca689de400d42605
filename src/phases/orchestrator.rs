//! Orchestrator for the complete tarball build
//!
//! This module coordinates all stages to provide a clean API for one
//! tarball build, from pinning revisions to the finished archive. External
//! tools are expected to have been probed for by the caller.

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use super::sync::{LocalePins, LocaleSynchronizer};
use super::{package, validate};
use crate::archive::Archiver;
use crate::config::TarballConfig;
use crate::error::Result;
use crate::locales::{Blacklist, LocaleManifest};
use crate::metadata::{self, Candidate, MetadataSource};
use crate::repository::RepositoryManager;
use crate::version::{self, ResolvedVersion, VersionSpec};

/// File recording the node the main tree was built from.
pub const SOURCE_CHANGESET_FILE: &str = "SOURCE_CHANGESET";

/// Directory holding locale checkouts, relative to the tree.
pub const L10N_DIR: &str = "l10n";

/// Which build of the tree is packaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseMode {
    /// Tip of every repository, versioned by push date.
    Snapshot,
    /// A release tag applied to every repository.
    Tag(String),
    /// A published release candidate, pinned by its build metadata.
    Candidate { version: String, build: u32 },
}

/// Everything one build needs to know.
#[derive(Debug, Clone)]
pub struct TarballPlan {
    pub repo: String,
    pub cache: Option<PathBuf>,
    /// Locale sync and validation are skipped without one.
    pub l10n_base: Option<String>,
    pub mode: ReleaseMode,
    pub name: String,
    /// Product name used in release-candidate paths.
    pub basename: String,
    pub application: String,
    /// Subdirectory of the tree auxiliary checkouts go into.
    pub mozdir: String,
    pub config: TarballConfig,
    /// Where relative inputs are resolved and the archive is written.
    pub invocation_dir: PathBuf,
}

/// External collaborators of a build.
pub struct Toolkit<'a> {
    pub repositories: &'a RepositoryManager,
    pub metadata: &'a dyn MetadataSource,
    pub archiver: &'a dyn Archiver,
}

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarballOutcome {
    pub version: ResolvedVersion,
    pub archive: PathBuf,
    /// Number of locales packaged.
    pub locales: usize,
}

/// Revisions pinned before anything is checked out.
struct Pins {
    main: Option<String>,
    locales: LocalePins,
    release: Option<VersionSpec>,
}

/// Execute the complete tarball build
///
/// This orchestrates the complete pipeline:
/// 1. Resolve pinned revisions (tag or release-candidate metadata)
/// 2. Check out the main tree into a fresh temporary root
/// 3. Record `SOURCE_CHANGESET` and check out auxiliary repositories
/// 4. Synchronize and validate locales (when an l10n base is given)
/// 5. Resolve the package version
/// 6. Archive the tree into the invocation directory
///
/// The temporary root is removed when this returns, whatever the outcome.
pub fn execute_build(plan: &TarballPlan, toolkit: &Toolkit<'_>) -> Result<TarballOutcome> {
    let pins = resolve_pins(plan, toolkit.metadata)?;
    let blacklist = load_blacklist(plan)?;

    let root = tempfile::Builder::new()
        .prefix("orig-tarball.")
        .tempdir()?;
    let tree = root.path().join(&plan.name);

    toolkit.repositories.checkout(
        &plan.repo,
        plan.cache.as_deref(),
        &tree,
        pins.main.as_deref(),
    )?;

    let node = toolkit.repositories.parent_node(&tree)?;
    fs::write(tree.join(SOURCE_CHANGESET_FILE), format!("{}\n", node))?;

    checkout_auxiliary(plan, toolkit.repositories, &tree)?;

    let locales = match &plan.l10n_base {
        Some(l10n_base) => sync_locales(plan, toolkit, &pins, &blacklist, l10n_base, &tree)?,
        None => {
            info!("No l10n base given, not fetching locales");
            0
        }
    };

    let version = resolve_version(plan, toolkit, pins.release, &tree)?;
    info!("Package version: {}", version);

    let archive = package::execute(
        toolkit.archiver,
        root.path(),
        &plan.name,
        &version,
        &plan.config.includes,
        &plan.config.excludes,
        &plan.invocation_dir,
    )?;

    Ok(TarballOutcome {
        version,
        archive,
        locales,
    })
}

fn resolve_pins(plan: &TarballPlan, source: &dyn MetadataSource) -> Result<Pins> {
    match &plan.mode {
        ReleaseMode::Snapshot => Ok(Pins {
            main: None,
            locales: LocalePins::Unpinned,
            release: None,
        }),
        ReleaseMode::Tag(tag) => Ok(Pins {
            release: Some(VersionSpec::from_tag(tag)?),
            main: Some(tag.clone()),
            locales: LocalePins::Tag(tag.clone()),
        }),
        ReleaseMode::Candidate { version, build } => {
            let release = VersionSpec::from_release(version, *build)?;
            let candidate = Candidate {
                base_url: plan.config.candidates_url(),
                basename: &plan.basename,
                version,
                build: *build,
            };
            let main = candidate.main_revision(source, &plan.repo)?;
            let locales = match plan.l10n_base {
                Some(_) => LocalePins::Revisions(candidate.locale_revisions(source)?),
                None => LocalePins::Unpinned,
            };
            Ok(Pins {
                main: Some(main),
                locales,
                release: Some(release),
            })
        }
    }
}

fn load_blacklist(plan: &TarballPlan) -> Result<Blacklist> {
    match &plan.config.l10n_blacklist {
        Some(path) => Blacklist::from_file(&plan.invocation_dir.join(path)),
        None => Ok(Blacklist::default()),
    }
}

fn checkout_auxiliary(plan: &TarballPlan, repositories: &RepositoryManager, tree: &Path) -> Result<()> {
    for aux in &plan.config.auxiliary_checkouts {
        let revision = match (&aux.revision, &plan.mode) {
            (Some(revision), _) => Some(revision.as_str()),
            (None, ReleaseMode::Tag(tag)) => Some(tag.as_str()),
            (None, _) => None,
        };
        let dest = tree.join(&plan.mozdir).join(&aux.path);
        repositories.checkout(&aux.url, plan.cache.as_deref(), &dest, revision)?;
    }
    Ok(())
}

fn sync_locales(
    plan: &TarballPlan,
    toolkit: &Toolkit<'_>,
    pins: &Pins,
    blacklist: &Blacklist,
    l10n_base: &str,
    tree: &Path,
) -> Result<usize> {
    let locales_dir = tree.join(&plan.application).join("locales");
    let shipped = LocaleManifest::from_file(&locales_dir.join("shipped-locales"))?;

    let mut manifests = vec![shipped.clone()];
    let all_locales = locales_dir.join("all-locales");
    if all_locales.is_file() {
        manifests.push(LocaleManifest::from_file(&all_locales)?);
    }

    let synchronizer = LocaleSynchronizer {
        manager: toolkit.repositories,
        l10n_base,
        cache_root: plan.cache.as_ref().map(|cache| cache.join(L10N_DIR)),
        pins: &pins.locales,
        blacklist,
    };
    let obtained = synchronizer.run(&manifests, &tree.join(L10N_DIR))?;

    validate::execute(&shipped, blacklist, &obtained)?;
    Ok(obtained.len())
}

fn resolve_version(
    plan: &TarballPlan,
    toolkit: &Toolkit<'_>,
    release: Option<VersionSpec>,
    tree: &Path,
) -> Result<ResolvedVersion> {
    let upstream =
        version::read_upstream_version(&tree.join(&plan.application).join(version::VERSION_FILE))?;

    let spec = match release {
        Some(spec) => spec,
        None => {
            let tip = toolkit.repositories.tip(tree)?;
            let pushed = metadata::push_date(toolkit.metadata, &plan.repo, &tip.node)?;
            VersionSpec::Snapshot {
                upstream_version: upstream.clone(),
                tip,
                pushed,
            }
        }
    };

    spec.resolve(&upstream)
}
