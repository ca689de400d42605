//! # Create Command Implementation
//!
//! The `create` subcommand runs the full build:
//! 1. Dependency probe, configuration loading and revision pinning
//! 2. Main tree and auxiliary checkouts in a temporary root
//! 3. Locale synchronization and completeness validation
//! 4. Version resolution
//! 5. Archiving into the current directory
//!
//! Without `--tag` or `--version` a snapshot of the repository tip is built.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Instant;

use orig_tarball::archive::TarArchiver;
use orig_tarball::config;
use orig_tarball::metadata::HttpMetadataSource;
use orig_tarball::output::{ColorWhen, OutputConfig};
use orig_tarball::phases::orchestrator::{self, ReleaseMode, TarballPlan, Toolkit};
use orig_tarball::process;
use orig_tarball::repository::RepositoryManager;

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Main source repository
    #[arg(short, long, value_name = "URL")]
    pub repo: String,

    /// Cache directory for repository mirrors (relative to the current directory)
    #[arg(short, long, value_name = "DIR", env = "ORIG_TARBALL_CACHE")]
    pub cache: Option<PathBuf>,

    /// Base of the l10n repositories; may contain {locale}. Without it no locales are fetched
    #[arg(short, long = "l10n-base-repo", value_name = "URL")]
    pub l10n_base_repo: Option<String>,

    /// Release tag to build
    #[arg(short, long, value_name = "TAG", conflicts_with = "release_version")]
    pub tag: Option<String>,

    /// Release version to build, pinned from published candidate metadata
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    pub release_version: Option<String>,

    /// Candidate build number of --version [default: 1]
    #[arg(short, long, value_name = "N", requires = "release_version")]
    pub build: Option<u32>,

    /// Package name
    #[arg(short, long, value_name = "NAME")]
    pub name: String,

    /// Product name in candidate metadata paths [default: the package name]
    #[arg(long, value_name = "NAME")]
    pub basename: Option<String>,

    /// Application subdirectory of the tree (e.g. browser)
    #[arg(short, long, value_name = "DIR")]
    pub application: String,

    /// Subdirectory of the tree auxiliary checkouts go into
    #[arg(short, long, value_name = "DIR", default_value = "")]
    pub mozdir: String,

    /// Packaging configuration
    #[arg(
        long,
        value_name = "FILE",
        env = "ORIG_TARBALL_CONFIG",
        default_value = config::DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,
}

impl CreateArgs {
    fn mode(&self) -> ReleaseMode {
        match (&self.tag, &self.release_version) {
            (Some(tag), _) => ReleaseMode::Tag(tag.clone()),
            (None, Some(version)) => ReleaseMode::Candidate {
                version: version.clone(),
                build: self.build.unwrap_or(1),
            },
            (None, None) => ReleaseMode::Snapshot,
        }
    }

    fn plan(&self, invocation_dir: &Path) -> Result<TarballPlan> {
        let config_path = invocation_dir.join(&self.config);
        if !config_path.exists() {
            anyhow::bail!("Configuration file not found: {}", config_path.display());
        }
        let config = config::from_file(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

        Ok(TarballPlan {
            repo: self.repo.clone(),
            cache: self.cache.as_ref().map(|cache| invocation_dir.join(cache)),
            l10n_base: self.l10n_base_repo.clone(),
            mode: self.mode(),
            name: self.name.clone(),
            basename: self.basename.clone().unwrap_or_else(|| self.name.clone()),
            application: self.application.clone(),
            mozdir: self.mozdir.clone(),
            config,
            invocation_dir: invocation_dir.to_path_buf(),
        })
    }
}

/// Execute the create command
pub fn execute(args: CreateArgs, color: ColorWhen) -> Result<()> {
    let out = OutputConfig::new(color);
    let start_time = Instant::now();

    // Missing tools are reported ahead of any configuration problem
    process::check_dependencies(process::DEPENDENCIES)?;

    let invocation_dir = std::env::current_dir().context("Failed to get current directory")?;
    let plan = args.plan(&invocation_dir)?;

    let repositories = RepositoryManager::new();
    let metadata = HttpMetadataSource::new()?;
    let toolkit = Toolkit {
        repositories: &repositories,
        metadata: &metadata,
        archiver: &TarArchiver,
    };

    match orchestrator::execute_build(&plan, &toolkit) {
        Ok(outcome) => {
            println!(
                "{}",
                out.success(&format!(
                    "Created {} in {:.2}s",
                    outcome.archive.display(),
                    start_time.elapsed().as_secs_f64()
                ))
            );
            println!("   Version: {}", outcome.version);
            println!("   Locales: {}", outcome.locales);
            Ok(())
        }
        Err(e) => {
            println!("{}", out.failure("Tarball creation failed"));
            Err(e.into())
        }
    }
}
