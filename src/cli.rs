//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use orig_tarball::output::ColorWhen;

/// Build versioned .orig source tarballs from a Mercurial tree and its l10n repositories
#[derive(Parser, Debug)]
#[command(name = "orig-tarball")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorWhen,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check out, validate and archive a source tree
    Create(commands::create::CreateArgs),

    /// Resolve a release version offline
    Version(commands::version::VersionArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .format_timestamp(None)
        .init();

        match self.command {
            Commands::Create(args) => commands::create::execute(args, self.color),
            Commands::Version(args) => commands::version::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
