//! # orig-tarball CLI
//!
//! This is the binary entry point for the `orig-tarball` command-line tool.
//!
//! It parses arguments with `clap`, initializes logging from `--log-level`
//! (overridable with `RUST_LOG`) and dispatches to a subcommand. Any error
//! reaching `main` exits with status 1; usage errors exit with status 2
//! before any work is done.
//!
//! The build pipeline itself lives in the `orig_tarball` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
