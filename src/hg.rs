//! Mercurial command wrappers
//!
//! These use the system `hg` binary, so authentication, proxies and
//! extensions configured in `~/.hgrc` apply as usual.

use std::fmt;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::process;

/// Identifier of a repository tip: local revision number plus short node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipInfo {
    pub rev: u64,
    pub node: String,
}

impl fmt::Display for TipInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.rev, self.node)
    }
}

impl FromStr for TipInfo {
    type Err = String;

    /// Parses `<rev>:<node>`, as printed by `hg tip`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (rev, node) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected '<rev>:<node>', got '{}'", s.trim()))?;
        let rev = rev
            .parse::<u64>()
            .map_err(|e| format!("bad revision number '{}': {}", rev, e))?;
        if node.is_empty() || !node.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("bad changeset node '{}'", node));
        }
        Ok(TipInfo {
            rev,
            node: node.to_string(),
        })
    }
}

fn hg(cwd: Option<&Path>, args: &[&str]) -> Command {
    let mut command = Command::new("hg");
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    command
}

fn run_checked(mut command: Command, location: &str, echo: bool) -> Result<String> {
    let output = process::run(&mut command, echo)?;
    if !output.success() {
        return Err(Error::VcsCommand {
            command: process::describe(&command),
            location: location.to_string(),
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output.stdout)
}

/// Cheap health probe: does `hg summary` succeed in `dir`?
pub fn summary(dir: &Path) -> bool {
    let mut command = hg(Some(dir), &["summary"]);
    process::run(&mut command, false)
        .map(|output| output.success())
        .unwrap_or(false)
}

/// Clone `source` (URL or local path) into `dest`.
pub fn clone(source: &str, dest: &Path) -> Result<()> {
    let mut command = hg(None, &["clone", source]);
    command.arg(dest);
    run_checked(command, source, true).map(drop)
}

/// Pull new changesets from `source` into the repository at `dir`.
pub fn pull(dir: &Path, source: &str) -> Result<()> {
    run_checked(
        hg(Some(dir), &["pull", source]),
        &dir.display().to_string(),
        true,
    )
    .map(drop)
}

/// Update the working copy at `dir`, to `revision` when given, else to tip.
pub fn update(dir: &Path, revision: Option<&str>) -> Result<()> {
    let mut args = vec!["update"];
    if let Some(rev) = revision {
        args.extend(["-r", rev]);
    }
    run_checked(hg(Some(dir), &args), &dir.display().to_string(), true).map(drop)
}

/// Query the repository tip as `<rev>:<short node>`.
pub fn tip(dir: &Path) -> Result<TipInfo> {
    let location = dir.display().to_string();
    let out = run_checked(
        hg(Some(dir), &["tip", "--template", "{rev}:{node|short}"]),
        &location,
        false,
    )?;
    out.parse().map_err(|message| Error::VcsCommand {
        command: "hg tip".to_string(),
        location,
        stderr: message,
    })
}

/// Full node of the working copy parent.
pub fn parent_node(dir: &Path) -> Result<String> {
    let out = run_checked(
        hg(Some(dir), &["parent", "--template", "{node}"]),
        &dir.display().to_string(),
        false,
    )?;
    Ok(out.trim().to_string())
}
