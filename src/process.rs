//! External process execution
//!
//! All version-control and archival work is delegated to external tools.
//! Their output is drained as it is produced so a chatty child never blocks
//! on a full pipe; stdout is forwarded line by line to the log, stderr is
//! collected on a helper thread for error reporting.

use log::{debug, info};
use std::env;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use crate::error::{Error, Result};

/// External tools the pipeline needs, with the package providing each.
pub const DEPENDENCIES: &[(&str, &str)] = &[("hg", "mercurial"), ("tar", "tar")];

/// Captured result of a finished command.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run a command to completion, draining its output incrementally.
///
/// With `echo` set each stdout line is logged at info level, otherwise at
/// debug. A non-zero exit status is returned to the caller, not turned into
/// an error; failing to spawn is an I/O error.
pub fn run(command: &mut Command, echo: bool) -> Result<CommandOutput> {
    debug!("Running {}", describe(command));

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stderr_reader = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    });

    let mut stdout = String::new();
    let forwarded = match child.stdout.take() {
        Some(pipe) => forward_lines(pipe, echo, &mut stdout),
        None => Ok(()),
    };

    // The child is reaped and stderr joined even when reading stdout failed
    let status = child.wait();
    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    forwarded?;
    let status = status?;

    Ok(CommandOutput {
        status,
        stdout,
        stderr,
    })
}

/// Log each line read from `pipe` and append it to `out`.
///
/// Stops at the first read error, keeping the lines read so far.
fn forward_lines<R: Read>(pipe: R, echo: bool, out: &mut String) -> std::io::Result<()> {
    for line in BufReader::new(pipe).split(b'\n') {
        let line = String::from_utf8_lossy(&line?).into_owned();
        if echo {
            info!("{}", line);
        } else {
            debug!("{}", line);
        }
        out.push_str(line.as_str());
        out.push('\n');
    }
    Ok(())
}

/// Human readable command line, for logs and error messages.
pub fn describe(command: &Command) -> String {
    let mut parts = vec![command.get_program().to_string_lossy().into_owned()];
    parts.extend(command.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Locate an executable, either by absolute path or on `PATH`.
pub fn find_executable(tool: &str) -> Option<PathBuf> {
    let candidate = Path::new(tool);
    if candidate.is_absolute() {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(tool))
        .find(|full| is_executable(full))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Verify every `(tool, package)` pair is installed.
pub fn check_dependencies(dependencies: &[(&str, &str)]) -> Result<()> {
    info!("Checking dependencies");
    for (tool, package) in dependencies {
        if find_executable(tool).is_none() {
            return Err(Error::DependencyNotFound {
                tool: tool.to_string(),
                package: package.to_string(),
            });
        }
    }
    Ok(())
}
