use crate::errors::CliError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Fallback directories searched after `$PATH`.
const EXTRA_TOOL_DIRS: &[&str] = &["/sbin", "/usr/sbin", "/usr/local/sbin"];

/// Resolve the path of an external tool.
///
/// Searches the directory component of the configured name (if any), then
/// every `$PATH` entry, then a fixed fallback list, deduplicated in
/// first-seen order. Returns the first executable regular file. When nothing
/// matches, a warning is logged and the configured name is returned as-is so
/// the eventual invocation fails at spawn time instead of here.
pub fn locate_tool(name: &str) -> PathBuf {
    let configured = Path::new(name);
    let file_name = configured.file_name().unwrap_or(configured.as_os_str());

    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Some(parent) = configured.parent() {
        if !parent.as_os_str().is_empty() {
            dirs.push(parent.to_path_buf());
        }
    }
    if let Some(path_var) = std::env::var_os("PATH") {
        dirs.extend(std::env::split_paths(&path_var));
    }
    dirs.extend(EXTRA_TOOL_DIRS.iter().map(PathBuf::from));

    let mut seen: Vec<&PathBuf> = Vec::new();
    for dir in &dirs {
        if seen.contains(&dir) {
            continue;
        }
        seen.push(dir);
        let candidate = dir.join(file_name);
        if is_executable_file(&candidate) {
            debug!("resolved tool {} to {}", name, candidate.display());
            return candidate;
        }
    }

    warn!("the os tool {} not found", name);
    configured.to_path_buf()
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

/// Render a program + argument list as a single loggable command line.
pub fn render_command(program: &Path, args: &[String]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Abstraction over external tool invocation.
///
/// Arguments are passed as an explicit list with no shell interpretation.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner {
    /// Run `program` with `args`, blocking until it exits. A non-zero exit
    /// status is an error carrying the rendered command line; a failure to
    /// spawn at all is reported separately, with its cause.
    fn run(&self, program: &Path, args: &[String]) -> Result<(), CliError>;
}

/// `ProcessRunner` backed by `std::process::Command`.
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String]) -> Result<(), CliError> {
        let rendered = render_command(program, args);
        debug!(">> {}", rendered);

        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|source| CliError::SpawnFailure {
                command: rendered.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CliError::ToolFailure { command: rendered })
        }
    }
}
