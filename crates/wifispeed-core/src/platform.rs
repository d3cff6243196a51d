//! Platform utility discovery and invocation.
//!
//! Lookup is a pure function over a candidate list and a `PATH` value, so it
//! can be tested without spawning anything. Invocation is a thin wrapper over
//! [`std::process::Command`] that folds every failure into `None`.

use std::ffi::OsStr;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::process::{Command, Stdio};

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Return the first usable candidate.
///
/// A candidate containing a path separator is taken literally and matches
/// when a file exists there. A bare name is searched in each directory of
/// `path_var` (a `PATH`-style list) and matches an executable file.
pub fn locate_utility<S: AsRef<str>>(candidates: &[S], path_var: Option<&OsStr>) -> Option<PathBuf> {
    candidates.iter().find_map(|candidate| {
        let candidate = candidate.as_ref();
        if is_path_like(candidate) {
            let path = PathBuf::from(candidate);
            path.is_file().then_some(path)
        } else {
            search_path(candidate, path_var?)
        }
    })
}

/// [`locate_utility`] against the current process `PATH`.
pub fn locate_utility_in_env<S: AsRef<str>>(candidates: &[S]) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH");
    locate_utility(candidates, path_var.as_deref())
}

fn is_path_like(candidate: &str) -> bool {
    candidate.contains('/') || candidate.contains(MAIN_SEPARATOR)
}

fn search_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|p| is_executable(p))
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

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// Run `program` with `args` and return its stdout.
///
/// Returns `None` if the program cannot be spawned or exits non-zero.
/// Stderr is discarded.
pub fn run_command(program: &Path, args: &[&str]) -> Option<String> {
    let output = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        Ok(o) => o,
        Err(e) => {
            log::warn!("failed to run {}: {e}", program.display());
            return None;
        }
    };

    if !output.status.success() {
        log::warn!("{} exited with {}", program.display(), output.status);
        return None;
    }

    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}
