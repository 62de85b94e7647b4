// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Git command execution.
//!
//! Every interaction with the dotfiles repository goes through the Git
//! binary. Scoped calls always take the form
//!
//! ```text
//! git --git-dir=<git_dir> --work-tree=<work_tree> <args...>
//! ```
//!
//! executed from inside the work tree. Calls never time out, so a network
//! bound command like fetch or push blocks the caller until Git itself gives
//! up.

use crate::git::RepoPaths;

use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::Command,
};
use tracing::{debug, instrument};

/// Captured result of a single Git invocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GitOutput {
    /// Git exited with status zero.
    pub success: bool,

    /// Captured standard output.
    pub stdout: String,

    /// Captured standard error.
    pub stderr: String,
}

impl GitOutput {
    /// Successful invocation with given standard output.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed invocation with given standard error.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Non-empty, trimmed lines of standard output.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

/// Layer of indirection for Git invocation.
///
/// Implementations must never panic or fail past this boundary: any problem
/// launching Git is reported as an unsuccessful [`GitOutput`].
pub trait CommandRunner {
    /// Run Git scoped to the dotfiles repository.
    fn run(&self, scope: &RepoPaths, args: &[&str]) -> GitOutput;

    /// Run Git without repository scoping from target directory.
    fn run_unscoped(&self, cwd: &Path, args: &[&str]) -> GitOutput;
}

impl<R> CommandRunner for &R
where
    R: CommandRunner + ?Sized,
{
    fn run(&self, scope: &RepoPaths, args: &[&str]) -> GitOutput {
        (**self).run(scope, args)
    }

    fn run_unscoped(&self, cwd: &Path, args: &[&str]) -> GitOutput {
        (**self).run_unscoped(cwd, args)
    }
}

/// Command runner that calls out to the Git binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
}

impl GitCli {
    /// Construct new runner for a specific Git binary.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl CommandRunner for GitCli {
    #[instrument(skip(self, scope), level = "debug")]
    fn run(&self, scope: &RepoPaths, args: &[&str]) -> GitOutput {
        let mut bin_args: Vec<OsString> = Vec::with_capacity(args.len() + 2);
        bin_args.push(prefixed("--git-dir=", &scope.git_dir));
        bin_args.push(prefixed("--work-tree=", &scope.work_tree));
        bin_args.extend(args.iter().map(OsString::from));

        syscall(&self.program, bin_args, &scope.work_tree)
    }

    #[instrument(skip(self), level = "debug")]
    fn run_unscoped(&self, cwd: &Path, args: &[&str]) -> GitOutput {
        syscall(&self.program, args, cwd)
    }
}

fn prefixed(flag: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(path.as_os_str());
    arg
}

fn syscall(
    cmd: &OsStr,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
    cwd: &Path,
) -> GitOutput {
    match Command::new(cmd).args(args).current_dir(cwd).output() {
        Ok(output) => {
            let result = GitOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            };
            if !result.success {
                debug!("git exited with {}: {}", output.status, result.stderr.trim());
            }
            result
        }
        Err(err) => {
            debug!("cannot launch {cmd:?}: {err}");
            GitOutput::failed(err.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) use scripted::ScriptedRunner;
