// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotfiles repository reconciliation.
//!
//! Dotmgr tracks dotfiles in a __bare-alias__ repository.
//!
//! # Bare-Alias Repositories
//!
//! Although bare repositories lack a working tree by definition, Git allows
//! users to force a working tree by designating a directory as an alias for a
//! working tree using the "--work-tree" argument. This keeps the Git directory
//! (`~/.dotfiles.git` by default) separate from the tracked directory (`~` by
//! default), so the home directory never needs to be initialized as a Git
//! repository itself.
//!
//! # Repository Lifecycle
//!
//! ```text
//! Uninitialized --initialize--> Initialized (no commits) --commit--> Initialized (history)
//! ```
//!
//! Several operations branch on which of the two initialized states holds.
//! This is probed with `git rev-parse HEAD`, which fails while `HEAD` is
//! still unborn.
//!
//! # See Also
//!
//! 1. [ArchWiki - dotfiles](https://wiki.archlinux.org/title/Dotfiles#Tracking_dotfiles_directly_with_Git)

pub mod message;
pub mod runner;
pub mod status;
mod sync;

pub use sync::{PullOutcome, SyncStatus};

use crate::{
    config::{ConfigError, Configuration},
    git::{
        runner::{CommandRunner, GitCli},
        status::{parse_porcelain, FileState, GitChange, TrackedFileInfo},
    },
    path,
};

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Branch that push and pull operate on.
pub const MAIN_BRANCH: &str = "main";

/// Default patterns written to a fresh ignore file.
pub const DEFAULT_IGNORE_PATTERNS: &str = "\
# Default dotfiles manager gitignore patterns

# Temporary files
*~
*.swp
*.swo
.DS_Store
Thumbs.db

# Cache directories
__pycache__/
*.pyc
.cache/

# IDE files
.vscode/
.idea/

# Log files
*.log
";

/// Resolved locations the repository operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPaths {
    /// Absolute path of the bare repository.
    pub git_dir: PathBuf,

    /// Absolute path of the work tree.
    pub work_tree: PathBuf,

    /// Absolute path of the ignore file used as `core.excludesfile`.
    pub excludes_file: PathBuf,

    /// Directory holding backup snapshots.
    pub backup_root: PathBuf,
}

impl RepoPaths {
    /// Construct new path set, deriving the backup root from the work tree.
    pub fn new(
        git_dir: impl Into<PathBuf>,
        work_tree: impl Into<PathBuf>,
        excludes_file: impl Into<PathBuf>,
    ) -> Self {
        let work_tree = work_tree.into();
        Self {
            git_dir: git_dir.into(),
            backup_root: path::backup_root(&work_tree),
            work_tree,
            excludes_file: excludes_file.into(),
        }
    }

    /// Resolve paths from settings.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ShellExpansion`] if a path cannot be expanded.
    /// - Return [`ConfigError::NoWayHome`] if home directory cannot be found.
    pub fn from_config(config: &Configuration) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.git_dir_path()?,
            config.work_tree_path()?,
            path::excludes_file()?,
        ))
    }

    /// Express a path relative to the work tree when it lives inside it.
    pub fn relative(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        path.strip_prefix(&self.work_tree)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Absolute location of a path given by the user.
    pub fn absolute(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_tree.join(path)
        }
    }
}

/// Result of a best-effort batch add.
///
/// Callers must inspect both parts, since a batch still counts as successful
/// when only some files could be staged.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// Paths that were staged, exactly as given by the caller.
    pub added: Vec<PathBuf>,

    /// Paths that could not be staged, mapped to the reason.
    pub failed: BTreeMap<PathBuf, String>,
}

impl AddOutcome {
    /// At least one file was staged, or nothing was requested.
    pub fn is_success(&self) -> bool {
        !self.added.is_empty() || self.failed.is_empty()
    }
}

/// Diagnostic snapshot of repository state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RepoSummary {
    /// Git directory exists.
    pub initialized: bool,

    /// Local Git settings that make the bare alias work, "Not set" if absent.
    pub configuration: BTreeMap<String, String>,

    /// First line of `git remote -v`.
    pub remote: Option<String>,

    /// Number of files in the index.
    pub tracked_files: usize,

    /// Number of pending changes, staged or not.
    pub changes: usize,
}

/// Dotfiles repository.
///
/// Wraps the bare-alias repository described by a [`Configuration`], and
/// turns the textual output of Git into structured records. All fallible
/// operations report failure through their return value. Nothing panics, and
/// no Git failure escapes as anything but a [`RepoError`].
#[derive(Debug)]
pub struct DotfilesRepo<R = GitCli>
where
    R: CommandRunner,
{
    paths: RepoPaths,
    remote: String,
    runner: R,
}

impl DotfilesRepo<GitCli> {
    /// Open repository described by settings using the Git binary.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError`] if paths cannot be resolved.
    pub fn open(config: &Configuration) -> Result<Self, ConfigError> {
        Ok(Self::new(
            RepoPaths::from_config(config)?,
            config.remote.trim(),
            GitCli::default(),
        ))
    }
}

impl<R> DotfilesRepo<R>
where
    R: CommandRunner,
{
    /// Construct new repository handle.
    pub fn new(paths: RepoPaths, remote: impl Into<String>, runner: R) -> Self {
        Self {
            paths,
            remote: remote.into(),
            runner,
        }
    }

    /// Resolved paths of the repository.
    pub fn paths(&self) -> &RepoPaths {
        &self.paths
    }

    /// Configured remote URL, empty when none.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Command runner used for Git calls.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Pick up changed settings.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError`] if paths cannot be resolved.
    pub fn reconfigure(&mut self, config: &Configuration) -> Result<(), ConfigError> {
        self.paths = RepoPaths::from_config(config)?;
        self.remote = config.remote.trim().to_string();
        Ok(())
    }

    pub(crate) fn git(&self, args: &[&str]) -> runner::GitOutput {
        self.runner.run(&self.paths, args)
    }

    fn git_checked(&self, args: &[&str]) -> Result<runner::GitOutput> {
        let output = self.git(args);
        if !output.success {
            return Err(RepoError::git(args, &output.stderr));
        }

        Ok(output)
    }

    fn require_initialized(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(RepoError::NotInitialized {
                git_dir: self.paths.git_dir.clone(),
            });
        }

        Ok(())
    }

    /// Check if repository exists.
    ///
    /// True if and only if the Git directory is a directory that contains a
    /// `HEAD` entry.
    pub fn is_initialized(&self) -> bool {
        self.paths.git_dir.is_dir() && self.paths.git_dir.join("HEAD").exists()
    }

    /// Check if repository has at least one commit.
    pub fn has_commits(&self) -> bool {
        self.git(&["rev-parse", "HEAD"]).success
    }

    /// Initialize a new bare-alias repository.
    ///
    /// Destroys any existing Git directory first. Creates the ignore file if
    /// it is missing, configures the repository for bare-alias use, and adds
    /// the configured remote. Failures past bare repository creation are
    /// logged as warnings only.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::RemoveGitDir`] if old Git directory cannot be
    ///   removed.
    /// - Return [`RepoError::CreateGitDir`] if Git directory cannot be
    ///   created.
    /// - Return [`RepoError::Git`] if `git init --bare` fails.
    #[instrument(skip(self), level = "debug")]
    pub fn initialize(&self) -> Result<()> {
        let git_dir = &self.paths.git_dir;
        info!("initialize dotfiles repository at {:?}", git_dir.display());

        if git_dir.exists() {
            warn!("remove existing git directory {:?}", git_dir.display());
            fs::remove_dir_all(git_dir).map_err(|err| RepoError::RemoveGitDir {
                source: err,
                git_dir: git_dir.clone(),
            })?;
        }

        fs::create_dir_all(git_dir).map_err(|err| RepoError::CreateGitDir {
            source: err,
            git_dir: git_dir.clone(),
        })?;

        let git_dir_arg = git_dir.to_string_lossy();
        let args = ["init", "--bare", git_dir_arg.as_ref()];
        let output = self.runner.run_unscoped(&self.paths.work_tree, &args);
        if !output.success {
            return Err(RepoError::git(&args, &output.stderr));
        }

        self.ensure_ignore_file();

        let head = format!("refs/heads/{MAIN_BRANCH}");
        let work_tree = self.paths.work_tree.to_string_lossy();
        let excludes_file = self.paths.excludes_file.to_string_lossy();
        let settings: [(&[&str], &str); 4] = [
            (&["symbolic-ref", "HEAD", head.as_str()], "point HEAD at main"),
            (
                &["config", "status.showUntrackedFiles", "no"],
                "hide untracked files",
            ),
            (
                &["config", "core.worktree", work_tree.as_ref()],
                "configure work tree",
            ),
            (
                &["config", "core.excludesfile", excludes_file.as_ref()],
                "configure ignore file",
            ),
        ];
        for (args, description) in settings {
            let output = self.git(args);
            if !output.success {
                warn!("failed to {description}: {}", output.stderr.trim());
            }
        }

        if !self.remote.is_empty() {
            let output = self.git(&["remote", "add", "origin", self.remote.as_str()]);
            if output.success {
                self.setup_upstream_tracking();
            } else {
                warn!("failed to add remote origin: {}", output.stderr.trim());
            }
        }

        Ok(())
    }

    fn ensure_ignore_file(&self) {
        let ignore = &self.paths.excludes_file;
        if ignore.exists() {
            return;
        }

        let result = ignore
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::write(ignore, DEFAULT_IGNORE_PATTERNS));
        match result {
            Ok(()) => info!("wrote default ignore file {:?}", ignore.display()),
            Err(err) => warn!("cannot write ignore file {:?}: {err}", ignore.display()),
        }
    }

    /// List current changes, staged and unstaged.
    ///
    /// Empty when repository is not initialized or status cannot be read.
    pub fn changes(&self) -> Vec<GitChange> {
        if !self.is_initialized() {
            return Vec::new();
        }

        let output = self.git(&["status", "--porcelain"]);
        if !output.success {
            warn!("cannot read status: {}", output.stderr.trim());
            return Vec::new();
        }

        parse_porcelain(&output.stdout)
    }

    /// Query state of a single file.
    ///
    /// Returns `None` when repository is not initialized or Git fails.
    pub fn file_info(&self, path: impl AsRef<Path>) -> Option<FileState> {
        if !self.is_initialized() {
            return None;
        }

        let rel_path = self.paths.relative(path);
        let rel_path = rel_path.to_string_lossy();
        let output = self.git(&["status", "--porcelain", "--", rel_path.as_ref()]);
        if !output.success {
            return None;
        }

        if let Some(change) = parse_porcelain(&output.stdout).into_iter().next() {
            return Some(FileState::Changed {
                staged: change.staged,
                worktree: change.worktree,
            });
        }

        let output = self.git(&["ls-files", "--", rel_path.as_ref()]);
        if output.success && !output.stdout.trim().is_empty() {
            Some(FileState::Tracked)
        } else {
            Some(FileState::Untracked)
        }
    }

    /// List tracked files with file system metadata.
    ///
    /// Files that cannot be inspected are still listed as
    /// [`FileState::Deleted`].
    pub fn tracked_files(&self) -> Vec<TrackedFileInfo> {
        if !self.is_initialized() {
            return Vec::new();
        }

        let output = self.git(&["ls-files"]);
        if !output.success {
            warn!("cannot list tracked files: {}", output.stderr.trim());
            return Vec::new();
        }

        output
            .lines()
            .map(|rel_path| {
                let full_path = self.paths.work_tree.join(rel_path);
                match fs::metadata(&full_path) {
                    Ok(metadata) => TrackedFileInfo {
                        path: PathBuf::from(rel_path),
                        state: self.file_info(&full_path).unwrap_or(FileState::Tracked),
                        size: metadata.len(),
                        modified: metadata.modified().ok(),
                        is_dir: metadata.is_dir(),
                    },
                    Err(err) => {
                        debug!("cannot stat {:?}: {err}", full_path.display());
                        TrackedFileInfo {
                            path: PathBuf::from(rel_path),
                            state: FileState::Deleted,
                            size: 0,
                            modified: None,
                            is_dir: false,
                        }
                    }
                }
            })
            .collect()
    }

    /// Check if a file is tracked.
    pub fn is_file_tracked(&self, path: impl AsRef<Path>) -> bool {
        if !self.is_initialized() {
            return false;
        }

        let rel_path = self.paths.relative(path);
        let output = self.git(&["ls-files", "--", rel_path.to_string_lossy().as_ref()]);
        output.success && !output.stdout.trim().is_empty()
    }

    /// Stage a single file.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::NotInitialized`] if repository does not exist.
    /// - Return [`RepoError::MissingFile`] if the file does not exist.
    /// - Return [`RepoError::Git`] if `git add` fails.
    pub fn add_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.require_initialized()?;
        self.stage(path.as_ref())
    }

    fn stage(&self, path: &Path) -> Result<()> {
        let full_path = self.paths.absolute(path);
        if !full_path.exists() {
            return Err(RepoError::MissingFile { path: full_path });
        }

        let rel_path = self.paths.relative(path);
        self.git_checked(&["add", rel_path.to_string_lossy().as_ref()])?;
        info!("added {:?}", rel_path.display());

        Ok(())
    }

    /// Stage a batch of files, best effort.
    ///
    /// Each file is staged on its own. One failure never stops the rest of the
    /// batch. Misconfiguration of the repository is reported as a warning,
    /// but does not block staging.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::NotInitialized`] if repository does not exist
    ///   and at least one path was given.
    #[instrument(skip(self, paths), level = "debug")]
    pub fn add_files(
        &self,
        paths: impl IntoIterator<Item = impl AsRef<Path>>,
    ) -> Result<AddOutcome> {
        let paths = paths
            .into_iter()
            .map(|path| path.as_ref().to_path_buf())
            .collect::<Vec<_>>();
        let mut outcome = AddOutcome::default();
        if paths.is_empty() {
            return Ok(outcome);
        }

        self.require_initialized()?;

        let issues = self.verify_configuration();
        if !issues.is_empty() {
            warn!("git configuration issues detected: {}", issues.join(", "));
        }

        for path in paths {
            match self.stage(&path) {
                Ok(()) => outcome.added.push(path),
                Err(err) => {
                    let reason = match err {
                        RepoError::Git { stderr, .. } if !stderr.is_empty() => stderr,
                        RepoError::Git { .. } => "unknown git add error".into(),
                        other => other.to_string(),
                    };
                    warn!("cannot add {:?}: {reason}", path.display());
                    outcome.failed.insert(path, reason);
                }
            }
        }

        info!(
            "added {} files, {} failed",
            outcome.added.len(),
            outcome.failed.len()
        );

        Ok(outcome)
    }

    /// Stop tracking a file, keeping it on disk.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::NotInitialized`] if repository does not exist.
    /// - Return [`RepoError::Git`] if `git rm --cached` fails.
    pub fn untrack_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.require_initialized()?;
        let rel_path = self.paths.relative(path);
        self.git_checked(&["rm", "--cached", rel_path.to_string_lossy().as_ref()])?;
        info!("untracked {:?}", rel_path.display());

        Ok(())
    }

    /// Commit staged changes.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::NotInitialized`] if repository does not exist.
    /// - Return [`RepoError::EmptyCommitMessage`] if message is blank. Git is
    ///   not called in that case.
    /// - Return [`RepoError::Git`] if `git commit` fails.
    pub fn commit(&self, message: impl AsRef<str>) -> Result<()> {
        self.require_initialized()?;
        let message = message.as_ref();
        if message.trim().is_empty() {
            return Err(RepoError::EmptyCommitMessage);
        }

        self.git_checked(&["commit", "-m", message])?;
        info!("committed: {message}");

        Ok(())
    }

    /// Generate commit message for current changes.
    pub fn commit_message(&self) -> String {
        message::commit_message(&self.changes())
    }

    /// Remove every staged change from the index.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::NotInitialized`] if repository does not exist.
    /// - Return [`RepoError::Git`] if Git fails.
    pub fn unstage_all(&self) -> Result<()> {
        self.require_initialized()?;

        let staged = self
            .changes()
            .into_iter()
            .filter(|change| change.staged.is_staged_change())
            .map(|change| change.path)
            .collect::<Vec<_>>();
        if staged.is_empty() {
            debug!("nothing to unstage");
            return Ok(());
        }

        if self.has_commits() {
            self.git_checked(&["reset", "HEAD"])?;
        } else {
            self.unstage_without_head(&staged)?;
        }
        info!("unstaged {} files", staged.len());

        Ok(())
    }

    /// Remove a single file from the index.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::NotInitialized`] if repository does not exist.
    /// - Return [`RepoError::Git`] if Git fails.
    pub fn unstage_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.unstage_files([path])
    }

    /// Remove a batch of files from the index.
    ///
    /// Repositories without commits have no `HEAD` to reset to, so files are
    /// dropped from the index through `git rm --cached` instead.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::NotInitialized`] if repository does not exist.
    /// - Return [`RepoError::Git`] if Git fails.
    pub fn unstage_files(&self, paths: impl IntoIterator<Item = impl AsRef<Path>>) -> Result<()> {
        self.require_initialized()?;

        let rel_paths = paths
            .into_iter()
            .map(|path| self.paths.relative(path).to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        if rel_paths.is_empty() {
            return Ok(());
        }

        if self.has_commits() {
            let mut args = vec!["reset", "HEAD"];
            args.extend(rel_paths.iter().map(String::as_str));
            self.git_checked(&args)?;
        } else {
            self.unstage_without_head(&rel_paths)?;
        }
        info!("unstaged {}", rel_paths.join(", "));

        Ok(())
    }

    fn unstage_without_head(&self, rel_paths: &[String]) -> Result<()> {
        let mut args = vec!["rm", "--cached"];
        args.extend(rel_paths.iter().map(String::as_str));
        self.git_checked(&args)?;

        Ok(())
    }

    /// Compare persisted Git configuration against expected values.
    ///
    /// Returns a list of human readable issues, empty when everything is in
    /// order. Never repairs anything.
    pub fn verify_configuration(&self) -> Vec<String> {
        if !self.is_initialized() {
            return vec!["Git repository not initialized".into()];
        }

        let work_tree = self.paths.work_tree.to_string_lossy();
        let excludes_file = self.paths.excludes_file.to_string_lossy();
        let checks = [
            ("status.showUntrackedFiles", "no"),
            ("core.worktree", work_tree.as_ref()),
            ("core.excludesfile", excludes_file.as_ref()),
        ];

        let mut issues = Vec::new();
        for (key, expect) in checks {
            let output = self.git(&["config", "--local", key]);
            let value = output.stdout.trim();
            if !output.success {
                issues.push(format!("Missing configuration: {key}"));
            } else if value != expect {
                issues.push(format!(
                    "Incorrect {key}: expected '{expect}', got '{value}'"
                ));
            }
        }

        if !self.paths.excludes_file.exists() {
            issues.push(format!(
                "Global .gitignore not found at {}",
                self.paths.excludes_file.display()
            ));
        }

        issues
    }

    /// Collect diagnostic summary of repository state.
    pub fn summary(&self) -> RepoSummary {
        if !self.is_initialized() {
            return RepoSummary::default();
        }

        let configuration = ["status.showUntrackedFiles", "core.worktree", "core.excludesfile"]
            .into_iter()
            .map(|key| {
                let output = self.git(&["config", "--local", key]);
                let value = if output.success {
                    output.stdout.trim().to_string()
                } else {
                    "Not set".to_string()
                };
                (key.to_string(), value)
            })
            .collect();

        let remote = self
            .git(&["remote", "-v"])
            .lines()
            .next()
            .map(ToString::to_string);

        RepoSummary {
            initialized: true,
            configuration,
            remote,
            tracked_files: self.tracked_files().len(),
            changes: self.changes().len(),
        }
    }
}

/// Repository error types.
///
/// The [`Display`](std::fmt::Display) form of each variant is a one line
/// summary meant for the user. Details belong in the log.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Repository has not been initialized yet.
    #[error("git repository not initialized at {:?}", git_dir.display())]
    NotInitialized { git_dir: PathBuf },

    /// Commit message is blank.
    #[error("commit message cannot be empty")]
    EmptyCommitMessage,

    /// No remote to push to or pull from.
    #[error("no remote repository configured")]
    NoRemote,

    /// File to stage does not exist.
    #[error("file does not exist: {}", path.display())]
    MissingFile { path: PathBuf },

    /// Git exited with non-zero status.
    #[error("git {command} failed: {}", stderr.lines().next().unwrap_or("unknown error"))]
    Git { command: String, stderr: String },

    /// Old Git directory cannot be removed.
    #[error("failed to remove git directory at {:?}", git_dir.display())]
    RemoveGitDir {
        #[source]
        source: std::io::Error,
        git_dir: PathBuf,
    },

    /// Git directory cannot be created.
    #[error("failed to create git directory at {:?}", git_dir.display())]
    CreateGitDir {
        #[source]
        source: std::io::Error,
        git_dir: PathBuf,
    },
}

impl RepoError {
    fn git(args: &[&str], stderr: &str) -> Self {
        Self::Git {
            command: args.join(" "),
            stderr: stderr.trim().to_string(),
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = RepoError> = std::result::Result<T, E>;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::git::runner::{GitOutput, ScriptedRunner};
    use pretty_assertions::assert_eq;

    /// Work tree inside a temporary directory with an initialized Git
    /// directory stub, i.e., just enough for [`DotfilesRepo::is_initialized`].
    pub(crate) fn initialized_paths(dir: &tempfile::TempDir) -> RepoPaths {
        let paths = RepoPaths::new(
            dir.path().join("dots.git"),
            dir.path().join("home"),
            dir.path().join("home/.config/dotfiles-manager/.gitignore"),
        );
        fs::create_dir_all(&paths.git_dir).unwrap();
        fs::create_dir_all(&paths.work_tree).unwrap();
        fs::write(paths.git_dir.join("HEAD"), "ref: refs/heads/main\n").unwrap();
        paths
    }

    #[test]
    fn is_initialized_false_without_git_dir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = RepoPaths::new(dir.path().join("dots.git"), dir.path(), dir.path().join("x"));
        let repo = DotfilesRepo::new(paths, "", ScriptedRunner::new());
        assert!(!repo.is_initialized());

        Ok(())
    }

    #[test]
    fn is_initialized_false_without_head() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = RepoPaths::new(dir.path().join("dots.git"), dir.path(), dir.path().join("x"));
        fs::create_dir_all(&paths.git_dir)?;
        let repo = DotfilesRepo::new(paths, "", ScriptedRunner::new());
        assert!(!repo.is_initialized());

        Ok(())
    }

    #[test]
    fn is_initialized_true_with_head() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let repo = DotfilesRepo::new(initialized_paths(&dir), "", ScriptedRunner::new());
        assert!(repo.is_initialized());

        Ok(())
    }

    #[test]
    fn uninitialized_repo_never_calls_git() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = RepoPaths::new(dir.path().join("dots.git"), dir.path(), dir.path().join("x"));
        let runner = ScriptedRunner::new();
        let repo = DotfilesRepo::new(paths, "https://blah.org/dots.git", &runner);

        assert_eq!(repo.changes(), Vec::<GitChange>::new());
        assert_eq!(repo.tracked_files(), Vec::<TrackedFileInfo>::new());
        assert!(matches!(repo.unstage_all(), Err(RepoError::NotInitialized { .. })));
        assert!(matches!(repo.add_files([".bashrc"]), Err(RepoError::NotInitialized { .. })));
        assert!(matches!(repo.commit("add x.txt"), Err(RepoError::NotInitialized { .. })));
        assert!(matches!(repo.push(), Err(RepoError::NotInitialized { .. })));
        assert!(matches!(repo.pull(), Err(RepoError::NotInitialized { .. })));
        assert_eq!(repo.verify_configuration(), vec!["Git repository not initialized"]);
        assert_eq!(runner.calls(), Vec::<Vec<String>>::new());

        Ok(())
    }

    #[test]
    fn unstage_without_commits_uses_rm_cached() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = ScriptedRunner::new()
            .on(&["rev-parse", "HEAD"], GitOutput::failed("fatal: ambiguous argument 'HEAD'"));
        let repo = DotfilesRepo::new(initialized_paths(&dir), "", &runner);

        repo.unstage_file(".bashrc")?;
        repo.unstage_files([".vimrc", ".gitconfig"])?;

        assert!(runner.called(&["rm", "--cached", ".bashrc"]));
        assert!(runner.called(&["rm", "--cached", ".vimrc", ".gitconfig"]));
        assert!(!runner.called_with_prefix(&["reset"]));

        Ok(())
    }

    #[test]
    fn unstage_with_commits_uses_reset_head() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = ScriptedRunner::new().on(&["rev-parse", "HEAD"], GitOutput::ok("abc123\n"));
        let repo = DotfilesRepo::new(initialized_paths(&dir), "", &runner);

        repo.unstage_file(".bashrc")?;
        repo.unstage_files([".vimrc", ".gitconfig"])?;

        assert!(runner.called(&["reset", "HEAD", ".bashrc"]));
        assert!(runner.called(&["reset", "HEAD", ".vimrc", ".gitconfig"]));
        assert!(!runner.called_with_prefix(&["rm", "--cached"]));

        Ok(())
    }

    #[test]
    fn unstage_all_branches_on_head() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let status = GitOutput::ok("A  .bashrc\n M .vimrc\nA  .config/foot/foot.ini\n");

        let unborn = ScriptedRunner::new()
            .on(&["status", "--porcelain"], status.clone())
            .on(&["rev-parse", "HEAD"], GitOutput::failed("unborn"));
        DotfilesRepo::new(initialized_paths(&dir), "", &unborn).unstage_all()?;
        assert!(unborn.called(&["rm", "--cached", ".bashrc", ".config/foot/foot.ini"]));
        assert!(!unborn.called_with_prefix(&["reset"]));

        let born = ScriptedRunner::new()
            .on(&["status", "--porcelain"], status)
            .on(&["rev-parse", "HEAD"], GitOutput::ok("abc123\n"));
        DotfilesRepo::new(initialized_paths(&dir), "", &born).unstage_all()?;
        assert!(born.called(&["reset", "HEAD"]));
        assert!(!born.called_with_prefix(&["rm", "--cached"]));

        Ok(())
    }

    #[test]
    fn unstage_all_with_nothing_staged_is_noop() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner =
            ScriptedRunner::new().on(&["status", "--porcelain"], GitOutput::ok(" M .vimrc\n"));
        DotfilesRepo::new(initialized_paths(&dir), "", &runner).unstage_all()?;

        assert_eq!(runner.calls(), vec![vec!["status".to_string(), "--porcelain".to_string()]]);

        Ok(())
    }

    #[test]
    fn add_files_empty_input_is_success() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = RepoPaths::new(dir.path().join("dots.git"), dir.path(), dir.path().join("x"));
        let runner = ScriptedRunner::new();
        let repo = DotfilesRepo::new(paths, "", &runner);

        let outcome = repo.add_files(Vec::<PathBuf>::new())?;
        assert_eq!(outcome, AddOutcome::default());
        assert!(outcome.is_success());
        assert!(runner.calls().is_empty());

        Ok(())
    }

    #[test]
    fn add_files_partitions_successes_and_failures() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = initialized_paths(&dir);
        fs::write(paths.work_tree.join(".bashrc"), "alias ll='ls -l'\n")?;
        fs::write(paths.work_tree.join(".secret"), "hunter2\n")?;
        let bashrc = paths.work_tree.join(".bashrc");

        let runner = ScriptedRunner::new().on(
            &["add", ".secret"],
            GitOutput::failed("fatal: pathspec '.secret' is ignored\n"),
        );
        let repo = DotfilesRepo::new(paths.clone(), "", &runner);
        let outcome =
            repo.add_files([bashrc.clone(), PathBuf::from(".secret"), PathBuf::from(".nope")])?;

        assert_eq!(outcome.added, vec![bashrc]);
        let expect = BTreeMap::from([
            (
                PathBuf::from(".nope"),
                format!("file does not exist: {}", paths.work_tree.join(".nope").display()),
            ),
            (PathBuf::from(".secret"), "fatal: pathspec '.secret' is ignored".to_string()),
        ]);
        assert_eq!(outcome.failed, expect);
        assert!(outcome.is_success());
        assert!(runner.called(&["add", ".bashrc"]));

        Ok(())
    }

    #[test]
    fn add_files_all_failing_is_not_success() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let repo = DotfilesRepo::new(initialized_paths(&dir), "", ScriptedRunner::new());

        let outcome = repo.add_files([".missing"])?;
        assert!(outcome.added.is_empty());
        assert!(!outcome.is_success());

        Ok(())
    }

    #[test]
    fn blank_commit_message_rejected_locally() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = ScriptedRunner::new();
        let repo = DotfilesRepo::new(initialized_paths(&dir), "", &runner);

        assert!(matches!(repo.commit("   \n"), Err(RepoError::EmptyCommitMessage)));
        assert!(runner.calls().is_empty());

        repo.commit("add .bashrc")?;
        assert!(runner.called(&["commit", "-m", "add .bashrc"]));

        Ok(())
    }

    #[test]
    fn commit_failure_carries_first_stderr_line() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = ScriptedRunner::new().on(
            &["commit", "-m", "update dotfiles"],
            GitOutput::failed("nothing to commit, working tree clean\nmore detail\n"),
        );
        let repo = DotfilesRepo::new(initialized_paths(&dir), "", &runner);

        let result = repo.commit("update dotfiles").map_err(|err| err.to_string());
        let expect = "git commit -m update dotfiles failed: nothing to commit, working tree clean";
        assert_eq!(result, Err(expect.into()));

        Ok(())
    }

    #[test]
    fn verify_configuration_lists_mismatches() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = initialized_paths(&dir);
        let runner = ScriptedRunner::new()
            .on(&["config", "--local", "status.showUntrackedFiles"], GitOutput::ok("no\n"))
            .on(&["config", "--local", "core.worktree"], GitOutput::ok("/somewhere/else\n"))
            .on(&["config", "--local", "core.excludesfile"], GitOutput::failed(""));
        let repo = DotfilesRepo::new(paths.clone(), "", &runner);

        let expect = vec![
            format!(
                "Incorrect core.worktree: expected '{}', got '/somewhere/else'",
                paths.work_tree.display()
            ),
            "Missing configuration: core.excludesfile".to_string(),
            format!("Global .gitignore not found at {}", paths.excludes_file.display()),
        ];
        assert_eq!(repo.verify_configuration(), expect);

        Ok(())
    }

    #[test]
    fn tracked_files_marks_missing_files_deleted() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = initialized_paths(&dir);
        fs::write(paths.work_tree.join(".bashrc"), "12345")?;
        let runner = ScriptedRunner::new()
            .on(&["ls-files"], GitOutput::ok(".bashrc\n.gone\n"))
            .on(&["status", "--porcelain", "--", ".bashrc"], GitOutput::ok(" M .bashrc\n"));
        let repo = DotfilesRepo::new(paths, "", &runner);

        let files = repo.tracked_files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, PathBuf::from(".bashrc"));
        assert_eq!(files[0].size, 5);
        assert_eq!(files[0].state.to_string(), "M");
        assert_eq!(files[1].path, PathBuf::from(".gone"));
        assert_eq!(files[1].state, FileState::Deleted);
        assert_eq!(files[1].size, 0);
        assert!(!runner.called(&["status", "--porcelain", "--", ".gone"]));

        Ok(())
    }

    #[test]
    fn untrack_keeps_file_and_uses_relative_path() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = initialized_paths(&dir);
        let gitconfig = paths.work_tree.join(".gitconfig");
        fs::write(&gitconfig, "[user]\n")?;
        let runner = ScriptedRunner::new()
            .on(&["ls-files", "--", ".gitconfig"], GitOutput::ok(".gitconfig\n"))
            .on(&["ls-files", "--", ".profile"], GitOutput::ok(""));
        let repo = DotfilesRepo::new(paths, "", &runner);

        assert!(repo.is_file_tracked(&gitconfig));
        assert!(!repo.is_file_tracked(".profile"));

        repo.untrack_file(&gitconfig)?;
        assert!(runner.called(&["rm", "--cached", ".gitconfig"]));
        assert!(gitconfig.exists());

        Ok(())
    }

    #[test]
    fn relative_paths_strip_work_tree_prefix() {
        let paths =
            RepoPaths::new("/home/blah/.dotfiles.git", "/home/blah", "/home/blah/.gitignore");
        assert_eq!(
            paths.relative("/home/blah/.config/foot/foot.ini"),
            PathBuf::from(".config/foot/foot.ini")
        );
        assert_eq!(paths.relative(".bashrc"), PathBuf::from(".bashrc"));
        assert_eq!(paths.relative("/etc/hosts"), PathBuf::from("/etc/hosts"));
        assert_eq!(paths.absolute(".bashrc"), PathBuf::from("/home/blah/.bashrc"));
    }
}
