// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{
    backup::BackupManager,
    git::{runner::CommandRunner, DotfilesRepo, RepoError, Result, MAIN_BRANCH},
};

use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Phrases Git emits when a pull would clobber local files.
///
/// Matched as lowercase substrings of standard error. Includes at least one
/// localized variant.
const OVERWRITE_PHRASES: [&str; 5] = [
    "sarebbero sovrascritti dal merge",
    "would be overwritten by merge",
    "would be overwritten by checkout",
    "untracked working tree files would be overwritten",
    "the following untracked working tree files would be overwritten",
];

fn is_overwrite_error(stderr: &str) -> bool {
    let stderr = stderr.to_lowercase();
    OVERWRITE_PHRASES.iter().any(|phrase| stderr.contains(phrase))
}

/// Relation of local history to the remote in one direction.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    /// A remote is configured.
    pub has_remote: bool,

    /// Commits ahead of, or behind, the remote.
    pub count: usize,

    /// One line summaries of those commits.
    pub commits: Vec<String>,
}

impl SyncStatus {
    fn no_remote() -> Self {
        Self::default()
    }

    fn in_sync() -> Self {
        Self {
            has_remote: true,
            ..Self::default()
        }
    }
}

/// Result of a successful pull.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PullOutcome {
    /// Snapshot holding local files that the pull overwrote.
    pub backup: Option<PathBuf>,
}

impl<R> DotfilesRepo<R>
where
    R: CommandRunner,
{
    /// Push committed changes to `origin/main`.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::NotInitialized`] if repository does not exist.
    /// - Return [`RepoError::Git`] if `git push` fails.
    #[instrument(skip(self), level = "debug")]
    pub fn push(&self) -> Result<()> {
        self.require_initialized()?;
        self.git_checked(&["push", "origin", MAIN_BRANCH])?;
        info!("pushed to origin/{MAIN_BRANCH}");

        Ok(())
    }

    /// Pull changes from `origin/main`.
    ///
    /// Local files that block the pull are first copied into a backup
    /// snapshot, and then overwritten. On a repository with commits, untracked
    /// files are stashed away for this, and the stash is never popped.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::NotInitialized`] if repository does not exist.
    /// - Return [`RepoError::NoRemote`] if `origin` does not exist.
    /// - Return [`RepoError::Git`] if every pull attempt fails.
    #[instrument(skip(self), level = "debug")]
    pub fn pull(&self) -> Result<PullOutcome> {
        self.require_initialized()?;
        if !self.git(&["remote", "get-url", "origin"]).success {
            return Err(RepoError::NoRemote);
        }

        if self.has_commits() {
            self.pull_into_history()
        } else {
            self.pull_into_unborn()
        }
    }

    fn pull_into_unborn(&self) -> Result<PullOutcome> {
        let mut outcome = PullOutcome::default();
        let pull = ["pull", "origin", MAIN_BRANCH];
        let mut output = self.git(&pull);

        if !output.success && is_overwrite_error(&output.stderr) {
            warn!("pull would overwrite local files: {}", output.stderr.trim());
            outcome.backup = self.backup_before_pull();
            let fetch = self.git(&["fetch", "origin", MAIN_BRANCH]);
            if fetch.success {
                let remote_branch = format!("origin/{MAIN_BRANCH}");
                output = self.git(&["checkout", "-b", MAIN_BRANCH, &remote_branch, "--force"]);
            }
        }

        if !output.success {
            return Err(RepoError::git(&pull, &output.stderr));
        }

        self.track_remote_branch();
        info!("pulled initial history from origin/{MAIN_BRANCH}");

        Ok(outcome)
    }

    fn pull_into_history(&self) -> Result<PullOutcome> {
        let mut outcome = PullOutcome::default();
        let first = self.git(&["pull"]);
        if first.success {
            info!("pulled from upstream");
            return Ok(outcome);
        }

        let stderr = first.stderr.to_lowercase();
        let (args, output) = if stderr.contains("no tracking information") {
            let args = vec!["pull", "--set-upstream", "origin", MAIN_BRANCH];
            let output = self.git(&args);
            if output.success {
                self.track_remote_branch();
            }
            (args, output)
        } else if is_overwrite_error(&stderr) {
            warn!("pull would overwrite local files: {}", first.stderr.trim());
            outcome.backup = self.backup_before_pull();
            let stash = self.git(&["stash", "--include-untracked"]);
            if !stash.success {
                warn!("failed to stash untracked files: {}", stash.stderr.trim());
            }
            let args = vec!["pull", "origin", MAIN_BRANCH];
            (args.clone(), self.git(&args))
        } else {
            let args = vec!["pull", "origin", MAIN_BRANCH];
            (args.clone(), self.git(&args))
        };

        if !output.success {
            return Err(RepoError::git(&args, &output.stderr));
        }
        info!("pulled from origin/{MAIN_BRANCH}");

        Ok(outcome)
    }

    fn track_remote_branch(&self) -> bool {
        let upstream = format!("--set-upstream-to=origin/{MAIN_BRANCH}");
        let output = self.git(&["branch", &upstream, MAIN_BRANCH]);
        if !output.success {
            warn!("failed to set upstream branch: {}", output.stderr.trim());
        }
        output.success
    }

    /// Snapshot local files that `origin/main` would overwrite.
    ///
    /// Fetches `origin/main`, then copies every file it contains that also
    /// exists in the work tree. Returns the snapshot directory, or `None` if
    /// nothing was at risk. Never fails: problems are logged as warnings.
    #[instrument(skip(self), level = "debug")]
    pub fn backup_before_pull(&self) -> Option<PathBuf> {
        let fetch = self.git(&["fetch", "origin", MAIN_BRANCH]);
        if !fetch.success {
            warn!("fetch before backup failed: {}", fetch.stderr.trim());
        }

        let remote_branch = format!("origin/{MAIN_BRANCH}");
        let listing = self.git(&["ls-tree", "-r", "--name-only", &remote_branch]);
        if !listing.success {
            warn!("cannot list files of {remote_branch}: {}", listing.stderr.trim());
            return None;
        }

        let work_tree = &self.paths().work_tree;
        let at_risk = listing
            .lines()
            .filter(|rel_path| work_tree.join(rel_path).exists())
            .collect::<Vec<_>>();
        if at_risk.is_empty() {
            return None;
        }

        match BackupManager::new(&self.paths().backup_root).snapshot(work_tree, at_risk) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("could not create backup: {err}");
                None
            }
        }
    }

    /// Commits that a push would send.
    pub fn push_status(&self) -> SyncStatus {
        if !self.is_initialized() || self.remote().is_empty() {
            return SyncStatus::no_remote();
        }

        if !self.has_commits() {
            return SyncStatus::in_sync();
        }

        let ahead = ["rev-list", "--count", "HEAD", "--not", "--remotes"];
        let mut output = self.git(&ahead);
        if !output.success {
            self.git(&["fetch", "origin"]);
            output = self.git(&ahead);
            if !output.success {
                return SyncStatus::in_sync();
            }
        }

        let count = output.stdout.trim().parse::<usize>().unwrap_or(0);
        let commits = if count > 0 {
            self.commit_summaries(&["log", "--oneline", "HEAD", "--not", "--remotes"])
        } else {
            Vec::new()
        };

        SyncStatus {
            has_remote: true,
            count,
            commits,
        }
    }

    /// Commits that a pull would bring in.
    ///
    /// Fetches from `origin` first.
    pub fn pull_status(&self) -> SyncStatus {
        if !self.is_initialized() || self.remote().is_empty() {
            return SyncStatus::no_remote();
        }

        if !self.has_commits() {
            return SyncStatus::in_sync();
        }

        self.git(&["fetch", "origin"]);
        let output = self.git(&["rev-list", "--count", "--remotes", "--not", "HEAD"]);
        if !output.success {
            return SyncStatus::in_sync();
        }

        let count = output.stdout.trim().parse::<usize>().unwrap_or(0);
        let commits = if count > 0 {
            let range = format!("HEAD..origin/{MAIN_BRANCH}");
            self.commit_summaries(&["log", "--oneline", &range])
        } else {
            Vec::new()
        };

        SyncStatus {
            has_remote: true,
            count,
            commits,
        }
    }

    fn commit_summaries(&self, args: &[&str]) -> Vec<String> {
        let output = self.git(args);
        if !output.success {
            return Vec::new();
        }

        output.lines().map(ToString::to_string).collect()
    }

    /// Make `main` track `origin/main`.
    ///
    /// Without commits only the branch configuration is written, to be picked
    /// up by the first push. With commits, `main` is created if needed and
    /// pushed with upstream tracking. Returns `false` on any failure.
    pub fn setup_upstream_tracking(&self) -> bool {
        if !self.has_commits() {
            let head = format!("refs/heads/{MAIN_BRANCH}");
            return self.git(&["config", "branch.main.remote", "origin"]).success
                && self.git(&["config", "branch.main.merge", &head]).success;
        }

        let head = format!("refs/heads/{MAIN_BRANCH}");
        let has_main = self
            .git(&["show-ref", "--verify", "--quiet", &head])
            .success;
        if !has_main && !self.git(&["checkout", "-b", MAIN_BRANCH]).success {
            warn!("cannot create {MAIN_BRANCH} branch");
            return false;
        }

        let push = self.git(&["push", "--set-upstream", "origin", MAIN_BRANCH]);
        if !push.success {
            warn!("failed to push upstream: {}", push.stderr.trim());
            return false;
        }

        self.track_remote_branch()
    }

    /// Point `origin` at a new URL, adding it if missing.
    ///
    /// Upstream tracking is set up afterwards, best effort.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::NotInitialized`] if repository does not exist.
    /// - Return [`RepoError::Git`] if the remote cannot be changed.
    pub fn update_remote(&mut self, url: impl Into<String>) -> Result<()> {
        self.require_initialized()?;
        let url = url.into();

        let action = if self.git(&["remote", "get-url", "origin"]).success {
            "set-url"
        } else {
            "add"
        };
        self.git_checked(&["remote", action, "origin", &url])?;
        info!("remote origin set to {url}");

        self.remote = url;
        if !self.setup_upstream_tracking() {
            warn!("upstream tracking not established for {MAIN_BRANCH}");
        }

        Ok(())
    }

    /// Remove `origin`.
    ///
    /// Succeeds without doing anything if `origin` does not exist.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::NotInitialized`] if repository does not exist.
    /// - Return [`RepoError::Git`] if removal fails.
    pub fn remove_remote(&mut self) -> Result<()> {
        self.require_initialized()?;
        self.remote.clear();

        if !self.git(&["remote", "get-url", "origin"]).success {
            return Ok(());
        }

        self.git_checked(&["remote", "remove", "origin"])?;
        info!("remote origin removed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{
        runner::{GitOutput, ScriptedRunner},
        tests::initialized_paths,
    };
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;
    use std::fs;

    const REMOTE: &str = "https://blah.org/dots.git";

    fn born() -> ScriptedRunner {
        ScriptedRunner::new().on(&["rev-parse", "HEAD"], GitOutput::ok("abc123\n"))
    }

    fn unborn() -> ScriptedRunner {
        ScriptedRunner::new().on(&["rev-parse", "HEAD"], GitOutput::failed("unknown revision"))
    }

    #[test_case("error: Your local changes would be overwritten by merge", true; "merge")]
    #[test_case("error: untracked files would be overwritten by checkout:", true; "checkout")]
    #[test_case("ERROR: WOULD BE OVERWRITTEN BY MERGE", true; "case insensitive")]
    #[test_case("I tuoi file sarebbero sovrascritti dal merge", true; "localized")]
    #[test_case("fatal: couldn't find remote ref main", false; "unrelated")]
    #[test]
    fn detect_overwrite_errors(stderr: &str, expect: bool) {
        pretty_assertions::assert_eq!(is_overwrite_error(stderr), expect);
    }

    #[test]
    fn status_without_remote_or_repo() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = born();
        let repo = DotfilesRepo::new(initialized_paths(&dir), "", &runner);
        assert_eq!(repo.push_status(), SyncStatus::no_remote());
        assert_eq!(repo.pull_status(), SyncStatus::no_remote());

        let paths = crate::git::RepoPaths::new(
            dir.path().join("nope.git"),
            dir.path(),
            dir.path().join("x"),
        );
        let repo = DotfilesRepo::new(paths, REMOTE, &runner);
        assert_eq!(repo.push_status(), SyncStatus::no_remote());
        assert!(runner.calls().is_empty());

        Ok(())
    }

    #[test]
    fn status_without_commits_is_in_sync() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = unborn();
        let repo = DotfilesRepo::new(initialized_paths(&dir), REMOTE, &runner);

        assert_eq!(repo.push_status(), SyncStatus::in_sync());
        assert_eq!(repo.pull_status(), SyncStatus::in_sync());
        assert!(!runner.called_with_prefix(&["rev-list"]));

        Ok(())
    }

    #[test]
    fn push_status_counts_and_lists_commits() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = born()
            .on(&["rev-list", "--count", "HEAD", "--not", "--remotes"], GitOutput::ok("2\n"))
            .on(
                &["log", "--oneline", "HEAD", "--not", "--remotes"],
                GitOutput::ok("b2c3d4e update .vimrc\na1b2c3d add .bashrc\n"),
            );
        let repo = DotfilesRepo::new(initialized_paths(&dir), REMOTE, &runner);

        let expect = SyncStatus {
            has_remote: true,
            count: 2,
            commits: vec!["b2c3d4e update .vimrc".into(), "a1b2c3d add .bashrc".into()],
        };
        assert_eq!(repo.push_status(), expect);
        assert!(!runner.called(&["fetch", "origin"]));

        Ok(())
    }

    #[test]
    fn push_status_fetches_once_on_failure() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let ahead = ["rev-list", "--count", "HEAD", "--not", "--remotes"];
        let runner = born()
            .on(&ahead, GitOutput::failed("bad revision"))
            .on(&ahead, GitOutput::ok("0\n"));
        let repo = DotfilesRepo::new(initialized_paths(&dir), REMOTE, &runner);

        assert_eq!(repo.push_status(), SyncStatus::in_sync());
        assert!(runner.called(&["fetch", "origin"]));
        assert!(!runner.called_with_prefix(&["log"]));

        Ok(())
    }

    #[test]
    fn pull_status_fetches_before_counting() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = born()
            .on(&["rev-list", "--count", "--remotes", "--not", "HEAD"], GitOutput::ok("1\n"))
            .on(&["log", "--oneline", "HEAD..origin/main"], GitOutput::ok("f00ba47 add .zshrc\n"));
        let repo = DotfilesRepo::new(initialized_paths(&dir), REMOTE, &runner);

        let status = repo.pull_status();
        assert_eq!(status.count, 1);
        assert_eq!(status.commits, vec!["f00ba47 add .zshrc".to_string()]);

        let calls = runner.calls();
        let fetch = calls.iter().position(|call| call == &["fetch", "origin"]);
        let count = calls.iter().position(|call| call.first().is_some_and(|arg| arg == "rev-list"));
        assert!(fetch < count);

        Ok(())
    }

    #[test]
    fn push_requires_initialization() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = crate::git::RepoPaths::new(
            dir.path().join("nope.git"),
            dir.path(),
            dir.path().join("x"),
        );
        let runner = ScriptedRunner::new();
        let repo = DotfilesRepo::new(paths, REMOTE, &runner);
        assert!(matches!(repo.push(), Err(RepoError::NotInitialized { .. })));
        assert!(matches!(repo.pull(), Err(RepoError::NotInitialized { .. })));
        assert!(runner.calls().is_empty());

        let repo = DotfilesRepo::new(initialized_paths(&dir), REMOTE, &runner);
        repo.push()?;
        assert!(runner.called(&["push", "origin", "main"]));

        Ok(())
    }

    #[test]
    fn pull_without_origin_is_no_remote() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = born().on(
            &["remote", "get-url", "origin"],
            GitOutput::failed("error: No such remote 'origin'"),
        );
        let repo = DotfilesRepo::new(initialized_paths(&dir), "", &runner);

        assert!(matches!(repo.pull(), Err(RepoError::NoRemote)));
        assert!(!runner.called_with_prefix(&["pull"]));

        Ok(())
    }

    #[test]
    fn pull_into_unborn_forces_checkout_after_backup() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = initialized_paths(&dir);
        fs::write(paths.work_tree.join(".bashrc"), "local\n")?;
        let runner = unborn()
            .on(
                &["pull", "origin", "main"],
                GitOutput::failed(concat!(
                    "error: The following untracked working tree files would be overwritten ",
                    "by merge:\n\t.bashrc\n",
                )),
            )
            .on(
                &["ls-tree", "-r", "--name-only", "origin/main"],
                GitOutput::ok(".bashrc\n.vimrc\n"),
            );
        let repo = DotfilesRepo::new(paths.clone(), REMOTE, &runner);

        let outcome = repo.pull()?;
        let backup = outcome.backup.unwrap();
        assert!(backup.starts_with(&paths.backup_root));
        assert_eq!(fs::read_to_string(backup.join(".bashrc"))?, "local\n");
        assert!(!backup.join(".vimrc").exists());
        assert!(runner.called(&["fetch", "origin", "main"]));
        assert!(runner.called(&["checkout", "-b", "main", "origin/main", "--force"]));
        assert!(runner.called(&["branch", "--set-upstream-to=origin/main", "main"]));
        assert!(!runner.called_with_prefix(&["stash"]));

        Ok(())
    }

    #[test]
    fn pull_into_unborn_reports_unrelated_failure() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = unborn().on(
            &["pull", "origin", "main"],
            GitOutput::failed("fatal: couldn't find remote ref main\n"),
        );
        let repo = DotfilesRepo::new(initialized_paths(&dir), REMOTE, &runner);

        assert!(matches!(repo.pull(), Err(RepoError::Git { .. })));
        assert!(!runner.called_with_prefix(&["checkout"]));
        assert!(!runner.called_with_prefix(&["branch"]));

        Ok(())
    }

    #[test]
    fn pull_without_tracking_sets_upstream() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = born().on(
            &["pull"],
            GitOutput::failed("There is no tracking information for the current branch.\n"),
        );
        let repo = DotfilesRepo::new(initialized_paths(&dir), REMOTE, &runner);

        assert_eq!(repo.pull()?, PullOutcome::default());
        assert!(runner.called(&["pull", "--set-upstream", "origin", "main"]));
        assert!(runner.called(&["branch", "--set-upstream-to=origin/main", "main"]));
        assert!(!runner.called(&["pull", "origin", "main"]));

        Ok(())
    }

    #[test]
    fn pull_over_local_files_stashes_without_restoring() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = initialized_paths(&dir);
        fs::write(paths.work_tree.join(".vimrc"), "set nu\n")?;
        let runner = born()
            .on(
                &["pull"],
                GitOutput::failed(concat!(
                    "error: Your local changes to the following files would be overwritten ",
                    "by merge:\n",
                )),
            )
            .on(&["ls-tree", "-r", "--name-only", "origin/main"], GitOutput::ok(".vimrc\n"));
        let repo = DotfilesRepo::new(paths, REMOTE, &runner);

        let outcome = repo.pull()?;
        assert!(outcome.backup.is_some());
        assert!(runner.called(&["stash", "--include-untracked"]));
        assert!(runner.called(&["pull", "origin", "main"]));
        assert!(!runner.called_with_prefix(&["stash", "pop"]));
        assert!(!runner.called_with_prefix(&["stash", "apply"]));

        Ok(())
    }

    #[test]
    fn pull_retries_explicitly_once() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = born()
            .on(&["pull"], GitOutput::failed("fatal: refusing to merge unrelated histories\n"))
            .on(
                &["pull", "origin", "main"],
                GitOutput::failed("fatal: refusing to merge unrelated histories\n"),
            );
        let repo = DotfilesRepo::new(initialized_paths(&dir), REMOTE, &runner);

        let result = repo.pull().map_err(|err| err.to_string());
        assert_eq!(
            result,
            Err("git pull origin main failed: fatal: refusing to merge unrelated histories".into())
        );
        let pulls = runner
            .calls()
            .into_iter()
            .filter(|call| call.first().is_some_and(|arg| arg == "pull"))
            .count();
        assert_eq!(pulls, 2);

        Ok(())
    }

    #[test]
    fn backup_before_pull_with_nothing_at_risk() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = initialized_paths(&dir);
        let runner =
            born().on(&["ls-tree", "-r", "--name-only", "origin/main"], GitOutput::ok(".zshrc\n"));
        let repo = DotfilesRepo::new(paths.clone(), REMOTE, &runner);

        assert_eq!(repo.backup_before_pull(), None);
        assert!(!paths.backup_root.exists());

        Ok(())
    }

    #[test]
    fn upstream_tracking_without_commits_writes_config() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = unborn();
        let repo = DotfilesRepo::new(initialized_paths(&dir), REMOTE, &runner);

        assert!(repo.setup_upstream_tracking());
        assert!(runner.called(&["config", "branch.main.remote", "origin"]));
        assert!(runner.called(&["config", "branch.main.merge", "refs/heads/main"]));
        assert!(!runner.called_with_prefix(&["push"]));

        Ok(())
    }

    #[test]
    fn upstream_tracking_with_commits_creates_main() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = born().on(
            &["show-ref", "--verify", "--quiet", "refs/heads/main"],
            GitOutput::failed(""),
        );
        let repo = DotfilesRepo::new(initialized_paths(&dir), REMOTE, &runner);

        assert!(repo.setup_upstream_tracking());
        assert!(runner.called(&["checkout", "-b", "main"]));
        assert!(runner.called(&["push", "--set-upstream", "origin", "main"]));
        assert!(runner.called(&["branch", "--set-upstream-to=origin/main", "main"]));

        Ok(())
    }

    #[test]
    fn update_remote_adds_or_replaces_origin() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let missing =
            unborn().on(&["remote", "get-url", "origin"], GitOutput::failed("No such remote"));
        let mut repo = DotfilesRepo::new(initialized_paths(&dir), "", &missing);
        repo.update_remote(REMOTE)?;
        assert!(missing.called(&["remote", "add", "origin", REMOTE]));
        assert_eq!(repo.remote(), REMOTE);

        let present = unborn().on(
            &["remote", "get-url", "origin"],
            GitOutput::ok("https://old.org/dots.git\n"),
        );
        let mut repo =
            DotfilesRepo::new(initialized_paths(&dir), "https://old.org/dots.git", &present);
        repo.update_remote(REMOTE)?;
        assert!(present.called(&["remote", "set-url", "origin", REMOTE]));

        Ok(())
    }

    #[test]
    fn remove_missing_remote_is_noop() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let runner = ScriptedRunner::new()
            .on(&["remote", "get-url", "origin"], GitOutput::failed("No such remote"));
        let mut repo = DotfilesRepo::new(initialized_paths(&dir), REMOTE, &runner);

        repo.remove_remote()?;
        assert!(!runner.called(&["remote", "remove", "origin"]));
        assert_eq!(repo.remote(), "");

        Ok(())
    }
}
