// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{RemoteFixture, Sandbox};

use dotmgr::{
    backup::BackupManager,
    git::status::{FileState, StatusCode},
};

use anyhow::Result;
use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::fs;

#[sealed_test(env = [("LC_ALL", "C"), ("GIT_CONFIG_NOSYSTEM", "1")])]
fn initialize_configures_bare_alias() -> Result<()> {
    let sandbox = Sandbox::new("")?;
    assert!(!sandbox.repo.is_initialized());

    sandbox.initialize()?;
    assert!(sandbox.repo.is_initialized());
    assert!(!sandbox.repo.has_commits());
    assert_eq!(sandbox.repo.verify_configuration(), Vec::<String>::new());
    assert!(sandbox.repo.paths().excludes_file.exists());

    Ok(())
}

#[sealed_test(env = [("LC_ALL", "C"), ("GIT_CONFIG_NOSYSTEM", "1")])]
fn add_commit_push_reaches_remote() -> Result<()> {
    let remote_dir = tempfile::tempdir()?;
    let remote = RemoteFixture::new(remote_dir.path().join("dots.git"))?;
    let sandbox = Sandbox::new(remote.url())?;
    sandbox.initialize()?;
    sandbox.write(".bashrc", "alias ll='ls -l'\n")?;

    let outcome = sandbox.repo.add_files([sandbox.home().join(".bashrc")])?;
    assert!(outcome.is_success());
    let changes = sandbox.repo.changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].staged, StatusCode::Added);

    let message = sandbox.repo.commit_message();
    assert_eq!(message, "add .bashrc");
    sandbox.repo.commit(&message)?;
    assert!(sandbox.repo.has_commits());
    assert_eq!(sandbox.repo.push_status().count, 1);

    sandbox.repo.push()?;
    assert_eq!(remote.file_at_main(".bashrc")?, "alias ll='ls -l'\n");
    assert_eq!(sandbox.repo.push_status().count, 0);

    let tracked = sandbox.repo.tracked_files();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].state, FileState::Tracked);

    Ok(())
}

#[sealed_test(env = [("LC_ALL", "C"), ("GIT_CONFIG_NOSYSTEM", "1")])]
fn unstage_works_with_and_without_history() -> Result<()> {
    let sandbox = Sandbox::new("")?;
    sandbox.initialize()?;
    sandbox.write(".vimrc", "set number\n")?;

    sandbox.repo.add_file(".vimrc")?;
    assert_eq!(sandbox.repo.changes().len(), 1);
    sandbox.repo.unstage_all()?;
    assert!(sandbox.repo.changes().is_empty());

    sandbox.repo.add_file(".vimrc")?;
    sandbox.repo.commit("add .vimrc")?;
    sandbox.write(".vimrc", "set number\nset relativenumber\n")?;
    sandbox.repo.add_file(".vimrc")?;
    assert_eq!(sandbox.repo.changes()[0].staged, StatusCode::Modified);

    sandbox.repo.unstage_file(".vimrc")?;
    let changes = sandbox.repo.changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].staged, StatusCode::Unmodified);
    assert_eq!(changes[0].worktree, StatusCode::Modified);
    let expect = FileState::Changed {
        staged: StatusCode::Unmodified,
        worktree: StatusCode::Modified,
    };
    assert_eq!(sandbox.repo.file_info(".vimrc"), Some(expect));

    Ok(())
}

#[sealed_test(env = [("LC_ALL", "C"), ("GIT_CONFIG_NOSYSTEM", "1")])]
fn pull_into_fresh_repo_backs_up_clobbered_files() -> Result<()> {
    let remote_dir = tempfile::tempdir()?;
    let remote = RemoteFixture::new(remote_dir.path().join("dots.git"))?;
    remote.stage_and_commit(".bashrc", "remote\n")?;

    let sandbox = Sandbox::new(remote.url())?;
    sandbox.initialize()?;
    sandbox.write(".bashrc", "local\n")?;

    let outcome = sandbox.repo.pull()?;
    assert_eq!(sandbox.read(".bashrc")?, "remote\n");
    assert!(sandbox.repo.has_commits());

    let backup = outcome.backup.ok_or_else(|| anyhow::anyhow!("no backup taken"))?;
    assert_eq!(fs::read_to_string(backup.join(".bashrc"))?, "local\n");

    let backups = BackupManager::new(&sandbox.repo.paths().backup_root).list()?;
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].file_count, 1);

    Ok(())
}

#[sealed_test(env = [("LC_ALL", "C"), ("GIT_CONFIG_NOSYSTEM", "1")])]
fn pull_status_counts_remote_commits() -> Result<()> {
    let remote_dir = tempfile::tempdir()?;
    let remote = RemoteFixture::new(remote_dir.path().join("dots.git"))?;
    remote.stage_and_commit(".bashrc", "remote\n")?;

    let sandbox = Sandbox::new(remote.url())?;
    sandbox.initialize()?;
    let outcome = sandbox.repo.pull()?;
    assert_eq!(outcome.backup, None);
    assert_eq!(sandbox.repo.pull_status().count, 0);

    remote.stage_and_commit(".vimrc", "set number\n")?;
    let status = sandbox.repo.pull_status();
    assert!(status.has_remote);
    assert_eq!(status.count, 1);
    assert_eq!(status.commits.len(), 1);

    sandbox.repo.pull()?;
    assert_eq!(sandbox.read(".vimrc")?, "set number\n");
    assert_eq!(sandbox.repo.pull_status().count, 0);

    Ok(())
}

#[sealed_test(env = [("LC_ALL", "C"), ("GIT_CONFIG_NOSYSTEM", "1")])]
fn untrack_drops_file_from_index_only() -> Result<()> {
    let sandbox = Sandbox::new("")?;
    sandbox.initialize()?;
    sandbox.write(".gitconfig", "[user]\n")?;
    let gitconfig = sandbox.home().join(".gitconfig");

    sandbox.repo.add_file(&gitconfig)?;
    sandbox.repo.commit("add .gitconfig")?;
    assert!(sandbox.repo.is_file_tracked(&gitconfig));
    assert!(sandbox.repo.is_file_tracked(".gitconfig"));

    sandbox.repo.untrack_file(&gitconfig)?;
    assert!(!sandbox.repo.is_file_tracked(".gitconfig"));
    assert_eq!(sandbox.read(".gitconfig")?, "[user]\n");

    let changes = sandbox.repo.changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].staged, StatusCode::Deleted);

    Ok(())
}
