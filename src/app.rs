// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Interactive application driver.
//!
//! Ties the settings store, the dotfiles repository, and a [`Frontend`]
//! together. The driver owns all three for the whole session, so settings are
//! loaded once and only written back through [`ConfigStore`].

use crate::{
    backup::BackupManager,
    browse::{filter_items, list_directory, sort_items, validate_path, SortMode},
    config::{ConfigStore, Configuration},
    git::{
        runner::{CommandRunner, GitCli},
        DotfilesRepo, SyncStatus,
    },
    logging::LogFile,
    ui::{Action, Frontend, FrontendError, Listing, MessageLevel, Screen},
};

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Number of log lines shown by the log viewer.
pub const LOG_TAIL_LINES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    MainMenu,
    Browser,
    Changes,
    Tracked,
    Settings,
    Backups,
    Log,
    Quit,
}

/// Interactive dotfiles manager session.
pub struct App<F, R = GitCli>
where
    F: Frontend,
    R: CommandRunner,
{
    store: ConfigStore,
    repo: DotfilesRepo<R>,
    frontend: F,
    log: LogFile,
    cwd: PathBuf,
    sort: SortMode,
    filter: String,
    push_status: SyncStatus,
    pull_status: SyncStatus,
}

impl<F> App<F, GitCli>
where
    F: Frontend,
{
    /// Open session on settings store using the Git binary.
    ///
    /// # Errors
    ///
    /// - Return error if repository paths cannot be resolved.
    pub fn open(mut store: ConfigStore, frontend: F, log: LogFile) -> Result<Self> {
        let repo = DotfilesRepo::open(store.config())?;
        Ok(Self::new(store, repo, frontend, log))
    }
}

impl<F, R> App<F, R>
where
    F: Frontend,
    R: CommandRunner,
{
    /// Construct new session.
    ///
    /// The file browser starts at the work tree.
    pub fn new(store: ConfigStore, repo: DotfilesRepo<R>, frontend: F, log: LogFile) -> Self {
        let cwd = repo.paths().work_tree.clone();
        Self {
            store,
            repo,
            frontend,
            log,
            cwd,
            sort: SortMode::default(),
            filter: String::new(),
            push_status: SyncStatus::default(),
            pull_status: SyncStatus::default(),
        }
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn repo(&self) -> &DotfilesRepo<R> {
        &self.repo
    }

    /// Run the main loop until the user quits.
    ///
    /// Interrupting a prompt ends the session normally.
    ///
    /// # Errors
    ///
    /// - Return error if the front end fails for any other reason.
    pub fn run(&mut self) -> Result<()> {
        let mut view = View::MainMenu;
        while view != View::Quit {
            view = match self.step(view) {
                Ok(next) => next,
                Err(FrontendError::Interrupted) => View::Quit,
                Err(err) => return Err(err.into()),
            };
        }

        Ok(())
    }

    fn step(&mut self, view: View) -> Result<View, FrontendError> {
        match view {
            View::MainMenu => self.main_menu(),
            View::Browser => self.browser(),
            View::Changes => self.changes(),
            View::Tracked => self.tracked(),
            View::Settings => self.settings(),
            View::Backups => self.backups(),
            View::Log => self.log_viewer(),
            View::Quit => Ok(View::Quit),
        }
    }

    fn main_menu(&mut self) -> Result<View, FrontendError> {
        let initialized = self.repo.is_initialized();
        let action = self.frontend.read_action(Screen::MainMenu { initialized })?;
        let next = match action {
            Action::ShowBrowser => View::Browser,
            Action::ShowChanges => {
                self.refresh_sync_status();
                View::Changes
            }
            Action::ShowTracked => View::Tracked,
            Action::ShowSettings => View::Settings,
            Action::Quit | Action::Back => View::Quit,
            _ => View::MainMenu,
        };

        Ok(next)
    }

    fn browser(&mut self) -> Result<View, FrontendError> {
        let mut items = filter_items(&list_directory(&self.cwd), &self.filter);
        sort_items(&mut items, self.sort);
        self.frontend.render_list(Listing::Directory {
            dir: &self.cwd,
            items: &items,
            sort: self.sort,
        });

        let action = self.frontend.read_action(Screen::Browser {
            dir: &self.cwd,
            items: &items,
            sort: self.sort,
            filter: &self.filter,
        })?;
        match action {
            Action::Enter(dir) if dir.is_dir() => {
                self.cwd = dir;
                self.filter.clear();
            }
            Action::Enter(dir) => {
                let message = format!("Not a directory: {}", dir.display());
                self.frontend.render_message(MessageLevel::Warning, &message);
            }
            Action::CycleSort => self.sort = self.sort.next(),
            Action::Filter(term) => self.filter = term,
            Action::Stage(paths) => self.stage(paths),
            Action::Back | Action::Quit => {
                self.filter.clear();
                return Ok(View::MainMenu);
            }
            _ => {}
        }

        Ok(View::Browser)
    }

    fn stage(&mut self, paths: Vec<PathBuf>) {
        if paths.is_empty() {
            return;
        }

        self.frontend
            .render_message(MessageLevel::Progress, "Adding files to repository");
        if !self.repo.is_initialized() {
            error!("cannot add files: repository not initialized");
            self.frontend.render_message(
                MessageLevel::Error,
                "Git repository not initialized! Go to Settings to initialize it.",
            );
            return;
        }

        let protected = [self.store.path().to_path_buf()];
        let mut requested = 0;
        let mut valid = Vec::new();
        for path in paths {
            requested += 1;
            match validate_path(&path, &protected) {
                Ok(path) => valid.push(path),
                Err(err) => {
                    warn!("skip {:?}: {err}", path.display());
                    self.frontend
                        .render_message(MessageLevel::Warning, &err.to_string());
                }
            }
        }

        let outcome = match self.repo.add_files(&valid) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("git add failed: {err}");
                self.frontend.render_message(MessageLevel::Error, &err.to_string());
                return;
            }
        };

        for (path, reason) in &outcome.failed {
            error!("cannot add {:?}: {reason}", path.display());
            let message = format!("{}: {reason}", display_name(path));
            self.frontend.render_message(MessageLevel::Warning, &message);
        }

        let added = outcome.added.len();
        if added > 0 && added == requested {
            info!("added all {added} files to repository");
            let message = format!("Added all {added} files to repository!");
            self.frontend.render_message(MessageLevel::Success, &message);
        } else if added > 0 {
            let failed = requested - added;
            warn!("added {added} files, {failed} failed");
            let message = format!("Added {added} files to repository, {failed} failed");
            self.frontend.render_message(MessageLevel::Warning, &message);
        } else {
            error!("failed to add all {requested} files");
            let message = format!("Failed to add all {requested} files");
            self.frontend.render_message(MessageLevel::Error, &message);
        }
    }

    fn refresh_sync_status(&mut self) {
        self.frontend
            .render_message(MessageLevel::Progress, "Checking remote status");
        self.push_status = self.repo.push_status();
        self.pull_status = self.repo.pull_status();
    }

    fn changes(&mut self) -> Result<View, FrontendError> {
        let changes = self.repo.changes();
        let suggested_message = self.repo.commit_message();
        self.frontend.render_list(Listing::Changes(&changes));
        if self.push_status.count > 0 {
            self.frontend.render_list(Listing::Commits {
                title: "Commits to push:",
                commits: &self.push_status.commits,
            });
        }
        if self.pull_status.count > 0 {
            self.frontend.render_list(Listing::Commits {
                title: "Commits to pull:",
                commits: &self.pull_status.commits,
            });
        }

        let action = self.frontend.read_action(Screen::Changes {
            changes: &changes,
            push: &self.push_status,
            pull: &self.pull_status,
            suggested_message: &suggested_message,
        })?;

        match action {
            Action::Commit(message) => {
                let message = message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or(suggested_message);
                self.commit(&message)?;
            }
            Action::Push => self.push(),
            Action::Pull => self.pull(),
            Action::UnstageAll => {
                self.frontend
                    .render_message(MessageLevel::Progress, "Removing from staging");
                let result = self.repo.unstage_all();
                self.report(result, "Changes removed from staging!");
            }
            Action::Unstage(paths) if !paths.is_empty() => {
                let count = paths.len();
                let message = format!("Removing {count} files from staging");
                self.frontend.render_message(MessageLevel::Progress, &message);
                let result = self.repo.unstage_files(&paths);
                self.report(result, &format!("{count} files removed from staging!"));
            }
            Action::Refresh => self.refresh_sync_status(),
            Action::Back | Action::Quit => return Ok(View::MainMenu),
            _ => {}
        }

        Ok(View::Changes)
    }

    fn commit(&mut self, message: &str) -> Result<(), FrontendError> {
        self.frontend
            .render_message(MessageLevel::Progress, "Executing commit");
        if let Err(err) = self.repo.commit(message) {
            error!("commit failed: {err}");
            let message = format!("Error during commit: {err}");
            self.frontend.render_message(MessageLevel::Error, &message);
            return Ok(());
        }

        info!("commit successful: {message}");
        self.frontend
            .render_message(MessageLevel::Success, "Commit completed successfully!");
        self.refresh_sync_status();

        let ahead = self.push_status.count;
        if ahead > 0 {
            let question = format!("Push {ahead} commits to remote?");
            if self.frontend.confirm(&question)? {
                self.push();
            }
        }

        Ok(())
    }

    fn push(&mut self) {
        if !self.push_status.has_remote {
            self.frontend
                .render_message(MessageLevel::Warning, "No remote repository configured");
            return;
        }

        self.frontend
            .render_message(MessageLevel::Progress, "Executing push");
        match self.repo.push() {
            Ok(()) => {
                info!("push successful to remote repository");
                self.frontend
                    .render_message(MessageLevel::Success, "Push completed successfully!");
            }
            Err(err) => {
                error!("push failed: {err}");
                let message = format!("Error during push: {err}");
                self.frontend.render_message(MessageLevel::Error, &message);
            }
        }
        self.refresh_sync_status();
    }

    fn pull(&mut self) {
        self.frontend
            .render_message(MessageLevel::Progress, "Executing pull");
        match self.repo.pull() {
            Ok(outcome) => {
                info!("pull successful from remote repository");
                self.frontend
                    .render_message(MessageLevel::Success, "Pull completed successfully!");
                if let Some(backup) = outcome.backup {
                    let message = format!("Existing files saved to backup: {}", backup.display());
                    self.frontend.render_message(MessageLevel::Info, &message);
                }
            }
            Err(err) => {
                error!("pull failed: {err}");
                let message = format!("Error during pull: {err}");
                self.frontend.render_message(MessageLevel::Error, &message);
            }
        }
        self.refresh_sync_status();
    }

    fn report(&mut self, result: crate::git::Result<()>, success: &str) {
        match result {
            Ok(()) => self.frontend.render_message(MessageLevel::Success, success),
            Err(err) => {
                error!("{err}");
                self.frontend.render_message(MessageLevel::Error, &err.to_string());
            }
        }
        self.refresh_sync_status();
    }

    fn tracked(&mut self) -> Result<View, FrontendError> {
        let files = self.repo.tracked_files();
        self.frontend.render_list(Listing::TrackedFiles(&files));
        let action = self
            .frontend
            .read_action(Screen::TrackedFiles { files: &files })?;

        match action {
            Action::Back | Action::Quit => Ok(View::MainMenu),
            _ => Ok(View::Tracked),
        }
    }

    fn settings(&mut self) -> Result<View, FrontendError> {
        let config = self.store.config().clone();
        let issues = self.store.validate_paths();
        let action = self.frontend.read_action(Screen::Settings {
            config: &config,
            issues: &issues,
        })?;

        match action {
            Action::SaveSettings(edited) => self.save_settings(config, edited),
            Action::InitializeRepo => self.initialize()?,
            Action::ShowBackups => return Ok(View::Backups),
            Action::ShowLog if config.enable_logging => return Ok(View::Log),
            Action::ShowLog => self
                .frontend
                .render_message(MessageLevel::Info, "Logging is disabled"),
            Action::Back | Action::Quit => return Ok(View::MainMenu),
            _ => {}
        }

        Ok(View::Settings)
    }

    fn save_settings(&mut self, old: Configuration, new: Configuration) {
        if old == new {
            return;
        }

        if let Err(err) = self.store.save(new.clone()) {
            error!("cannot save settings: {err}");
            self.frontend
                .render_message(MessageLevel::Error, "Error saving configuration!");
            return;
        }

        if let Err(err) = self.repo.reconfigure(&new) {
            error!("cannot apply settings: {err}");
            self.frontend.render_message(MessageLevel::Error, &err.to_string());
            return;
        }
        self.cwd = self.repo.paths().work_tree.clone();

        let new_remote = new.remote.trim();
        if old.remote.trim() != new_remote && self.repo.is_initialized() {
            let result = if new_remote.is_empty() {
                self.repo.remove_remote()
            } else {
                self.repo.update_remote(new_remote)
            };
            match result {
                Ok(()) if new_remote.is_empty() => info!("remote origin removed"),
                Ok(()) => info!("remote origin updated to: {new_remote}"),
                Err(err) => {
                    error!("failed to update remote origin: {err}");
                    self.frontend.render_message(MessageLevel::Error, &err.to_string());
                }
            }
        }

        if !old.enable_logging && new.enable_logging {
            info!("logging enabled by user");
            self.frontend.render_message(
                MessageLevel::Info,
                &format!("Logging to {} starts on next launch", self.log.path().display()),
            );
        }

        self.frontend
            .render_message(MessageLevel::Success, "Configuration saved!");
    }

    fn initialize(&mut self) -> Result<(), FrontendError> {
        let question = format!(
            "Initialize repository at {}? Any existing repository there is deleted.",
            self.repo.paths().git_dir.display()
        );
        if !self.frontend.confirm(&question)? {
            return Ok(());
        }

        self.frontend
            .render_message(MessageLevel::Progress, "Initializing Git repository");
        match self.repo.initialize() {
            Ok(()) => self
                .frontend
                .render_message(MessageLevel::Success, "Repository initialized successfully!"),
            Err(err) => {
                error!("initialization failed: {err}");
                let message = format!("Error during initialization: {err}");
                self.frontend.render_message(MessageLevel::Error, &message);
            }
        }

        Ok(())
    }

    fn backups(&mut self) -> Result<View, FrontendError> {
        let manager = BackupManager::new(&self.repo.paths().backup_root);
        let backups = match manager.list() {
            Ok(backups) => backups,
            Err(err) => {
                error!("{err}");
                self.frontend.render_message(MessageLevel::Error, &err.to_string());
                Vec::new()
            }
        };
        self.frontend.render_list(Listing::Backups(&backups));

        let action = self
            .frontend
            .read_action(Screen::Backups { backups: &backups })?;
        match action {
            Action::DeleteBackup(name) => {
                let question = format!("Delete backup {name}?");
                if self.frontend.confirm(&question)? {
                    match manager.delete(&name) {
                        Ok(true) => {
                            let message = format!("Deleted backup {name}");
                            self.frontend.render_message(MessageLevel::Success, &message);
                        }
                        Ok(false) => {
                            let message = format!("No backup named {name}");
                            self.frontend.render_message(MessageLevel::Warning, &message);
                        }
                        Err(err) => {
                            error!("{err}");
                            self.frontend.render_message(MessageLevel::Error, &err.to_string());
                        }
                    }
                }
            }
            Action::Back | Action::Quit => return Ok(View::Settings),
            _ => {}
        }

        Ok(View::Backups)
    }

    fn log_viewer(&mut self) -> Result<View, FrontendError> {
        let lines = self.log.tail(LOG_TAIL_LINES);
        let header = format!(
            "{} ({} bytes)",
            self.log.path().display(),
            self.log.size()
        );
        self.frontend.render_message(MessageLevel::Info, &header);
        self.frontend.render_list(Listing::LogLines(&lines));

        if self.frontend.confirm("Clear log?")? {
            match self.log.clear() {
                Ok(()) => self
                    .frontend
                    .render_message(MessageLevel::Success, "Log cleared"),
                Err(err) => self
                    .frontend
                    .render_message(MessageLevel::Error, &err.to_string()),
            }
        }

        Ok(View::Settings)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
