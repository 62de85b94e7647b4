// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Presentation boundary.
//!
//! The application driver never draws anything itself. It hands records to a
//! [`Frontend`] and receives [`Action`] tokens back, which keeps terminal
//! handling out of the reconciler entirely.

mod console;

pub use console::ConsoleFrontend;

use crate::{
    backup::BackupSnapshot,
    browse::{format_file_mtime, format_file_size, DirectoryItem, ItemKind, SortMode},
    config::Configuration,
    git::{
        status::{GitChange, TrackedFileInfo},
        SyncStatus,
    },
};

use chrono::Local;
use std::path::{Path, PathBuf};

/// Records handed to a front end for display.
#[derive(Debug, Clone, Copy)]
pub enum Listing<'a> {
    Changes(&'a [GitChange]),
    TrackedFiles(&'a [TrackedFileInfo]),
    Directory {
        dir: &'a Path,
        items: &'a [DirectoryItem],
        sort: SortMode,
    },
    Backups(&'a [BackupSnapshot]),
    Commits {
        title: &'a str,
        commits: &'a [String],
    },
    LogLines(&'a [String]),
}

/// Severity of a message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Long running operation has started, e.g., a push.
    Progress,

    /// Plain notice.
    Info,

    /// Operation completed.
    Success,

    /// Operation partially failed, or needs attention.
    Warning,

    /// Operation failed.
    Error,
}

/// Where the user currently is, with the data needed to pick an action.
#[derive(Debug, Clone, Copy)]
pub enum Screen<'a> {
    MainMenu {
        initialized: bool,
    },
    Changes {
        changes: &'a [GitChange],
        push: &'a SyncStatus,
        pull: &'a SyncStatus,
        suggested_message: &'a str,
    },
    /// Directory listing, already filtered and sorted.
    Browser {
        dir: &'a Path,
        items: &'a [DirectoryItem],
        sort: SortMode,
        filter: &'a str,
    },
    TrackedFiles {
        files: &'a [TrackedFileInfo],
    },
    Settings {
        config: &'a Configuration,
        issues: &'a [String],
    },
    Backups {
        backups: &'a [BackupSnapshot],
    },
}

/// User intent returned by a front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ShowBrowser,
    ShowChanges,
    ShowTracked,
    ShowSettings,
    ShowBackups,
    ShowLog,

    /// Commit staged changes, with the generated message when `None`.
    Commit(Option<String>),
    Push,
    Pull,
    UnstageAll,
    Unstage(Vec<String>),
    Refresh,

    /// Open a directory in the browser.
    Enter(PathBuf),

    /// Switch the browser to the next sort mode.
    CycleSort,

    /// Show only browser entries whose name contains the term.
    Filter(String),

    /// Stage files picked in the browser.
    Stage(Vec<PathBuf>),
    SaveSettings(Configuration),
    InitializeRepo,
    DeleteBackup(String),
    Back,
    Quit,
}

/// Front end capabilities the application driver relies on.
pub trait Frontend {
    /// Show a list of records.
    fn render_list(&mut self, listing: Listing<'_>);

    /// Show a one line message.
    fn render_message(&mut self, level: MessageLevel, message: &str);

    /// Ask the user what to do next on target screen.
    ///
    /// # Errors
    ///
    /// - Return [`FrontendError::Interrupted`] if the user aborts the program.
    /// - Return [`FrontendError`] if user input cannot be read.
    fn read_action(&mut self, screen: Screen<'_>) -> Result<Action>;

    /// Ask a yes or no question.
    ///
    /// # Errors
    ///
    /// - Return [`FrontendError::Interrupted`] if the user aborts the program.
    /// - Return [`FrontendError`] if user input cannot be read.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Non-interactive front end for scripted use.
///
/// Listings go to stdout and messages to stderr. Every question is answered
/// with a fixed reply, and every screen answers [`Action::Quit`].
#[derive(Debug, Clone)]
pub struct PlainFrontend {
    assume_yes: bool,
}

impl PlainFrontend {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Frontend for PlainFrontend {
    fn render_list(&mut self, listing: Listing<'_>) {
        for line in listing_lines(listing) {
            println!("{line}");
        }
    }

    fn render_message(&mut self, level: MessageLevel, message: &str) {
        if level != MessageLevel::Progress {
            eprintln!("{}{message}", message_prefix(level));
        }
    }

    fn read_action(&mut self, _screen: Screen<'_>) -> Result<Action> {
        Ok(Action::Quit)
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        if !self.assume_yes {
            eprintln!("{question} (pass --yes to confirm)");
        }
        Ok(self.assume_yes)
    }
}

pub(crate) fn message_prefix(level: MessageLevel) -> &'static str {
    match level {
        MessageLevel::Progress => "... ",
        MessageLevel::Info => "",
        MessageLevel::Success => "ok: ",
        MessageLevel::Warning => "warning: ",
        MessageLevel::Error => "error: ",
    }
}

/// Render a listing as plain text lines.
pub fn listing_lines(listing: Listing<'_>) -> Vec<String> {
    let now = Local::now();
    let mtime = |time: Option<std::time::SystemTime>| {
        time.map(|time| format_file_mtime(time, now))
            .unwrap_or_else(|| "-".into())
    };

    match listing {
        Listing::Changes([]) => vec!["No changes".into()],
        Listing::Changes(changes) => changes
            .iter()
            .map(|change| match &change.orig_path {
                Some(orig_path) => {
                    format!("{} {orig_path} -> {}", change.status_code(), change.path)
                }
                None => format!("{} {}", change.status_code(), change.path),
            })
            .collect(),
        Listing::TrackedFiles([]) => vec!["No tracked files".into()],
        Listing::TrackedFiles(files) => files
            .iter()
            .map(|file| {
                format!(
                    "{:<9} {:>10} {:>6}  {}",
                    file.state.to_string(),
                    format_file_size(file.size),
                    mtime(file.modified),
                    file.path.display()
                )
            })
            .collect(),
        Listing::Directory { dir, items, sort } => {
            let mut lines = vec![format!("{} (sort: {})", dir.display(), sort.label())];
            lines.extend(items.iter().map(|item| match item.kind {
                ItemKind::Parent => "  ../".to_string(),
                kind if kind.is_dir() => format!("  {}/", item.name),
                _ => format!(
                    "  {:<40} {:>10} {:>6}",
                    item.name,
                    format_file_size(item.size),
                    mtime(item.modified)
                ),
            }));
            lines
        }
        Listing::Backups([]) => vec!["No backups".into()],
        Listing::Backups(backups) => backups
            .iter()
            .map(|backup| {
                format!(
                    "{}  {}  {:>4} files  {:>10}",
                    backup.name,
                    backup.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    backup.file_count,
                    format_file_size(backup.size)
                )
            })
            .collect(),
        Listing::Commits { title, commits } => std::iter::once(title.to_string())
            .chain(commits.iter().map(|commit| format!("  {commit}")))
            .collect(),
        Listing::LogLines(lines) => lines.to_vec(),
    }
}

/// Front end error types.
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    /// User aborted the program, e.g., through Ctrl-C.
    #[error("interrupted by user")]
    Interrupted,

    /// Prompt cannot be shown or answered.
    #[error(transparent)]
    Prompt(#[from] inquire::InquireError),

    /// Style template cannot be set for the spinner.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),
}

/// Friendly result alias :3
pub type Result<T, E = FrontendError> = std::result::Result<T, E>;
