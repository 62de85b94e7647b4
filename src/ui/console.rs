// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{
    backup::BackupSnapshot,
    browse::{DirectoryItem, ItemKind, SortMode},
    config::Configuration,
    git::{status::GitChange, SyncStatus},
    ui::{
        listing_lines, message_prefix, Action, Frontend, FrontendError, Listing, MessageLevel,
        Result, Screen,
    },
};

use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Confirm, InquireError, MultiSelect, Select, Text};
use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

const PAGE_SIZE: usize = 15;

/// Interactive terminal front end.
///
/// Menus are `inquire` prompts. A spinner runs while a progress message is
/// showing, and is cleared by the next message or prompt.
pub struct ConsoleFrontend {
    spinner: Option<ProgressBar>,
    spinner_style: ProgressStyle,
}

impl ConsoleFrontend {
    /// Construct new console front end.
    ///
    /// # Errors
    ///
    /// - Return [`FrontendError::IndicatifStyleTemplate`] if spinner style is
    ///   invalid.
    pub fn new() -> Result<Self> {
        let spinner_style = ProgressStyle::with_template("{spinner:.green} {msg}")?;
        Ok(Self {
            spinner: None,
            spinner_style,
        })
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn main_menu(&mut self, initialized: bool) -> Result<Action> {
        let mut choices = vec![
            Choice::new("Browse files", Action::ShowBrowser),
            Choice::new("Changes", Action::ShowChanges),
            Choice::new("Tracked files", Action::ShowTracked),
            Choice::new("Settings", Action::ShowSettings),
            Choice::new("Quit", Action::Quit),
        ];
        if !initialized {
            choices[3].label = "Settings (repository not initialized)".into();
        }

        pick("Dotfiles manager", choices)
    }

    fn changes(
        &mut self,
        changes: &[GitChange],
        push: &SyncStatus,
        pull: &SyncStatus,
        suggested_message: &str,
    ) -> Result<Action> {
        let sync_label = |verb: &str, status: &SyncStatus| {
            if status.has_remote {
                format!("{verb} ({} commits)", status.count)
            } else {
                format!("{verb} (no remote)")
            }
        };
        let choices = vec![
            Choice::new("Commit", Action::Commit(None)),
            Choice::new(sync_label("Push", push), Action::Push),
            Choice::new(sync_label("Pull", pull), Action::Pull),
            Choice::new("Unstage all", Action::UnstageAll),
            Choice::new("Unstage files", Action::Unstage(Vec::new())),
            Choice::new("Refresh", Action::Refresh),
            Choice::new("Back", Action::Back),
        ];

        match pick("Changes", choices)? {
            Action::Commit(_) => {
                let message = Text::new("Commit message")
                    .with_default(suggested_message)
                    .prompt();
                match cancelable(message)? {
                    Some(message) if !message.trim().is_empty() => {
                        Ok(Action::Commit(Some(message)))
                    }
                    Some(_) => Ok(Action::Commit(None)),
                    None => Ok(Action::Refresh),
                }
            }
            Action::Unstage(_) => {
                let staged = changes
                    .iter()
                    .filter(|change| change.staged.is_staged_change())
                    .map(|change| change.path.clone())
                    .collect::<Vec<_>>();
                if staged.is_empty() {
                    self.render_message(MessageLevel::Info, "Nothing is staged");
                    return Ok(Action::Refresh);
                }

                let picked = MultiSelect::new("Unstage which files?", staged)
                    .with_page_size(PAGE_SIZE)
                    .prompt();
                Ok(cancelable(picked)?.map_or(Action::Refresh, Action::Unstage))
            }
            action => Ok(action),
        }
    }

    fn browser(
        &mut self,
        dir: &Path,
        items: &[DirectoryItem],
        sort: SortMode,
        filter: &str,
    ) -> Result<Action> {
        loop {
            let mut choices = items
                .iter()
                .filter(|item| item.kind.is_dir())
                .map(|item| {
                    let label = match item.kind {
                        ItemKind::Parent => "../".to_string(),
                        _ => format!("{}/", item.name),
                    };
                    Choice::new(label, Action::Enter(item.path.clone()))
                })
                .collect::<Vec<_>>();
            choices.push(Choice::new("[stage files]", Action::Stage(Vec::new())));
            choices.push(Choice::new(format!("[sort: {}]", sort.label()), Action::CycleSort));
            choices.push(Choice::new(
                if filter.is_empty() {
                    "[filter]".to_string()
                } else {
                    format!("[filter: {filter}]")
                },
                Action::Filter(filter.to_string()),
            ));
            choices.push(Choice::new("[back]", Action::Back));

            match pick(&dir.display().to_string(), choices)? {
                Action::Filter(current) => {
                    let term = Text::new("Filter").with_initial_value(&current).prompt();
                    if let Some(term) = cancelable(term)? {
                        return Ok(Action::Filter(term));
                    }
                }
                Action::Stage(_) => {
                    let files = items
                        .iter()
                        .filter(|item| !item.kind.is_dir())
                        .map(|item| PickedPath(item.path.clone()))
                        .collect::<Vec<_>>();
                    if files.is_empty() {
                        self.render_message(MessageLevel::Info, "No files here");
                        continue;
                    }

                    let picked = MultiSelect::new("Stage which files?", files)
                        .with_page_size(PAGE_SIZE)
                        .prompt();
                    if let Some(picked) = cancelable(picked)? {
                        return Ok(Action::Stage(picked.into_iter().map(|path| path.0).collect()));
                    }
                }
                action => return Ok(action),
            }
        }
    }

    fn settings(&mut self, config: &Configuration, issues: &[String]) -> Result<Action> {
        for issue in issues {
            self.render_message(MessageLevel::Warning, issue);
        }

        let mut choices = vec![
            Choice::new("Edit settings", Action::SaveSettings(config.clone())),
            Choice::new("Initialize repository", Action::InitializeRepo),
            Choice::new("Backups", Action::ShowBackups),
        ];
        if config.enable_logging {
            choices.push(Choice::new("View log", Action::ShowLog));
        }
        choices.push(Choice::new("Back", Action::Back));

        match pick("Settings", choices)? {
            Action::SaveSettings(mut edited) => {
                let fields = [
                    ("Git directory", &mut edited.git_dir),
                    ("Work tree", &mut edited.work_tree),
                    ("Remote URL (empty for none)", &mut edited.remote),
                ];
                for (label, value) in fields {
                    let answer = Text::new(label).with_initial_value(value.as_str()).prompt();
                    match cancelable(answer)? {
                        Some(answer) => *value = answer.trim().to_string(),
                        None => return Ok(Action::Refresh),
                    }
                }

                let logging = Confirm::new("Enable logging?")
                    .with_default(edited.enable_logging)
                    .prompt();
                match cancelable(logging)? {
                    Some(enable_logging) => edited.enable_logging = enable_logging,
                    None => return Ok(Action::Refresh),
                }

                Ok(Action::SaveSettings(edited))
            }
            action => Ok(action),
        }
    }

    fn backups(&mut self, backups: &[BackupSnapshot]) -> Result<Action> {
        let mut choices = backups
            .iter()
            .map(|backup| {
                Choice::new(
                    format!("Delete {}", backup.name),
                    Action::DeleteBackup(backup.name.clone()),
                )
            })
            .collect::<Vec<_>>();
        choices.push(Choice::new("Refresh", Action::Refresh));
        choices.push(Choice::new("Back", Action::Back));

        pick("Backups", choices)
    }
}

impl Frontend for ConsoleFrontend {
    fn render_list(&mut self, listing: Listing<'_>) {
        self.stop_spinner();
        for line in listing_lines(listing) {
            println!("{line}");
        }
    }

    fn render_message(&mut self, level: MessageLevel, message: &str) {
        self.stop_spinner();
        if level == MessageLevel::Progress {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(self.spinner_style.clone());
            spinner.set_message(message.to_string());
            spinner.enable_steady_tick(Duration::from_millis(100));
            self.spinner = Some(spinner);
            return;
        }

        println!("{}{message}", message_prefix(level));
    }

    fn read_action(&mut self, screen: Screen<'_>) -> Result<Action> {
        self.stop_spinner();
        match screen {
            Screen::MainMenu { initialized } => self.main_menu(initialized),
            Screen::Changes {
                changes,
                push,
                pull,
                suggested_message,
            } => self.changes(changes, push, pull, suggested_message),
            Screen::Browser {
                dir,
                items,
                sort,
                filter,
            } => self.browser(dir, items, sort, filter),
            Screen::TrackedFiles { .. } => pick(
                "Tracked files",
                vec![Choice::new("Refresh", Action::Refresh), Choice::new("Back", Action::Back)],
            ),
            Screen::Settings { config, issues } => self.settings(config, issues),
            Screen::Backups { backups } => self.backups(backups),
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.stop_spinner();
        let answer = Confirm::new(question).with_default(false).prompt();
        Ok(cancelable(answer)?.unwrap_or(false))
    }
}

/// Menu entry mapping a label to an action.
struct Choice {
    label: String,
    action: Action,
}

impl Choice {
    fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.label)
    }
}

struct PickedPath(PathBuf);

impl fmt::Display for PickedPath {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .0
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_else(|| self.0.to_string_lossy());
        fmt.write_str(&name)
    }
}

fn pick(title: &str, choices: Vec<Choice>) -> Result<Action> {
    let picked = Select::new(title, choices).with_page_size(PAGE_SIZE).prompt();
    Ok(cancelable(picked)?.map_or(Action::Back, |choice| choice.action))
}

/// Escape cancels the prompt, Ctrl-C aborts the program.
fn cancelable<T>(answer: std::result::Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(answer) => Ok(Some(answer)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(InquireError::OperationInterrupted) => Err(FrontendError::Interrupted),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escape_maps_to_none_and_ctrl_c_to_interrupt() {
        assert!(matches!(cancelable::<()>(Err(InquireError::OperationCanceled)), Ok(None)));
        assert!(matches!(
            cancelable::<()>(Err(InquireError::OperationInterrupted)),
            Err(FrontendError::Interrupted)
        ));
        assert!(matches!(cancelable(Ok(3)), Ok(Some(3))));
    }

    #[test]
    fn picked_path_shows_basename() {
        let path = PickedPath(PathBuf::from("/home/blah/.config/foot/foot.ini"));
        assert_eq!(path.to_string(), "foot.ini");
    }
}
