// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dotmgr::{
    app::App,
    backup::BackupManager,
    browse::validate_path,
    config::ConfigStore,
    git::DotfilesRepo,
    logging::{init_logging, LogFile, LogGuard, LogSettings},
    path,
    ui::{ConsoleFrontend, Frontend, Listing, MessageLevel, PlainFrontend},
};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::error;

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  dotmgr [options]\n  dotmgr [options] <dotmgr-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to settings file to use instead of the default.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    fn run(self) -> Result<()> {
        let mut store = match self.config {
            Some(path) => ConfigStore::new(path),
            None => ConfigStore::open_default()?,
        };
        let log = LogFile::new(path::log_file()?);
        let default_filter = if self.command.is_some() { "warn" } else { "off" };
        let _guard = start_logging(&mut store, &log, default_filter)?;

        let Some(command) = self.command else {
            let mut app = App::open(store, ConsoleFrontend::new()?, log)?;
            return app.run();
        };

        let mut frontend = PlainFrontend::new(false);
        match command {
            Command::Init(opts) => run_init(store, opts),
            Command::Status => run_status(store, &mut frontend),
            Command::Tracked => run_tracked(store, &mut frontend),
            Command::Add(opts) => run_add(store, opts, &mut frontend),
            Command::Commit(opts) => run_commit(store, opts),
            Command::Unstage(opts) => run_unstage(store, opts),
            Command::Untrack(opts) => run_untrack(store, opts, &mut frontend),
            Command::Push => run_push(store),
            Command::Pull => run_pull(store),
            Command::Verify => run_verify(store, &mut frontend),
            Command::Backup { command } => run_backup(store, command, &mut frontend),
            Command::Remote { command } => run_remote(store, command),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Initialize new dotfiles repository, deleting any existing one.
    #[command(override_usage = "dotmgr init [options]")]
    Init(InitOptions),

    /// Show current changes, and commits to push or pull.
    #[command(override_usage = "dotmgr status [options]")]
    Status,

    /// List tracked files with their state.
    #[command(override_usage = "dotmgr tracked [options]")]
    Tracked,

    /// Stage files into repository.
    #[command(override_usage = "dotmgr add [options] <path>...")]
    Add(AddOptions),

    /// Commit staged changes.
    #[command(override_usage = "dotmgr commit [options]")]
    Commit(CommitOptions),

    /// Remove files from staging, all of them if none are given.
    #[command(override_usage = "dotmgr unstage [options] [<path>]...")]
    Unstage(UnstageOptions),

    /// Stop tracking files, keeping them in the home directory.
    #[command(override_usage = "dotmgr untrack [options] <path>...")]
    Untrack(UntrackOptions),

    /// Push committed changes to remote.
    #[command(override_usage = "dotmgr push [options]")]
    Push,

    /// Pull changes from remote, backing up files that would be overwritten.
    #[command(override_usage = "dotmgr pull [options]")]
    Pull,

    /// Check repository configuration.
    #[command(override_usage = "dotmgr verify [options]")]
    Verify,

    /// Manage backup snapshots.
    Backup {
        #[command(subcommand)]
        command: BackupCommand,
    },

    /// Manage remote repository.
    Remote {
        #[command(subcommand)]
        command: RemoteCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
enum BackupCommand {
    /// List backup snapshots, newest first.
    List,

    /// Delete backup snapshot.
    Delete {
        /// Name of snapshot, e.g., 20240101_120000.
        #[arg(value_name = "name")]
        name: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
enum RemoteCommand {
    /// Set URL of remote, adding it if missing.
    Set {
        #[arg(value_name = "url")]
        url: String,
    },

    /// Remove remote.
    Remove,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InitOptions {
    /// Do not ask before deleting an existing repository.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct AddOptions {
    /// Files to stage.
    #[arg(required = true, value_name = "path")]
    pub paths: Vec<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CommitOptions {
    /// Commit message, generated from staged changes when absent.
    #[arg(short, long, value_name = "message")]
    pub message: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct UnstageOptions {
    /// Paths relative to the work tree.
    #[arg(value_name = "path")]
    pub paths: Vec<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct UntrackOptions {
    /// Tracked files to drop from repository.
    #[arg(required = true, value_name = "path")]
    pub paths: Vec<PathBuf>,
}

fn main() {
    if let Err(error) = Cli::parse().run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn start_logging(store: &mut ConfigStore, log: &LogFile, default_filter: &str) -> Result<LogGuard> {
    let mut settings = LogSettings::new(default_filter);
    if store.config().enable_logging {
        settings = settings.with_log_file(log.path());
    }

    Ok(init_logging(&settings)?)
}

fn open_repo(store: &mut ConfigStore) -> Result<DotfilesRepo> {
    Ok(DotfilesRepo::open(store.config())?)
}

fn run_init(mut store: ConfigStore, opts: InitOptions) -> Result<()> {
    let repo = open_repo(&mut store)?;
    let git_dir = &repo.paths().git_dir;
    if repo.is_initialized() {
        let question = format!("Delete existing repository at {}?", git_dir.display());
        if !PlainFrontend::new(opts.yes).confirm(&question)? {
            return Err(anyhow!("repository already exists at {:?}", git_dir.display()));
        }
    }

    repo.initialize()?;
    println!("Repository initialized at {}", git_dir.display());

    Ok(())
}

fn run_status(mut store: ConfigStore, frontend: &mut impl Frontend) -> Result<()> {
    let repo = open_repo(&mut store)?;
    if !repo.is_initialized() {
        return Err(anyhow!("repository not initialized, run `dotmgr init`"));
    }

    let changes = repo.changes();
    frontend.render_list(Listing::Changes(&changes));

    let push = repo.push_status();
    let pull = repo.pull_status();
    if !push.has_remote {
        frontend.render_message(MessageLevel::Info, "No remote repository configured");
        return Ok(());
    }

    if push.count > 0 {
        frontend.render_list(Listing::Commits {
            title: "Commits to push:",
            commits: &push.commits,
        });
    }
    if pull.count > 0 {
        frontend.render_list(Listing::Commits {
            title: "Commits to pull:",
            commits: &pull.commits,
        });
    }
    println!("{} to push, {} to pull", push.count, pull.count);

    Ok(())
}

fn run_tracked(mut store: ConfigStore, frontend: &mut impl Frontend) -> Result<()> {
    let repo = open_repo(&mut store)?;
    let files = repo.tracked_files();
    frontend.render_list(Listing::TrackedFiles(&files));

    Ok(())
}

fn run_add(mut store: ConfigStore, opts: AddOptions, frontend: &mut impl Frontend) -> Result<()> {
    let repo = open_repo(&mut store)?;
    let protected = [store.path().to_path_buf()];
    let requested = opts.paths.len();

    let mut valid = Vec::new();
    for path in opts.paths {
        match validate_path(&path, &protected) {
            Ok(path) => valid.push(path),
            Err(err) => frontend.render_message(MessageLevel::Warning, &err.to_string()),
        }
    }

    let outcome = repo.add_files(&valid)?;
    for (path, reason) in &outcome.failed {
        let message = format!("{}: {reason}", path.display());
        frontend.render_message(MessageLevel::Warning, &message);
    }

    let added = outcome.added.len();
    if added == 0 {
        return Err(anyhow!("failed to add all {requested} files"));
    }
    println!("Added {added} of {requested} files");

    Ok(())
}

fn run_commit(mut store: ConfigStore, opts: CommitOptions) -> Result<()> {
    let repo = open_repo(&mut store)?;
    let message = opts.message.unwrap_or_else(|| repo.commit_message());
    repo.commit(&message)?;
    println!("Committed: {message}");

    Ok(())
}

fn run_unstage(mut store: ConfigStore, opts: UnstageOptions) -> Result<()> {
    let repo = open_repo(&mut store)?;
    if opts.paths.is_empty() {
        repo.unstage_all()?;
        println!("Changes removed from staging");
    } else {
        repo.unstage_files(&opts.paths)?;
        println!("{} files removed from staging", opts.paths.len());
    }

    Ok(())
}

fn run_untrack(
    mut store: ConfigStore,
    opts: UntrackOptions,
    frontend: &mut impl Frontend,
) -> Result<()> {
    let repo = open_repo(&mut store)?;
    let requested = opts.paths.len();

    let mut untracked = 0;
    for path in &opts.paths {
        if !repo.is_file_tracked(path) {
            let message = format!("{}: not tracked", path.display());
            frontend.render_message(MessageLevel::Warning, &message);
            continue;
        }

        repo.untrack_file(path)?;
        untracked += 1;
    }

    if untracked == 0 {
        return Err(anyhow!("none of {requested} files are tracked"));
    }
    println!("Untracked {untracked} of {requested} files");

    Ok(())
}

fn run_push(mut store: ConfigStore) -> Result<()> {
    let repo = open_repo(&mut store)?;
    if repo.remote().is_empty() {
        return Err(anyhow!("no remote repository configured"));
    }

    repo.push()?;
    println!("Pushed to {}", repo.remote());

    Ok(())
}

fn run_pull(mut store: ConfigStore) -> Result<()> {
    let repo = open_repo(&mut store)?;
    let outcome = repo.pull()?;
    match outcome.backup {
        Some(backup) => println!("Pulled, existing files saved to {}", backup.display()),
        None => println!("Pulled from {}", repo.remote()),
    }

    Ok(())
}

fn run_verify(mut store: ConfigStore, frontend: &mut impl Frontend) -> Result<()> {
    let mut issues = store.validate_paths();
    let repo = open_repo(&mut store)?;
    let summary = repo.summary();
    if summary.initialized {
        for (key, value) in &summary.configuration {
            println!("{key} = {value}");
        }
        println!("remote: {}", summary.remote.as_deref().unwrap_or("none"));
        println!(
            "{} tracked files, {} changes",
            summary.tracked_files, summary.changes
        );
    }
    issues.extend(repo.verify_configuration());
    if issues.is_empty() {
        println!("Configuration OK");
        return Ok(());
    }

    for issue in &issues {
        frontend.render_message(MessageLevel::Warning, issue);
    }

    Err(anyhow!("found {} configuration issues", issues.len()))
}

fn run_backup(
    mut store: ConfigStore,
    command: BackupCommand,
    frontend: &mut impl Frontend,
) -> Result<()> {
    let repo = open_repo(&mut store)?;
    let manager = BackupManager::new(&repo.paths().backup_root);
    match command {
        BackupCommand::List => {
            let backups = manager.list()?;
            frontend.render_list(Listing::Backups(&backups));
        }
        BackupCommand::Delete { name } => {
            if !manager.delete(&name)? {
                return Err(anyhow!("no backup named {name}"));
            }
            println!("Deleted backup {name}");
        }
    }

    Ok(())
}

fn run_remote(mut store: ConfigStore, command: RemoteCommand) -> Result<()> {
    let url = match command {
        RemoteCommand::Set { url } => url.trim().to_string(),
        RemoteCommand::Remove => String::new(),
    };
    store.update(|config| config.remote = url.clone())?;

    let mut repo = open_repo(&mut store)?;
    if repo.is_initialized() {
        if url.is_empty() {
            repo.remove_remote()?;
        } else {
            repo.update_remote(&url)?;
        }
    }

    if url.is_empty() {
        println!("Remote removed");
    } else {
        println!("Remote set to {url}");
    }

    Ok(())
}
