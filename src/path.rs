// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! interacted with, or managed in some way.
//!
//! # Layout
//!
//! Dotmgr keeps everything it owns under the user's home directory:
//!
//! - `~/.config/dotfiles-manager/config.json`: persisted settings.
//! - `~/.config/dotfiles-manager/.gitignore`: ignore file handed to Git
//!   through `core.excludesfile`.
//! - `~/.local/share/dotfiles-manager/error.log`: optional log file.
//! - `<work_tree>/.config/dotfiles-manager/backup/`: rescue copies of files
//!   that a pull would overwrite.

use std::path::{Path, PathBuf};

/// Name of the directory dotmgr places its own files in.
pub const APP_DIR_NAME: &str = "dotfiles-manager";

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine absolute path to dotmgr's configuration directory.
///
/// Always `~/.config/dotfiles-manager`, even when `$XDG_CONFIG_HOME` points
/// elsewhere, because the ignore file location is part of the Git
/// configuration dotmgr writes and verifies.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn app_config_dir() -> Result<PathBuf> {
    home_dir().map(|home| home.join(".config").join(APP_DIR_NAME))
}

/// Determine default absolute path to the JSON settings file.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_config_file() -> Result<PathBuf> {
    app_config_dir().map(|dir| dir.join("config.json"))
}

/// Determine absolute path to the ignore file referenced by
/// `core.excludesfile`.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn excludes_file() -> Result<PathBuf> {
    app_config_dir().map(|dir| dir.join(".gitignore"))
}

/// Determine absolute path to the append-only log file.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn log_file() -> Result<PathBuf> {
    home_dir().map(|home| {
        home.join(".local")
            .join("share")
            .join(APP_DIR_NAME)
            .join("error.log")
    })
}

/// Backup root for a given work tree.
pub fn backup_root(work_tree: impl AsRef<Path>) -> PathBuf {
    work_tree
        .as_ref()
        .join(".config")
        .join(APP_DIR_NAME)
        .join("backup")
}

/// Perform shell expansion on a path string.
///
/// Expands `~` and environment variables.
///
/// # Errors
///
/// - Return [`shellexpand::LookupError`] if an environment variable in the
///   path is not set.
pub fn expand(
    path: impl AsRef<str>,
) -> std::result::Result<PathBuf, shellexpand::LookupError<std::env::VarError>> {
    shellexpand::full(path.as_ref()).map(|expanded| PathBuf::from(expanded.into_owned()))
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
