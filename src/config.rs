// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout and persistence.
//!
//! Specify the layout of the settings file that dotmgr uses, and provide a
//! small store that loads it lazily, caches it, and writes it back.
//!
//! # Settings File Layout
//!
//! The settings file is a JSON object with exactly four fields:
//!
//! ```json
//! {
//!     "git_dir": "~/.dotfiles.git",
//!     "work_tree": "~",
//!     "remote": "",
//!     "enable_logging": false
//! }
//! ```
//!
//! Missing fields take their default value, and unknown fields are dropped.
//! A settings file that cannot be parsed at all yields the default settings.

use crate::path::{self, NoWayHome};

use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Persisted application settings.
///
/// Paths are stored exactly as the user typed them, so they may be
/// `~`-relative. Use [`Configuration::git_dir_path`] and
/// [`Configuration::work_tree_path`] to obtain absolute paths.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Configuration {
    /// Location of the bare repository.
    pub git_dir: String,

    /// Directory whose files are tracked.
    pub work_tree: String,

    /// URL of the `origin` remote, empty when there is none.
    pub remote: String,

    /// Append diagnostics to the log file.
    pub enable_logging: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            git_dir: "~/.dotfiles.git".into(),
            work_tree: "~".into(),
            remote: String::new(),
            enable_logging: false,
        }
    }
}

impl Configuration {
    /// Absolute path of the bare repository.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ShellExpansion`] if expansion fails.
    pub fn git_dir_path(&self) -> Result<PathBuf> {
        Ok(path::expand(&self.git_dir)?)
    }

    /// Absolute path of the work tree.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ShellExpansion`] if expansion fails.
    pub fn work_tree_path(&self) -> Result<PathBuf> {
        Ok(path::expand(&self.work_tree)?)
    }

    /// Check if a remote URL is configured.
    pub fn has_remote(&self) -> bool {
        !self.remote.trim().is_empty()
    }
}

/// Settings store backed by a JSON file.
///
/// The store is the only writer of the settings file. Every other component
/// receives a [`Configuration`] value at construction.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    cached: Option<Configuration>,
}

impl ConfigStore {
    /// Construct new settings store for target path.
    ///
    /// Does not touch the file system.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: None,
        }
    }

    /// Construct new settings store at the default location.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::NoWayHome`] if home directory cannot be found.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(path::default_config_file()?))
    }

    /// Path of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings, loaded from disk on first access.
    pub fn config(&mut self) -> &Configuration {
        self.cached.get_or_insert_with(|| load_from(&self.path))
    }

    /// Read settings from disk, bypassing the cache.
    pub fn load(&self) -> Configuration {
        load_from(&self.path)
    }

    /// Write settings to disk and replace the cached copy.
    ///
    /// Output goes to a sibling temporary file that is then renamed over the
    /// target, so readers never observe a half-written file.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Serialize`] if settings cannot be encoded.
    /// - Return [`ConfigError::Write`] if the file cannot be written.
    pub fn save(&mut self, config: Configuration) -> Result<()> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        config
            .serialize(&mut serializer)
            .map_err(ConfigError::Serialize)?;
        buffer.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| ConfigError::Write {
                source: err,
                config_path: self.path.clone(),
            })?;
        }

        let staging = self.path.with_extension("json.tmp");
        let write = |target: &Path| -> std::io::Result<()> {
            let mut file = File::create(target)?;
            file.write_all(&buffer)?;
            file.sync_all()
        };
        write(&staging)
            .and_then(|()| fs::rename(&staging, &self.path))
            .map_err(|err| {
                match fs::remove_file(&staging) {
                    Err(cleanup) if cleanup.kind() != ErrorKind::NotFound => {
                        warn!("cannot remove {:?}: {cleanup}", staging.display());
                    }
                    _ => {}
                }
                ConfigError::Write {
                    source: err,
                    config_path: self.path.clone(),
                }
            })?;

        info!("saved settings to {:?}", self.path.display());
        self.cached = Some(config);

        Ok(())
    }

    /// Edit settings in place and persist them if anything changed.
    ///
    /// Returns `true` if the settings were modified and saved.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Write`] or [`ConfigError::Serialize`] if
    ///   saving fails.
    pub fn update<E>(&mut self, editor: E) -> Result<bool>
    where
        E: FnOnce(&mut Configuration),
    {
        let current = self.config().clone();
        let mut edited = current.clone();
        editor(&mut edited);

        if edited == current {
            return Ok(false);
        }

        self.save(edited)?;
        Ok(true)
    }

    /// Overwrite settings with defaults.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Write`] or [`ConfigError::Serialize`] if
    ///   saving fails.
    pub fn reset_to_defaults(&mut self) -> Result<()> {
        self.save(Configuration::default())
    }

    /// List problems with the configured paths.
    pub fn validate_paths(&mut self) -> Vec<String> {
        let config = self.config().clone();
        let mut issues = Vec::new();

        match config.work_tree_path() {
            Ok(work_tree) if !work_tree.exists() => {
                issues.push(format!(
                    "Work tree path does not exist: {}",
                    work_tree.display()
                ));
            }
            Ok(work_tree) if !work_tree.is_dir() => {
                issues.push(format!(
                    "Work tree path is not a directory: {}",
                    work_tree.display()
                ));
            }
            Ok(_) => {}
            Err(err) => issues.push(format!("Cannot expand work tree path: {err}")),
        }

        match config.git_dir_path() {
            Ok(git_dir) if git_dir.exists() && !git_dir.is_dir() => {
                issues.push(format!(
                    "Git directory path exists but is not a directory: {}",
                    git_dir.display()
                ));
            }
            Ok(_) => {}
            Err(err) => issues.push(format!("Cannot expand git directory path: {err}")),
        }

        issues
    }
}

fn load_from(path: &Path) -> Configuration {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("no settings at {:?}, using defaults", path.display());
            return Configuration::default();
        }
        Err(err) => {
            warn!("cannot read settings at {:?}: {err}", path.display());
            return Configuration::default();
        }
    };

    match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(err) => {
            warn!("malformed settings at {:?}: {err}", path.display());
            Configuration::default()
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Settings file cannot be written to.
    #[error("failed to write settings to {:?}", config_path.display())]
    Write {
        #[source]
        source: std::io::Error,
        config_path: PathBuf,
    },

    /// Failed to serialize settings.
    #[error(transparent)]
    Serialize(serde_json::Error),

    /// Failed to perform shell expansion on configured path.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Home directory cannot be determined.
    #[error(transparent)]
    NoWayHome(#[from] NoWayHome),
}

/// Friendly result alias :3
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
