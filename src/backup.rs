// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Rescue copies of work tree files.
//!
//! Before a pull is forced over local files, the files at risk are copied
//! into a timestamped snapshot directory:
//!
//! ```text
//! <work_tree>/.config/dotfiles-manager/backup/<YYYYMMDD_HHMMSS>/<relative paths...>
//! ```
//!
//! Snapshot directories whose name does not parse as a timestamp are not
//! considered snapshots, and are left alone.

use chrono::{Local, NaiveDateTime};
use ignore::WalkBuilder;
use std::{
    fs::{self, File},
    path::{Component, Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Format of snapshot directory names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Existing backup snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSnapshot {
    /// Directory name, i.e., the timestamp token.
    pub name: String,

    /// Absolute path of the snapshot directory.
    pub path: PathBuf,

    /// Time the snapshot was taken.
    pub timestamp: NaiveDateTime,

    /// Total size of all files in bytes.
    pub size: u64,

    /// Number of files in the snapshot.
    pub file_count: usize,
}

/// Manage snapshot directories under a backup root.
#[derive(Debug, Clone)]
pub struct BackupManager {
    root: PathBuf,
}

impl BackupManager {
    /// Construct new manager for target backup root.
    ///
    /// Does not touch the file system.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding every snapshot.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy files into a snapshot named after the current local time.
    ///
    /// See [`BackupManager::snapshot_at`].
    ///
    /// # Errors
    ///
    /// - Return [`BackupError::CreateSnapshot`] if the snapshot directory
    ///   cannot be created.
    pub fn snapshot(
        &self,
        work_tree: impl AsRef<Path>,
        rel_paths: impl IntoIterator<Item = impl AsRef<Path>>,
    ) -> Result<Option<PathBuf>> {
        self.snapshot_at(work_tree, rel_paths, Local::now().naive_local())
    }

    /// Copy files into a snapshot named after target timestamp.
    ///
    /// Each path is relative to the work tree, and keeps its relative location
    /// inside the snapshot. Permissions and modification time are preserved.
    /// A file that cannot be copied is skipped with a warning. Returns `None`
    /// if nothing was copied, in which case no snapshot directory is left
    /// behind.
    ///
    /// # Errors
    ///
    /// - Return [`BackupError::CreateSnapshot`] if the snapshot directory
    ///   cannot be created.
    #[instrument(skip(self, work_tree, rel_paths), level = "debug")]
    pub fn snapshot_at(
        &self,
        work_tree: impl AsRef<Path>,
        rel_paths: impl IntoIterator<Item = impl AsRef<Path>>,
        timestamp: NaiveDateTime,
    ) -> Result<Option<PathBuf>> {
        let work_tree = work_tree.as_ref();
        let rel_paths = rel_paths
            .into_iter()
            .map(|path| path.as_ref().to_path_buf())
            .collect::<Vec<_>>();
        if rel_paths.is_empty() {
            return Ok(None);
        }

        let snapshot_dir = self.root.join(timestamp.format(TIMESTAMP_FORMAT).to_string());
        let existed = snapshot_dir.exists();
        fs::create_dir_all(&snapshot_dir).map_err(|err| BackupError::CreateSnapshot {
            source: err,
            path: snapshot_dir.clone(),
        })?;

        let mut copied = 0;
        for rel_path in &rel_paths {
            let source = work_tree.join(rel_path);
            let target = snapshot_dir.join(rel_path);
            match copy_preserving(&source, &target) {
                Ok(()) => copied += 1,
                Err(err) => warn!("could not back up {:?}: {err}", rel_path.display()),
            }
        }

        if copied == 0 {
            if !existed {
                if let Err(err) = fs::remove_dir_all(&snapshot_dir) {
                    warn!("cannot remove empty backup {:?}: {err}", snapshot_dir.display());
                }
            }
            return Ok(None);
        }

        info!(
            "created backup of {copied} files in {:?}",
            snapshot_dir.display()
        );
        Ok(Some(snapshot_dir))
    }

    /// List snapshots, newest first.
    ///
    /// A missing backup root yields an empty list.
    ///
    /// # Errors
    ///
    /// - Return [`BackupError::ReadRoot`] if the backup root exists but
    ///   cannot be read.
    pub fn list(&self) -> Result<Vec<BackupSnapshot>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(BackupError::ReadRoot {
                    source: err,
                    path: self.root.clone(),
                })
            }
        };

        let mut snapshots = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let Ok(timestamp) = NaiveDateTime::parse_from_str(&name, TIMESTAMP_FORMAT) else {
                    debug!("skip non-snapshot directory {name:?}");
                    return None;
                };
                let path = entry.path();
                let (size, file_count) = measure(&path);
                Some(BackupSnapshot {
                    name,
                    path,
                    timestamp,
                    size,
                    file_count,
                })
            })
            .collect::<Vec<_>>();
        snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(snapshots)
    }

    /// Remove a snapshot.
    ///
    /// Returns `false` if no snapshot by that name exists.
    ///
    /// # Errors
    ///
    /// - Return [`BackupError::InvalidName`] if name is not a plain directory
    ///   name, e.g., contains a path separator or `..`.
    /// - Return [`BackupError::Delete`] if removal fails.
    pub fn delete(&self, name: impl AsRef<str>) -> Result<bool> {
        let name = name.as_ref();
        let mut components = Path::new(name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(BackupError::InvalidName { name: name.into() });
        }

        let path = self.root.join(name);
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_dir_all(&path).map_err(|err| BackupError::Delete {
            source: err,
            path: path.clone(),
        })?;
        info!("deleted backup {name:?}");

        Ok(true)
    }
}

fn copy_preserving(source: &Path, target: &Path) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    // INVARIANT: fs::copy carries permissions over, but not timestamps.
    fs::copy(source, target)?;
    let modified = fs::metadata(source)?.modified()?;
    File::options()
        .write(true)
        .open(target)?
        .set_modified(modified)
}

fn measure(dir: &Path) -> (u64, usize) {
    WalkBuilder::new(dir)
        .standard_filters(false)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|kind| kind.is_file()))
        .fold((0, 0), |(size, count), entry| {
            let len = entry.metadata().map(|meta| meta.len()).unwrap_or(0);
            (size + len, count + 1)
        })
}

/// Backup error types.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("failed to create backup directory {:?}", path.display())]
    CreateSnapshot {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("failed to read backup directory {:?}", path.display())]
    ReadRoot {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("invalid backup name {name:?}")]
    InvalidName { name: String },

    #[error("failed to delete backup {:?}", path.display())]
    Delete {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = BackupError> = std::result::Result<T, E>;
