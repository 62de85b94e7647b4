// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! File system browsing.
//!
//! Directory listings, sorting and filtering for the file browser, plus the
//! small formatting helpers used to render file metadata.

use crate::path;

use chrono::{DateTime, Datelike, Local};
use std::{
    cmp::Ordering,
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::debug;

/// Kind of entry shown in a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    File,
    HiddenFile,
    Directory,
    HiddenDirectory,

    /// Link to the enclosing directory, shown as `..`.
    Parent,
}

impl ItemKind {
    pub fn is_dir(self) -> bool {
        matches!(self, Self::Directory | Self::HiddenDirectory | Self::Parent)
    }
}

/// Single entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryItem {
    /// Entry name, `..` for the parent entry.
    pub name: String,

    /// Absolute path of the entry.
    pub path: PathBuf,

    pub kind: ItemKind,

    /// Size in bytes, zero for directories.
    pub size: u64,

    pub modified: Option<SystemTime>,
}

/// List the contents of a directory.
///
/// The parent entry comes first unless `dir` is a file system root. An
/// unreadable directory yields only the parent entry, and entries whose
/// metadata cannot be read are skipped. Remaining entries are ordered
/// directories first, then by lowercase name.
pub fn list_directory(dir: impl AsRef<Path>) -> Vec<DirectoryItem> {
    let dir = dir.as_ref();
    let mut items = Vec::new();

    if let Some(parent) = dir.parent() {
        items.push(DirectoryItem {
            name: "..".into(),
            path: parent.to_path_buf(),
            kind: ItemKind::Parent,
            size: 0,
            modified: None,
        });
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("cannot read directory {:?}: {err}", dir.display());
            return items;
        }
    };

    let mut entries = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let path = entry.path();
            // INVARIANT: Follow symlinks, so a link to a directory is a directory.
            let metadata = fs::metadata(&path).ok()?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let hidden = name.starts_with('.');
            let kind = match (metadata.is_dir(), hidden) {
                (true, true) => ItemKind::HiddenDirectory,
                (true, false) => ItemKind::Directory,
                (false, true) => ItemKind::HiddenFile,
                (false, false) => ItemKind::File,
            };

            Some(DirectoryItem {
                name,
                path,
                kind,
                size: if metadata.is_dir() { 0 } else { metadata.len() },
                modified: metadata.modified().ok(),
            })
        })
        .collect::<Vec<_>>();
    sort_items(&mut entries, SortMode::DirsFirst);
    items.extend(entries);

    items
}

/// Ordering of the file browser.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    DirsFirst,
    Mixed,
    FilesFirst,
}

impl SortMode {
    /// Cycle to the following mode.
    pub fn next(self) -> Self {
        match self {
            Self::DirsFirst => Self::Mixed,
            Self::Mixed => Self::FilesFirst,
            Self::FilesFirst => Self::DirsFirst,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DirsFirst => "dirs→files",
            Self::Mixed => "mixed",
            Self::FilesFirst => "files→dirs",
        }
    }
}

/// Sort items in place.
///
/// Parent entries always stay at the front. Names compare case-insensitively
/// inside each group.
pub fn sort_items(items: &mut [DirectoryItem], mode: SortMode) {
    let group = |item: &DirectoryItem| -> u8 {
        match (item.kind, mode) {
            (ItemKind::Parent, _) => 0,
            (_, SortMode::Mixed) => 1,
            (kind, SortMode::DirsFirst) if kind.is_dir() => 1,
            (_, SortMode::DirsFirst) => 2,
            (kind, SortMode::FilesFirst) if kind.is_dir() => 2,
            (_, SortMode::FilesFirst) => 1,
        }
    };

    items.sort_by(|a, b| match group(a).cmp(&group(b)) {
        Ordering::Equal => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        order => order,
    });
}

/// Keep items whose name contains the search term, ignoring case.
///
/// An empty term keeps everything.
pub fn filter_items(items: &[DirectoryItem], term: &str) -> Vec<DirectoryItem> {
    let term = term.to_lowercase();
    items
        .iter()
        .filter(|item| term.is_empty() || item.name.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

/// Check that a path given by the user can be operated on.
///
/// Returns the absolute form of the path.
///
/// # Errors
///
/// - Return [`BrowseError::ShellExpansion`] if path cannot be expanded.
/// - Return [`BrowseError::DoesNotExist`] if path does not exist.
/// - Return [`BrowseError::NotReadable`] if path cannot be read.
/// - Return [`BrowseError::Protected`] if path is one of the protected paths.
pub fn validate_path(path: impl AsRef<Path>, protected: &[PathBuf]) -> Result<PathBuf> {
    let expanded = path::expand(path.as_ref().to_string_lossy())?;
    let absolute = std::path::absolute(&expanded).unwrap_or(expanded);

    let metadata = match fs::metadata(&absolute) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(BrowseError::DoesNotExist { path: absolute })
        }
        Err(_) => return Err(BrowseError::NotReadable { path: absolute }),
    };

    let readable = if metadata.is_dir() {
        fs::read_dir(&absolute).is_ok()
    } else {
        File::open(&absolute).is_ok()
    };
    if !readable {
        return Err(BrowseError::NotReadable { path: absolute });
    }

    let is_protected = protected
        .iter()
        .any(|guarded| std::path::absolute(guarded).is_ok_and(|guarded| guarded == absolute));
    if is_protected {
        return Err(BrowseError::Protected { path: absolute });
    }

    Ok(absolute)
}

/// Check if a file looks like text.
///
/// The first kilobyte must be free of NUL bytes and valid UTF-8.
pub fn is_text_file(path: impl AsRef<Path>) -> bool {
    let mut chunk = Vec::with_capacity(1024);
    let read = File::open(path.as_ref()).and_then(|file| file.take(1024).read_to_end(&mut chunk));
    if read.is_err() || chunk.contains(&0) {
        return false;
    }

    match std::str::from_utf8(&chunk) {
        Ok(_) => true,
        // INVARIANT: A multi-byte character cut off by the chunk boundary is fine.
        Err(err) => err.error_len().is_none() && chunk.len() == 1024,
    }
}

/// Human readable file size, e.g., `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".into();
    }

    let bit_length = u64::BITS - bytes.leading_zeros();
    let index = (((bit_length - 1) / 10) as usize).min(UNITS.len() - 1);
    let scaled = bytes as f64 / 1024_f64.powi(index as i32);

    format!("{scaled:.1} {}", UNITS[index])
}

/// Compact modification time relative to `now`.
///
/// Shows `HH:MM` for today, `Mon DD` for this year, and the year otherwise.
pub fn format_file_mtime(modified: SystemTime, now: DateTime<Local>) -> String {
    let modified = DateTime::<Local>::from(modified);
    if modified.date_naive() == now.date_naive() {
        modified.format("%H:%M").to_string()
    } else if modified.year() == now.year() {
        modified.format("%b %d").to_string()
    } else {
        modified.format("%Y").to_string()
    }
}

/// File browsing error types.
#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error("path does not exist: {}", path.display())]
    DoesNotExist { path: PathBuf },

    #[error("path is not readable: {}", path.display())]
    NotReadable { path: PathBuf },

    #[error("path is protected from modification: {}", path.display())]
    Protected { path: PathBuf },

    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

/// Friendly result alias :3
pub type Result<T, E = BrowseError> = std::result::Result<T, E>;
