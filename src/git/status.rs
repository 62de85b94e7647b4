// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Porcelain status records.
//!
//! Git reports the state of each changed file in `git status --porcelain` as
//! a two letter code followed by a space and the file path:
//!
//! ```text
//! XY PATH
//! XY ORIG_PATH -> PATH
//! ```
//!
//! The first letter describes the index (staged) side, the second the work
//! tree side. A space means "no change" on that side.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::debug;

/// Single side of a porcelain status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Unmodified,
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Updated,
    Untracked,
    Ignored,
}

impl StatusCode {
    /// Decode a porcelain status letter.
    pub fn from_char(code: char) -> Option<Self> {
        let status = match code {
            ' ' => Self::Unmodified,
            'A' => Self::Added,
            'M' => Self::Modified,
            'D' => Self::Deleted,
            'R' => Self::Renamed,
            'C' => Self::Copied,
            'U' => Self::Updated,
            '?' => Self::Untracked,
            '!' => Self::Ignored,
            _ => return None,
        };

        Some(status)
    }

    /// Encode back into a porcelain status letter.
    pub fn as_char(self) -> char {
        match self {
            Self::Unmodified => ' ',
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Deleted => 'D',
            Self::Renamed => 'R',
            Self::Copied => 'C',
            Self::Updated => 'U',
            Self::Untracked => '?',
            Self::Ignored => '!',
        }
    }

    /// Human readable description, empty for [`StatusCode::Unmodified`].
    pub fn describe(self) -> &'static str {
        match self {
            Self::Unmodified => "",
            Self::Added => "Added",
            Self::Modified => "Modified",
            Self::Deleted => "Deleted",
            Self::Renamed => "Renamed",
            Self::Copied => "Copied",
            Self::Updated => "Updated",
            Self::Untracked => "Untracked",
            Self::Ignored => "Ignored",
        }
    }

    /// Check if the code records a change that lives in the index.
    pub fn is_staged_change(self) -> bool {
        !matches!(self, Self::Unmodified | Self::Untracked | Self::Ignored)
    }
}

impl Display for StatusCode {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{}", self.as_char())
    }
}

/// One line of porcelain status output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitChange {
    /// Work tree relative path. Destination path for renames and copies.
    pub path: String,

    /// Source path for renames and copies.
    pub orig_path: Option<String>,

    /// Index side of the status code.
    pub staged: StatusCode,

    /// Work tree side of the status code.
    pub worktree: StatusCode,
}

impl GitChange {
    /// Two character porcelain status code.
    pub fn status_code(&self) -> String {
        format!("{}{}", self.staged, self.worktree)
    }

    /// Basename of the changed file.
    pub fn file_name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.path)
    }
}

/// Parse porcelain status output into change records.
///
/// Leading whitespace is significant, because a space is a valid status
/// letter. Lines shorter than three characters, and lines with letters outside
/// the known status alphabet, are skipped.
pub fn parse_porcelain(stdout: &str) -> Vec<GitChange> {
    stdout.lines().filter_map(parse_porcelain_line).collect()
}

fn parse_porcelain_line(line: &str) -> Option<GitChange> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.chars().count() < 3 {
        return None;
    }

    let mut chars = line.chars();
    let (staged, worktree) = match (chars.next(), chars.next()) {
        (Some(x), Some(y)) => (x, y),
        _ => return None,
    };
    let (Some(staged), Some(worktree)) =
        (StatusCode::from_char(staged), StatusCode::from_char(worktree))
    else {
        debug!("skip porcelain line with unknown status code: {line:?}");
        return None;
    };

    let offset = staged.as_char().len_utf8() + worktree.as_char().len_utf8() + 1;
    let field = line.get(offset..)?;
    let renamed = matches!(staged, StatusCode::Renamed | StatusCode::Copied)
        || matches!(worktree, StatusCode::Renamed | StatusCode::Copied);

    let (path, orig_path) = match field.split_once(" -> ") {
        Some((from, to)) if renamed => (to.to_string(), Some(from.to_string())),
        _ => (field.to_string(), None),
    };

    Some(GitChange {
        path,
        orig_path,
        staged,
        worktree,
    })
}

/// State of a tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Tracked and unchanged.
    Tracked,

    /// Not known to the index.
    Untracked,

    /// Tracked but missing from the work tree.
    Deleted,

    /// Tracked with pending changes.
    Changed {
        staged: StatusCode,
        worktree: StatusCode,
    },
}

impl Display for FileState {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Tracked => fmt.write_str("tracked"),
            Self::Untracked => fmt.write_str("untracked"),
            Self::Deleted => fmt.write_str("deleted"),
            Self::Changed { staged, worktree } => {
                // INVARIANT: Blank sides are dropped, e.g., " M" shows as "M".
                let code = format!("{staged}{worktree}");
                fmt.write_str(code.trim())
            }
        }
    }
}

/// Tracked file enriched with file system metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFileInfo {
    /// Work tree relative path.
    pub path: PathBuf,

    /// Current state of the file.
    pub state: FileState,

    /// Size in bytes, zero when deleted.
    pub size: u64,

    /// Last modification time, `None` when deleted.
    pub modified: Option<SystemTime>,

    /// Entry is a directory, e.g., a submodule.
    pub is_dir: bool,
}

impl TrackedFileInfo {
    /// Basename of the tracked file.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
