// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotfiles manager built on a bare Git repository.
//!
//! Dotfiles stay where they live in the home directory. A bare repository
//! elsewhere on disk tracks them, with the home directory acting as its work
//! tree alias. All Git work goes through the `git` binary, see [`git`].
//!
//! The interactive session lives in [`app`], and talks to the user through the
//! [`ui::Frontend`] trait only.

pub mod app;
pub mod backup;
pub mod browse;
pub mod config;
pub mod git;
pub mod logging;
pub mod path;
pub mod ui;

pub use app::App;
pub use backup::{BackupManager, BackupSnapshot};
pub use config::{ConfigStore, Configuration};
pub use git::{DotfilesRepo, RepoPaths};
