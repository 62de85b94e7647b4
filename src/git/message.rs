// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Automatic commit messages.

use crate::git::status::{GitChange, StatusCode};

/// Message used when there is nothing to describe.
pub const EMPTY_CHANGESET_MESSAGE: &str = "update: dotfiles configuration";

/// Message used when no change falls into a known bucket.
pub const FALLBACK_MESSAGE: &str = "update dotfiles";

/// Generate a commit message from a change set.
///
/// Changes are bucketed by their staged status letter into added, modified,
/// deleted, and renamed files. Each non-empty bucket contributes
/// `"<verb> <basename>"` for a single file, or `"<verb> N files"` otherwise,
/// and the phrases are joined by a comma.
///
/// Only depends on its input.
pub fn commit_message(changes: &[GitChange]) -> String {
    if changes.is_empty() {
        return EMPTY_CHANGESET_MESSAGE.into();
    }

    let buckets = [
        (StatusCode::Added, "add"),
        (StatusCode::Modified, "update"),
        (StatusCode::Deleted, "remove"),
        (StatusCode::Renamed, "rename"),
    ];

    let phrases = buckets
        .iter()
        .filter_map(|(code, verb)| {
            let bucket = changes
                .iter()
                .filter(|change| change.staged == *code)
                .collect::<Vec<_>>();
            match bucket.as_slice() {
                [] => None,
                [only] => Some(format!("{verb} {}", only.file_name())),
                many => Some(format!("{verb} {} files", many.len())),
            }
        })
        .collect::<Vec<_>>();

    if phrases.is_empty() {
        return FALLBACK_MESSAGE.into();
    }

    phrases.join(", ")
}
