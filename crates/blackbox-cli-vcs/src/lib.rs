// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod command;
mod git;
mod none;

use blackbox_common_backend::VcsCatalog;

pub use git::{git_safe_filename, suggest_commit, GitVcs, GIT_NAME, GIT_PRIORITY};
pub use none::{NoneVcs, NONE_NAME, NONE_PRIORITY};

/// Registers the repository backends shipped with blackbox.
pub fn register(catalog: &mut VcsCatalog) {
	catalog.register(GIT_NAME, GIT_PRIORITY, git::new_git);
	catalog.register(NONE_NAME, NONE_PRIORITY, none::new_none);
}
