// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use blackbox_cli_commit::{FlushSummary, PendingCommit};

use crate::error::Result;

/// Repository backend: the version-control system holding the secrets.
///
/// File names passed in are relative to `repo_root`. Commit requests are
/// queued and only carried out by [`Vcs::flush_commits`].
#[async_trait]
pub trait Vcs: Send + Sync {
	/// Canonical backend name, as registered.
	fn name(&self) -> &str;

	/// Returns the repository root if `dir` is inside a repository of this
	/// kind.
	async fn discover(&self, dir: &Path) -> Option<PathBuf>;

	/// Marks `files` as text with unix line endings.
	fn set_file_type_unix(&mut self, repo_root: &Path, files: &[String]) -> Result<()>;

	/// Ignores exactly these files, anchored at the repository root.
	fn ignore_files(&mut self, repo_root: &Path, files: &[String]) -> Result<()>;

	/// Ignores these patterns anywhere in the repository.
	fn ignore_anywhere(&mut self, repo_root: &Path, patterns: &[String]) -> Result<()>;

	/// Title used when the queued commits are merged into one.
	fn commit_title(&mut self, title: &str);

	/// Queues a commit of `files` for the next flush.
	fn needs_commit(&mut self, message: &str, repo_root: &Path, files: Vec<String>);

	/// Commits queued so far, in order.
	fn pending_commits(&self) -> &[PendingCommit];

	/// Carries out every queued commit.
	async fn flush_commits(&mut self) -> Result<FlushSummary>;

	/// Creates an empty repository in `dir`. Used by integration tests.
	async fn testing_init_repo(&self, dir: &Path) -> Result<()>;
}
