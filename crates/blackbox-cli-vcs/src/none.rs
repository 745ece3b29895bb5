// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use blackbox_cli_commit::{FlushSummary, PendingCommit};
use blackbox_common_backend::{BackendOptions, Result, Vcs};
use tracing::debug;

pub const NONE_NAME: &str = "NONE";
pub const NONE_PRIORITY: i32 = 0;

/// Fallback for directories that are not under version control.
///
/// Always discovers, treating the given directory as the root, and drops
/// every commit request.
#[derive(Debug, Default)]
pub struct NoneVcs;

pub(crate) fn new_none(_options: &BackendOptions) -> Box<dyn Vcs> {
	Box::new(NoneVcs)
}

#[async_trait]
impl Vcs for NoneVcs {
	fn name(&self) -> &str {
		NONE_NAME
	}

	async fn discover(&self, dir: &Path) -> Option<PathBuf> {
		Some(dir.to_path_buf())
	}

	fn set_file_type_unix(&mut self, _repo_root: &Path, _files: &[String]) -> Result<()> {
		Ok(())
	}

	fn ignore_files(&mut self, _repo_root: &Path, _files: &[String]) -> Result<()> {
		Ok(())
	}

	fn ignore_anywhere(&mut self, _repo_root: &Path, _patterns: &[String]) -> Result<()> {
		Ok(())
	}

	fn commit_title(&mut self, _title: &str) {}

	fn needs_commit(&mut self, message: &str, _repo_root: &Path, _files: Vec<String>) {
		debug!(commit_message = message, "no version control; dropping commit");
	}

	fn pending_commits(&self) -> &[PendingCommit] {
		&[]
	}

	async fn flush_commits(&mut self) -> Result<FlushSummary> {
		Ok(FlushSummary::default())
	}

	async fn testing_init_repo(&self, _dir: &Path) -> Result<()> {
		println!("VCS=none, TestingInitRepo");
		Ok(())
	}
}
