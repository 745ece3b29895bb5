// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod admin;
pub mod crypt;
pub mod file;
pub mod setup;
pub mod status;
pub mod view;

use std::path::PathBuf;

use anyhow::Context as _;
use blackbox_cli_box::{Blackbox, BoxSettings, Outcome};
use blackbox_cli_config::BlackboxConfig;
use blackbox_common_backend::{CrypterCatalog, VcsCatalog};
use tracing::debug;

/// Which files a bulk verb acts on.
#[derive(Debug, Clone, clap::Args)]
pub struct Selection {
	/// Act on every registered file
	#[arg(long, conflicts_with = "names")]
	pub all: bool,

	/// Files to act on, relative to the current directory
	#[arg(required_unless_present = "all")]
	pub names: Vec<String>,
}

/// Everything a command needs to open the repository.
pub struct Context {
	pub settings: BoxSettings,
	pub cwd: PathBuf,
	vcs: VcsCatalog,
	crypters: CrypterCatalog,
}

impl Context {
	pub fn new(config: &BlackboxConfig) -> anyhow::Result<Self> {
		let cwd = std::env::current_dir().context("failed to read the current directory")?;
		Ok(Self::with_cwd(config, cwd))
	}

	pub fn with_cwd(config: &BlackboxConfig, cwd: PathBuf) -> Self {
		let mut vcs = VcsCatalog::new("vcs");
		blackbox_cli_vcs::register(&mut vcs);
		let mut crypters = CrypterCatalog::new("crypto");
		blackbox_cli_gnupg::register(&mut crypters);
		Self {
			settings: BoxSettings::from_config(config),
			cwd,
			vcs,
			crypters,
		}
	}

	/// Opens the blackbox repository around the working directory.
	pub async fn open(&self) -> anyhow::Result<Blackbox> {
		Ok(Blackbox::open(&self.cwd, self.settings.clone(), &self.vcs, &self.crypters).await?)
	}

	/// Prepares a repository that `init` has not run in yet.
	pub async fn uninitialized(&self) -> anyhow::Result<Blackbox> {
		Ok(Blackbox::uninitialized(&self.cwd, self.settings.clone(), &self.vcs, &self.crypters).await?)
	}

	/// Repository-relative names for a selection; empty when `--all`.
	pub fn selected(&self, bx: &Blackbox, selection: &Selection) -> anyhow::Result<Vec<String>> {
		if selection.all {
			return Ok(Vec::new());
		}
		self.names(bx, &selection.names)
	}

	pub fn names(&self, bx: &Blackbox, names: &[String]) -> anyhow::Result<Vec<String>> {
		Ok(bx.relative_names(&self.cwd, names)?)
	}
}

/// Carries out the commits a verb queued.
pub async fn finish(bx: &mut Blackbox) -> anyhow::Result<()> {
	let summary = bx.flush_commits().await?;
	debug!(commits = summary.commits, merged = summary.merged, "flushed commits");
	Ok(())
}

pub(crate) fn log_outcome(verb: &str, outcome: &Outcome) {
	debug!(
		verb,
		processed = outcome.processed.len(),
		skipped = outcome.skipped.len(),
		"verb finished"
	);
}
