// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fs::DirBuilder;

use blackbox_common_makesafe::redact_many;
use blackbox_common_registry::{touch, ADMINS_FILE, FILES_FILE};
use tracing::info;

use crate::blackbox::Blackbox;
use crate::error::{BoxError, Result};

pub const INIT_TITLE: &str = "INITIALIZE BLACKBOX";

/// Keyring leftovers that must never be committed, wherever they appear.
pub const INIT_IGNORE_PATTERNS: [&str; 3] = ["pubring.gpg~", "pubring.kbx~", "secring.gpg"];

const CONFIG_DIR_MODE: u32 = 0o750;

impl Blackbox {
	/// Creates the config dir with empty registries.
	///
	/// Running it again on an initialized repository only bumps the
	/// registries' mtimes.
	pub fn init(&mut self, confirmed: bool) -> Result<()> {
		self.require_writable()?;
		if !confirmed {
			let question = format!("Enable blackbox for this {} repo? (yes/no)?", self.vcs.name());
			let yes = self
				.prompter
				.confirm(&question)
				.map_err(|e| BoxError::io("stdin", e))?;
			if !yes {
				return Err(BoxError::Aborted);
			}
		}

		create_config_dir(&self.config_dir)?;
		touch(&self.admins_path())?;
		touch(&self.files_path())?;
		info!(config_dir = %self.config_dir.display(), "initialized blackbox");

		let registries = vec![self.config_rel(ADMINS_FILE), self.config_rel(FILES_FILE)];
		self.vcs.set_file_type_unix(&self.repo_root, &registries)?;
		let patterns: Vec<String> = INIT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect();
		self.vcs.ignore_anywhere(&self.repo_root, &patterns)?;

		self.vcs.commit_title(INIT_TITLE);
		let message = format!("NEW: {}", redact_many(&registries).join(" "));
		self.vcs.needs_commit(&message, &self.repo_root, registries);
		Ok(())
	}

	/// Prepares a scratch repository for the integration tests.
	pub async fn testing_init(&self) -> Result<()> {
		Ok(self.vcs.testing_init_repo(&self.repo_root).await?)
	}
}

fn create_config_dir(path: &std::path::Path) -> Result<()> {
	let mut builder = DirBuilder::new();
	builder.recursive(true);
	#[cfg(unix)]
	{
		use std::os::unix::fs::DirBuilderExt;
		builder.mode(CONFIG_DIR_MODE);
	}
	builder
		.create(path)
		.map_err(|source| BoxError::ConfigDir {
			path: path.to_path_buf(),
			source,
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::blackbox::testing::Fixture;
	use crate::blackbox::BoxSettings;
	use crate::prompt::ScriptedPrompter;
	use crate::shred::Shredder;
	use blackbox_common_backend::mock::{MockCrypter, MockVcs, VcsCall};
	use tempfile::TempDir;

	fn fresh(temp: &TempDir, vcs: &MockVcs, prompter: ScriptedPrompter) -> Blackbox {
		Blackbox::new(
			temp.path(),
			temp.path().join(".blackbox"),
			Box::new(vcs.clone()),
			Box::new(MockCrypter::new()),
			BoxSettings::default(),
		)
		.with_prompter(prompter)
		.with_shredder(Shredder::unlink_only())
	}

	/// Test: a confirmed init creates both empty registries and queues a
	/// titled commit for them.
	///
	/// Why this test is important: every other verb starts by locating these
	/// files, and the ignore patterns keep keyring backups out of history.
	#[test]
	fn test_init_creates_registries() {
		let temp = TempDir::new().unwrap();
		let vcs = MockVcs::new();
		let mut bx = fresh(&temp, &vcs, ScriptedPrompter::new([]));

		bx.init(true).unwrap();

		let config = temp.path().join(".blackbox");
		assert_eq!(std::fs::read_to_string(config.join(ADMINS_FILE)).unwrap(), "");
		assert_eq!(std::fs::read_to_string(config.join(FILES_FILE)).unwrap(), "");

		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			let mode = std::fs::metadata(&config).unwrap().permissions().mode();
			assert_eq!(mode & 0o007, 0);
		}

		let calls = vcs.get_calls();
		assert!(calls.contains(&VcsCall::IgnoreAnywhere(
			INIT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect()
		)));
		assert!(calls.contains(&VcsCall::CommitTitle(INIT_TITLE.to_string())));
		let pending = bx.vcs().pending_commits();
		assert_eq!(pending.len(), 1);
		assert_eq!(
			pending[0].message,
			"NEW: .blackbox/blackbox-admins.txt .blackbox/blackbox-files.txt"
		);
	}

	#[test]
	fn test_init_declined() {
		let temp = TempDir::new().unwrap();
		let vcs = MockVcs::new();
		let prompter = ScriptedPrompter::new([false]);
		let mut bx = fresh(&temp, &vcs, prompter.clone());

		assert!(matches!(bx.init(false), Err(BoxError::Aborted)));
		assert!(!temp.path().join(".blackbox").exists());
		assert_eq!(prompter.get_asked(), vec!["Enable blackbox for this MOCK repo? (yes/no)?"]);
	}

	#[test]
	fn test_init_is_idempotent() {
		let fx = Fixture::new(&["alice@example.com"], &["a.txt"]);
		let mut bx = fx.blackbox();
		bx.init(true).unwrap();
		assert_eq!(
			fx.read(".blackbox/blackbox-admins.txt"),
			"alice@example.com\n"
		);
	}
}
