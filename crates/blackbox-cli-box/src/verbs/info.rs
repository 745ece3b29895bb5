// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::blackbox::Blackbox;

/// Snapshot of how blackbox sees the current repository.
#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
	pub repo_root: PathBuf,
	pub config_dir: PathBuf,
	pub vcs: String,
	pub crypto: String,
	pub admins: usize,
	pub files: usize,
	pub shred_command: String,
	pub umask: String,
	pub read_only: bool,
	/// Registry problems found while gathering the counts.
	pub problems: Vec<String>,
}

impl fmt::Display for InfoReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "repo root:   {}", self.repo_root.display())?;
		let access = if self.read_only { " (read-only)" } else { "" };
		writeln!(f, "config dir:  {}{access}", self.config_dir.display())?;
		writeln!(f, "vcs:         {}", self.vcs)?;
		writeln!(f, "crypto:      {}", self.crypto)?;
		writeln!(f, "admins:      {}", self.admins)?;
		writeln!(f, "files:       {}", self.files)?;
		writeln!(f, "shred:       {}", self.shred_command)?;
		writeln!(f, "umask:       {}", self.umask)?;
		for problem in &self.problems {
			writeln!(f, "problem:     {problem}")?;
		}
		Ok(())
	}
}

impl Blackbox {
	/// Gathers an [`InfoReport`]. Unreadable registries are reported as
	/// problems instead of failing.
	pub async fn info(&mut self) -> InfoReport {
		let mut problems = Vec::new();
		let admins = self.admins().map(|a| a.len()).unwrap_or_else(|e| {
			problems.push(e.to_string());
			0
		});
		let files = self.files().map(|f| f.len()).unwrap_or_else(|e| {
			problems.push(e.to_string());
			0
		});
		let shred_command = self.shredder().await.describe();

		InfoReport {
			repo_root: self.repo_root.clone(),
			config_dir: self.config_dir.clone(),
			vcs: self.vcs.name().to_string(),
			crypto: self.crypter.name().to_string(),
			admins,
			files,
			shred_command,
			umask: format!("{:04o}", self.settings.umask),
			read_only: self.is_config_read_only(),
			problems,
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::blackbox::testing::Fixture;

	#[tokio::test]
	async fn test_info_counts() {
		let fx = Fixture::new(&["alice@example.com", "bob@example.com"], &["a.txt"]);
		let mut bx = fx.blackbox();
		let report = bx.info().await;
		assert_eq!(report.admins, 2);
		assert_eq!(report.files, 1);
		assert_eq!(report.vcs, "MOCK");
		assert_eq!(report.crypto, "MOCK");
		assert_eq!(report.umask, "0027");
		assert!(!report.read_only);
		assert!(report.problems.is_empty());

		let text = report.to_string();
		assert!(text.contains("admins:      2"));
		assert!(text.contains("shred:       (none; files are unlinked)"));
	}

	/// Test: a corrupt registry shows up as a problem, not an error.
	///
	/// Why this test is important: info is the command users reach for when
	/// something is broken, so it has to keep working when the registries
	/// do not.
	#[tokio::test]
	async fn test_info_reports_corrupt_registry() {
		let fx = Fixture::new(&["alice@example.com"], &[]);
		fx.write(".blackbox/blackbox-files.txt", "b.txt\na.txt\n");
		let mut bx = fx.blackbox();
		let report = bx.info().await;
		assert_eq!(report.files, 0);
		assert_eq!(report.problems.len(), 1);
	}
}
