// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io;
use std::path::PathBuf;

use blackbox_common_backend::{ciphertext_path, CIPHERTEXT_SUFFIX};
use blackbox_common_makesafe::{first_few, redact_many};
use blackbox_common_registry::{SortedFile, FILES_FILE};
use tracing::{debug, info, warn};

use crate::blackbox::Blackbox;
use crate::error::{BoxError, Result};
use crate::message::pretty_commit_message;
use crate::names::check_unique_names;
use crate::outcome::Outcome;

impl Blackbox {
	/// Registers new secret files.
	///
	/// Every file is encrypted before the registry is touched. A failure
	/// leaves the registry as it was and removes the ciphertexts this call
	/// wrote. The plaintexts are added to the repository's ignore list.
	pub async fn file_add(&mut self, names: &[String], shred: bool) -> Result<Outcome> {
		self.require_writable()?;
		check_unique_names(names)?;
		let files = self.files()?;
		if let Some(dup) = names.iter().find(|n| Self::is_registered(&files, n)) {
			return Err(BoxError::AlreadyRegistered(dup.clone()));
		}
		let recipients = self.recipients()?;

		let mut ciphertexts = Vec::with_capacity(names.len());
		let mut created = Vec::new();
		for name in names {
			let plain = self.plain_path(name);
			let cipher = ciphertext_path(&plain);
			if !cipher.exists() {
				created.push(cipher);
			}
			if let Err(e) = self
				.crypter
				.encrypt(&plain, self.settings.umask, &recipients)
				.await
			{
				remove_ciphertexts(&created);
				return Err(e.into());
			}
			ciphertexts.push(format!("{name}{CIPHERTEXT_SUFFIX}"));
		}

		let updated = SortedFile::new(self.files_path()).append(names)?;
		self.set_files(updated);
		info!(count = names.len(), "registered files");

		let mut outcome = Outcome::default();
		if shred {
			let shredder = self.shredder().await;
			for name in names {
				if let Err(e) = shredder.shred(&self.plain_path(name)).await {
					outcome.skip(name, format!("registered, but shredding failed: {e}"));
				}
			}
		}

		self.vcs
			.commit_title(&format!("BLACKBOX ADD FILE: {}", first_few(&redact_many(names))));
		let mut commit_files = vec![self.config_rel(FILES_FILE)];
		commit_files.extend(ciphertexts);
		self.vcs.needs_commit(
			&pretty_commit_message("blackbox-files.txt add", names),
			&self.repo_root,
			commit_files,
		);

		if let Err(e) = self.vcs.ignore_files(&self.repo_root, names) {
			for name in names {
				outcome.skip(
					name,
					format!("registered, but adding it to the ignore list failed: {e}"),
				);
			}
		}

		outcome.processed = names.to_vec();
		Ok(outcome)
	}

	/// Every registered file name, sorted.
	pub fn file_list(&mut self) -> Result<Vec<String>> {
		self.files()
	}

	/// Unregisters files and deletes their ciphertexts. Plaintexts stay.
	pub async fn file_remove(&mut self, names: &[String]) -> Result<Outcome> {
		self.require_writable()?;
		check_unique_names(names)?;
		let files = self.files()?;
		if let Some(missing) = names.iter().find(|n| !Self::is_registered(&files, n)) {
			return Err(BoxError::NotRegistered(missing.clone()));
		}

		let updated = SortedFile::new(self.files_path()).remove(names)?;
		self.set_files(updated);
		info!(count = names.len(), "unregistered files");

		let mut outcome = Outcome::default();
		let mut commit_files = vec![self.config_rel(FILES_FILE)];
		for name in names {
			let cipher = ciphertext_path(&self.plain_path(name));
			match std::fs::remove_file(&cipher) {
				Ok(()) => commit_files.push(format!("{name}{CIPHERTEXT_SUFFIX}")),
				Err(e) if e.kind() == io::ErrorKind::NotFound => {}
				Err(e) => {
					outcome.skip(name, format!("unregistered, but removing the ciphertext failed: {e}"));
					continue;
				}
			}
			outcome.done(name);
		}

		self.vcs.needs_commit(
			&pretty_commit_message("blackbox-files.txt remove", names),
			&self.repo_root,
			commit_files,
		);
		Ok(outcome)
	}
}

/// Best-effort removal of ciphertexts written by an aborted add.
fn remove_ciphertexts(created: &[PathBuf]) {
	for cipher in created {
		match std::fs::remove_file(cipher) {
			Ok(()) => debug!(path = %cipher.display(), "removed partial ciphertext"),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {}
			Err(e) => warn!(path = %cipher.display(), error = %e, "could not remove partial ciphertext"),
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::blackbox::testing::Fixture;
	use crate::error::BoxError;
	use blackbox_common_backend::mock::VcsCall;

	fn names(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	/// Test: adding files encrypts them, registers them in sorted order,
	/// ignores the plaintexts and queues one titled commit.
	///
	/// Why this test is important: This is the path every secret enters the
	/// repository through; each side effect is relied on later.
	#[tokio::test]
	async fn test_file_add() {
		let fx = Fixture::new(&["alice@example.com"], &["m.txt"]);
		fx.write("z.txt", "zz");
		fx.write("a.txt", "aa");
		let mut bx = fx.blackbox();

		let outcome = bx.file_add(&names(&["z.txt", "a.txt"]), false).await.unwrap();
		assert_eq!(outcome.processed, vec!["z.txt", "a.txt"]);
		assert_eq!(fx.read(".blackbox/blackbox-files.txt"), "a.txt\nm.txt\nz.txt\n");
		assert!(fx.exists("z.txt.gpg"));
		assert_eq!(bx.file_list().unwrap(), vec!["a.txt", "m.txt", "z.txt"]);

		let calls = fx.vcs.get_calls();
		assert!(calls.contains(&VcsCall::IgnoreFiles(names(&["z.txt", "a.txt"]))));
		assert!(calls.contains(&VcsCall::CommitTitle("BLACKBOX ADD FILE: z.txt a.txt".into())));
		assert!(calls.contains(&VcsCall::NeedsCommit {
			message: "blackbox-files.txt add: z.txt a.txt".into(),
			files: names(&[".blackbox/blackbox-files.txt", "z.txt.gpg", "a.txt.gpg"]),
		}));
	}

	/// Test: a failed encryption leaves the registry byte-for-byte unchanged.
	///
	/// Why this test is important: A registered file without a ciphertext
	/// would break every later bulk operation.
	#[tokio::test]
	async fn test_file_add_encrypt_failure_keeps_registry() {
		let mut fx = Fixture::new(&["alice@example.com"], &["m.txt"]);
		fx.crypter = fx.crypter.clone().failing_encrypt("b.txt");
		fx.write("a.txt", "aa");
		fx.write("b.txt", "bb");
		let before = fx.read(".blackbox/blackbox-files.txt");
		let mut bx = fx.blackbox();

		assert!(bx.file_add(&names(&["a.txt", "b.txt"]), false).await.is_err());
		assert_eq!(fx.read(".blackbox/blackbox-files.txt"), before);
		assert!(fx.vcs.get_calls().is_empty());
		assert!(!fx.exists("a.txt.gpg"));
		assert!(!fx.exists("b.txt.gpg"));
		assert!(fx.exists("a.txt"));
	}

	/// Test: a ciphertext that was already on disk survives a failed add.
	///
	/// Why this test is important: Cleanup must only undo what the failed
	/// call wrote, never a file the user had before.
	#[tokio::test]
	async fn test_file_add_encrypt_failure_keeps_existing_ciphertext() {
		let mut fx = Fixture::new(&["alice@example.com"], &[]);
		fx.crypter = fx.crypter.clone().failing_encrypt("b.txt");
		fx.write("a.txt", "aa");
		fx.write("b.txt", "bb");
		fx.write("b.txt.gpg", "older cipher");
		let mut bx = fx.blackbox();

		assert!(bx.file_add(&names(&["a.txt", "b.txt"]), false).await.is_err());
		assert!(!fx.exists("a.txt.gpg"));
		assert_eq!(fx.read("b.txt.gpg"), "older cipher");
	}

	/// Test: when the ignore list cannot be updated, the add still completes
	/// and each name is reported as a skip.
	///
	/// Why this test is important: By then the registry already lists the
	/// files, so the commit must still be queued to record that change.
	#[tokio::test]
	async fn test_file_add_ignore_failure_still_queues_commit() {
		let mut fx = Fixture::new(&["alice@example.com"], &[]);
		fx.vcs = fx.vcs.clone().failing_ignore();
		fx.write("a.txt", "aa");
		let mut bx = fx.blackbox();

		let outcome = bx.file_add(&names(&["a.txt"]), false).await.unwrap();
		assert_eq!(outcome.processed, vec!["a.txt"]);
		assert_eq!(outcome.skipped_names(), vec!["a.txt"]);
		assert!(outcome.skipped[0].reason.contains("ignore list"));
		assert_eq!(fx.read(".blackbox/blackbox-files.txt"), "a.txt\n");
		assert!(fx.vcs.get_calls().contains(&VcsCall::NeedsCommit {
			message: "blackbox-files.txt add: a.txt".into(),
			files: names(&[".blackbox/blackbox-files.txt", "a.txt.gpg"]),
		}));
	}

	#[tokio::test]
	async fn test_file_add_rejects_bad_requests() {
		let fx = Fixture::new(&["alice@example.com"], &["m.txt"]);
		let mut bx = fx.blackbox();

		assert!(matches!(
			bx.file_add(&names(&["m.txt"]), false).await,
			Err(BoxError::AlreadyRegistered(n)) if n == "m.txt"
		));
		assert!(matches!(
			bx.file_add(&names(&["x", "x"]), false).await,
			Err(BoxError::InvalidName { .. })
		));
		assert!(matches!(
			bx.file_add(&names(&["x.gpg"]), false).await,
			Err(BoxError::InvalidName { .. })
		));
		assert!(fx.crypter.get_calls().is_empty());
	}

	#[tokio::test]
	async fn test_file_add_with_shred() {
		let fx = Fixture::new(&["alice@example.com"], &[]);
		fx.write("a.txt", "aa");
		let mut bx = fx.blackbox();

		bx.file_add(&names(&["a.txt"]), true).await.unwrap();
		assert!(!fx.exists("a.txt"));
		assert!(fx.exists("a.txt.gpg"));
	}

	#[tokio::test]
	async fn test_file_remove() {
		let fx = Fixture::new(&["alice@example.com"], &["a.txt", "b.txt"]);
		fx.write("a.txt", "aa");
		fx.write("a.txt.gpg", "cipher");
		let mut bx = fx.blackbox();

		let outcome = bx.file_remove(&names(&["a.txt"])).await.unwrap();
		assert_eq!(outcome.processed, vec!["a.txt"]);
		assert_eq!(fx.read(".blackbox/blackbox-files.txt"), "b.txt\n");
		assert!(!fx.exists("a.txt.gpg"));
		assert!(fx.exists("a.txt"));
		assert!(fx.vcs.get_calls().contains(&VcsCall::NeedsCommit {
			message: "blackbox-files.txt remove: a.txt".into(),
			files: names(&[".blackbox/blackbox-files.txt", "a.txt.gpg"]),
		}));

		assert!(matches!(
			bx.file_remove(&names(&["a.txt"])).await,
			Err(BoxError::NotRegistered(_))
		));
	}
}
