// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io;

use tracing::info;

use crate::blackbox::Blackbox;
use crate::error::Result;
use crate::names::check_names;
use crate::outcome::Outcome;

impl Blackbox {
	/// Securely deletes the plaintexts of registered files. Ciphertexts are
	/// never touched. Empty `names` means every registered file.
	pub async fn shred(&mut self, names: &[String]) -> Result<Outcome> {
		check_names(names)?;
		let (names, files) = self.names_or_all(names)?;
		let shredder = self.shredder().await;

		let mut outcome = Outcome::default();
		for name in &names {
			if !Self::is_registered(&files, name) {
				outcome.skip(name, "not registered");
				continue;
			}
			let plain = self.plain_path(name);
			match std::fs::symlink_metadata(&plain) {
				Err(e) if e.kind() == io::ErrorKind::NotFound => {
					println!("======= already gone: {name:?}");
					outcome.done(name);
				}
				Err(e) => outcome.skip(name, e),
				Ok(_) => {
					println!("========== SHREDDING: {name:?}");
					match shredder.shred(&plain).await {
						Ok(()) => outcome.done(name),
						Err(e) => outcome.skip(name, e),
					}
				}
			}
		}

		info!(shredded = outcome.processed.len(), "shred finished");
		Ok(outcome)
	}
}

#[cfg(test)]
mod tests {
	use crate::blackbox::testing::Fixture;

	/// Test: shredding removes plaintexts only and tolerates ones that are
	/// already gone.
	///
	/// Why this test is important: Deleting a ciphertext would destroy the
	/// only committed copy of the secret.
	#[tokio::test]
	async fn test_shred_keeps_ciphertexts() {
		let fx = Fixture::new(&["alice@example.com"], &["a.txt", "b.txt"]);
		fx.write("a.txt", "secret");
		fx.write("a.txt.gpg", "cipher");
		fx.write("b.txt.gpg", "cipher");
		fx.write("other.txt", "not ours");
		let mut bx = fx.blackbox();

		let outcome = bx.shred(&[]).await.unwrap();
		assert_eq!(outcome.processed, vec!["a.txt", "b.txt"]);
		assert!(!fx.exists("a.txt"));
		assert!(fx.exists("a.txt.gpg"));
		assert!(fx.exists("b.txt.gpg"));
		assert!(fx.exists("other.txt"));
	}

	#[tokio::test]
	async fn test_shred_refuses_unregistered() {
		let fx = Fixture::new(&[], &["a.txt"]);
		fx.write("other.txt", "not ours");
		let mut bx = fx.blackbox();

		let outcome = bx.shred(&["other.txt".to_string()]).await.unwrap();
		assert_eq!(outcome.skipped_names(), vec!["other.txt"]);
		assert!(fx.exists("other.txt"));
	}

	#[tokio::test]
	async fn test_shred_needs_readable_registry() {
		let fx = Fixture::new(&[], &[]);
		std::fs::write(fx.root().join(".blackbox/blackbox-files.txt"), "b\na\n").unwrap();
		let mut bx = fx.blackbox();
		assert!(bx.shred(&[]).await.is_err());
	}
}
