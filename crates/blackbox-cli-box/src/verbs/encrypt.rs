// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use blackbox_common_backend::CIPHERTEXT_SUFFIX;
use tracing::info;

use crate::blackbox::Blackbox;
use crate::error::Result;
use crate::message::pretty_commit_message;
use crate::names::check_names;
use crate::outcome::Outcome;

impl Blackbox {
	/// Encrypts registered files for every admin and queues a commit of the
	/// new ciphertexts. Empty `names` means every registered file.
	pub async fn encrypt(&mut self, names: &[String], shred: bool) -> Result<Outcome> {
		check_names(names)?;
		let (names, files) = self.names_or_all(names)?;
		let recipients = self.recipients()?;
		let shredder = if shred {
			Some(self.shredder().await)
		} else {
			None
		};

		let mut outcome = Outcome::default();
		let mut ciphertexts = Vec::new();
		for name in &names {
			if !Self::is_registered(&files, name) {
				outcome.skip(name, "not registered");
				continue;
			}
			let plain = self.plain_path(name);
			if !plain.exists() {
				outcome.skip(name, "plaintext is missing");
				continue;
			}
			if let Err(e) = self
				.crypter
				.encrypt(&plain, self.settings.umask, &recipients)
				.await
			{
				outcome.skip(name, e);
				continue;
			}
			ciphertexts.push(format!("{name}{CIPHERTEXT_SUFFIX}"));
			outcome.done(name);

			if let Some(ref shredder) = shredder {
				if let Err(e) = shredder.shred(&plain).await {
					outcome.skip(name, format!("encrypted, but shredding failed: {e}"));
				}
			}
		}

		if !ciphertexts.is_empty() {
			let message = pretty_commit_message("ENCRYPTED", &outcome.processed);
			self.vcs.needs_commit(&message, &self.repo_root, ciphertexts);
		}
		info!(
			encrypted = outcome.processed.len(),
			skipped = outcome.skipped.len(),
			"encrypt finished"
		);
		Ok(outcome)
	}
}
