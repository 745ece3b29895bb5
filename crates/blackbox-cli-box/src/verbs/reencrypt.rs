// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use blackbox_common_backend::CIPHERTEXT_SUFFIX;
use tracing::info;

use crate::blackbox::Blackbox;
use crate::error::{BoxError, Result};
use crate::message::pretty_commit_message;
use crate::names::check_names;
use crate::outcome::Outcome;
use crate::prompt::agent_notice;

pub const REENCRYPT_WARNING: &str =
	"WARNING: This will overwrite any unencrypted files laying about. Continue? (yes/no)";

impl Blackbox {
	/// Decrypts and encrypts files again so the ciphertext matches the
	/// current admin list.
	///
	/// Plaintexts already on disk are shredded first with `overwrite`,
	/// otherwise the user must agree to losing them.
	pub async fn reencrypt(
		&mut self,
		names: &[String],
		overwrite: bool,
		bulk_pause: bool,
	) -> Result<Outcome> {
		check_names(names)?;
		let (names, files) = self.names_or_all(names)?;
		let recipients = self.recipients()?;

		eprintln!("========== ADMINS:");
		for admin in &recipients {
			eprintln!("    {admin}");
		}

		let mut outcome = Outcome::default();
		let mut targets = Vec::with_capacity(names.len());
		for name in names {
			if Self::is_registered(&files, &name) {
				targets.push(name);
			} else {
				outcome.skip(name, "not registered");
			}
		}

		let lying_about: Vec<String> = targets
			.iter()
			.filter(|n| self.plain_path(n).exists())
			.cloned()
			.collect();
		let shredder = self.shredder().await;
		if !lying_about.is_empty() {
			if overwrite {
				for name in &lying_about {
					if let Err(e) = shredder.shred(&self.plain_path(name)).await {
						outcome.skip(name.as_str(), format!("could not shred existing plaintext: {e}"));
						targets.retain(|t| t != name);
					}
				}
			} else {
				eprintln!("These plaintext files exist:");
				for name in &lying_about {
					eprintln!("    {name}");
				}
				let go_ahead = self
					.prompter
					.confirm(REENCRYPT_WARNING)
					.map_err(|e| BoxError::io("stdin", e))?;
				if !go_ahead {
					return Err(BoxError::Aborted);
				}
			}
		}

		if bulk_pause {
			agent_notice(self.prompter.as_mut()).map_err(|e| BoxError::io("stdin", e))?;
		}

		let umask = self.settings.umask;
		let mut ciphertexts = Vec::new();
		for name in &targets {
			let plain = self.plain_path(name);
			if let Err(e) = self.crypter.decrypt(&plain, umask, true).await {
				outcome.skip(name.as_str(), e);
				continue;
			}
			let encrypted = self.crypter.encrypt(&plain, umask, &recipients).await;
			let shredded = shredder.shred(&plain).await;
			if let Err(e) = encrypted {
				outcome.skip(name.as_str(), e);
				continue;
			}
			ciphertexts.push(format!("{name}{CIPHERTEXT_SUFFIX}"));
			outcome.done(name.as_str());
			if let Err(e) = shredded {
				outcome.skip(name.as_str(), format!("re-encrypted, but shredding failed: {e}"));
			}
		}

		if !ciphertexts.is_empty() {
			let message = pretty_commit_message("REENCRYPTED", &outcome.processed);
			self.vcs.needs_commit(&message, &self.repo_root, ciphertexts);
		}
		info!(
			reencrypted = outcome.processed.len(),
			skipped = outcome.skipped.len(),
			"reencrypt finished"
		);
		Ok(outcome)
	}
}
