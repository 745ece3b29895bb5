// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use tracing::{info, warn};

use crate::blackbox::Blackbox;
use crate::error::{BoxError, Result};
use crate::group::{apply_group, resolve_group};
use crate::names::check_names;
use crate::outcome::Outcome;
use crate::prompt::agent_notice;

impl Blackbox {
	/// Decrypts files into their plaintext names.
	///
	/// Existing plaintexts are left alone unless `overwrite` is set. With a
	/// `group`, each plaintext is handed to that group and, when the
	/// `group_read` setting is on, made group-readable.
	pub async fn decrypt(
		&mut self,
		names: &[String],
		overwrite: bool,
		bulk_pause: bool,
		group: Option<&str>,
	) -> Result<Outcome> {
		check_names(names)?;
		let (names, files) = self.names_or_all(names)?;
		let gid = group.map(resolve_group).transpose()?;

		if bulk_pause {
			agent_notice(self.prompter.as_mut()).map_err(|e| BoxError::io("stdin", e))?;
		}

		let mut outcome = Outcome::default();
		for name in &names {
			if !Self::is_registered(&files, name) {
				warn!(file = %name, "not registered; decrypting anyway");
			}
			let plain = self.plain_path(name);
			if plain.exists() && !overwrite {
				outcome.skip(name, "plaintext exists; use --overwrite");
				continue;
			}
			if let Err(e) = self
				.crypter
				.decrypt(&plain, self.settings.umask, overwrite)
				.await
			{
				outcome.skip(name, e);
				continue;
			}
			if let Some(gid) = gid {
				if let Err(e) = apply_group(&plain, gid, self.settings.group_read) {
					outcome.skip(name, format!("decrypted, but changing its group failed: {e}"));
					continue;
				}
			}
			outcome.done(name);
		}

		info!(
			decrypted = outcome.processed.len(),
			skipped = outcome.skipped.len(),
			"decrypt finished"
		);
		Ok(outcome)
	}
}
