// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::Path;

use blackbox_common_registry::{SortedFile, ADMINS_FILE};
use tracing::info;

use crate::blackbox::Blackbox;
use crate::error::{BoxError, Result};
use crate::outcome::Outcome;

fn check_identity(identity: &str) -> Result<()> {
	if identity.trim().is_empty() {
		return Err(BoxError::invalid_name(identity, "empty admin identity"));
	}
	if identity.contains(['\n', '\r']) {
		return Err(BoxError::invalid_name(identity, "admin identities may not contain line breaks"));
	}
	Ok(())
}

impl Blackbox {
	/// Trusts a new identity: imports its public key into the repository
	/// keyring and lists it as an admin.
	///
	/// The key comes from `source_dir` when given, otherwise from the
	/// user's own keyring. Files are not re-encrypted.
	pub async fn admin_add(&mut self, identity: &str, source_dir: Option<&Path>) -> Result<()> {
		self.require_writable()?;
		check_identity(identity)?;
		let admins = self.admins()?;
		if Self::is_registered(&admins, identity) {
			return Err(BoxError::AlreadyRegistered(identity.to_string()));
		}

		let changed = self
			.crypter
			.add_new_key(identity, &self.repo_root, source_dir, &self.config_dir)
			.await?;

		let updated = SortedFile::new(self.admins_path()).append(&[identity])?;
		self.set_admins(updated);
		info!(identity, "added admin");

		let mut files = vec![self.config_rel(ADMINS_FILE)];
		files.extend(changed);
		self.vcs.commit_title("ADMIN ADD");
		self.vcs
			.needs_commit(&format!("NEW ADMIN: {identity}"), &self.repo_root, files);
		Ok(())
	}

	/// Every admin identity, sorted.
	pub fn admin_list(&mut self) -> Result<Vec<String>> {
		self.admins()
	}

	/// Stops trusting identities. Existing ciphertexts stay readable by them
	/// until the files are re-encrypted.
	pub async fn admin_remove(&mut self, identities: &[String]) -> Result<Outcome> {
		self.require_writable()?;
		for identity in identities {
			check_identity(identity)?;
		}
		let admins = self.admins()?;
		if let Some(missing) = identities.iter().find(|i| !Self::is_registered(&admins, i)) {
			return Err(BoxError::NotRegistered(missing.clone()));
		}

		let updated = SortedFile::new(self.admins_path()).remove(identities)?;
		self.set_admins(updated);

		let mut outcome = Outcome::default();
		let mut files = vec![self.config_rel(ADMINS_FILE)];
		for identity in identities {
			match self
				.crypter
				.remove_key(identity, &self.repo_root, &self.config_dir)
				.await
			{
				Ok(changed) => {
					for file in changed {
						if !files.contains(&file) {
							files.push(file);
						}
					}
					outcome.done(identity);
				}
				Err(e) => outcome.skip(identity, format!("removed from the admin list, but not from the keyring: {e}")),
			}
		}
		info!(count = identities.len(), "removed admins");

		self.vcs.needs_commit(
			&format!("REMOVED ADMIN: {}", identities.join(" ")),
			&self.repo_root,
			files,
		);
		eprintln!("NOTE: Run 'blackbox reencrypt --all' so removed admins cannot read future versions.");
		Ok(outcome)
	}
}
