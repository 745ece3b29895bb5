// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::plaintext::Plaintext;

/// Suffix of every ciphertext file.
pub const CIPHERTEXT_SUFFIX: &str = ".gpg";

/// Path of the ciphertext that belongs to `plain`.
pub fn ciphertext_path(plain: &Path) -> PathBuf {
	let mut name = plain.as_os_str().to_os_string();
	name.push(CIPHERTEXT_SUFFIX);
	PathBuf::from(name)
}

/// Cipher backend: turns plaintext files into ciphertext and back.
#[async_trait]
pub trait Crypter: Send + Sync {
	/// Canonical backend name, as registered.
	fn name(&self) -> &str;

	/// Decrypts `plain.gpg` into `plain`. Without `overwrite` an existing
	/// plaintext is an error.
	async fn decrypt(&self, plain: &Path, umask: u32, overwrite: bool) -> Result<()>;

	/// Encrypts `plain` to every recipient, replacing `plain.gpg`. Returns the
	/// ciphertext path.
	async fn encrypt(&self, plain: &Path, umask: u32, recipients: &[String]) -> Result<PathBuf>;

	/// Returns the decrypted content of `plain.gpg`, or the plaintext itself
	/// when no ciphertext exists.
	async fn cat(&self, plain: &Path) -> Result<Plaintext>;

	/// Copies the public key of `identity` from `source_dir` (or the user's
	/// default keyring) into the keyring in `dest_dir`. Returns the keyring
	/// files that changed, relative to `repo_root`.
	async fn add_new_key(
		&self,
		identity: &str,
		repo_root: &Path,
		source_dir: Option<&Path>,
		dest_dir: &Path,
	) -> Result<Vec<String>>;

	/// Deletes the public key of `identity` from the keyring in `keyring_dir`.
	/// Returns the keyring files that changed, relative to `repo_root`.
	async fn remove_key(
		&self,
		identity: &str,
		repo_root: &Path,
		keyring_dir: &Path,
	) -> Result<Vec<String>>;
}
