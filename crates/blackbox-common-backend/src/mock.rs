// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory backends for exercising the orchestrator without gpg or git.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use blackbox_cli_commit::{CommitQueue, FlushSummary, MockCommitSink, PendingCommit};

use crate::crypter::{ciphertext_path, Crypter};
use crate::error::{BackendError, Result};
use crate::plaintext::Plaintext;
use crate::vcs::Vcs;

const MOCK_HEADER: &str = "MOCKGPG";

/// Recorded call to the mock crypter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CrypterCall {
	Decrypt { path: PathBuf, overwrite: bool },
	Encrypt { path: PathBuf, recipients: Vec<String> },
	Cat(PathBuf),
	AddNewKey { identity: String, dest: PathBuf },
	RemoveKey(String),
}

/// Mock crypter for testing.
///
/// "Ciphertext" is the plaintext behind a one-line header naming the
/// recipients, so round trips are observable on disk.
#[derive(Clone, Default)]
pub struct MockCrypter {
	/// Plaintext names whose encryption fails.
	pub fail_encrypt: Vec<String>,
	/// Identities add_new_key refuses to export.
	pub unknown_keys: Vec<String>,
	/// Track calls for verification.
	pub calls: Arc<Mutex<Vec<CrypterCall>>>,
}

impl MockCrypter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn failing_encrypt(mut self, name: impl Into<String>) -> Self {
		self.fail_encrypt.push(name.into());
		self
	}

	pub fn with_unknown_key(mut self, identity: impl Into<String>) -> Self {
		self.unknown_keys.push(identity.into());
		self
	}

	/// Returns the recorded calls.
	pub fn get_calls(&self) -> Vec<CrypterCall> {
		self.calls.lock().unwrap().clone()
	}

	fn record(&self, call: CrypterCall) {
		self.calls.lock().unwrap().push(call);
	}

	fn read_ciphertext(path: &Path) -> Result<Vec<u8>> {
		let raw = fs::read(path)?;
		let body = raw
			.iter()
			.position(|b| *b == b'\n')
			.filter(|_| raw.starts_with(MOCK_HEADER.as_bytes()))
			.map(|idx| raw[idx + 1..].to_vec())
			.ok_or_else(|| BackendError::other(format!("{} is not mock ciphertext", path.display())))?;
		Ok(body)
	}

	fn keyring_entry(repo_root: &Path, dest: &Path) -> String {
		let ring = dest.join("pubring.kbx");
		ring.strip_prefix(repo_root)
			.unwrap_or(&ring)
			.to_string_lossy()
			.into_owned()
	}
}

#[async_trait]
impl Crypter for MockCrypter {
	fn name(&self) -> &str {
		"MOCK"
	}

	async fn decrypt(&self, plain: &Path, _umask: u32, overwrite: bool) -> Result<()> {
		self.record(CrypterCall::Decrypt {
			path: plain.to_path_buf(),
			overwrite,
		});
		if plain.exists() && !overwrite {
			return Err(BackendError::other(format!(
				"{} exists; refusing to overwrite",
				plain.display()
			)));
		}
		let cipher = ciphertext_path(plain);
		let body = Self::read_ciphertext(&cipher)?;
		fs::write(plain, body)?;

		// A fresh plaintext is always newer than the ciphertext it came from.
		let cipher_mtime = fs::metadata(&cipher)?.modified()?;
		File::options()
			.write(true)
			.open(plain)?
			.set_modified(cipher_mtime + Duration::from_secs(1))?;
		Ok(())
	}

	async fn encrypt(&self, plain: &Path, _umask: u32, recipients: &[String]) -> Result<PathBuf> {
		self.record(CrypterCall::Encrypt {
			path: plain.to_path_buf(),
			recipients: recipients.to_vec(),
		});
		let name = plain.to_string_lossy();
		if self.fail_encrypt.iter().any(|f| name.ends_with(f.as_str())) {
			return Err(BackendError::CommandFailed {
				cmd: "mock".to_string(),
				args: vec!["--encrypt".to_string(), name.into_owned()],
				stderr: "encryption failed".to_string(),
			});
		}

		let body = fs::read(plain)?;
		let mut out = format!("{MOCK_HEADER} {}\n", recipients.join(";")).into_bytes();
		out.extend_from_slice(&body);

		let cipher = ciphertext_path(plain);
		fs::write(&cipher, out)?;

		// Keep the ciphertext strictly newer than the plaintext it came from.
		let plain_mtime = fs::metadata(plain)?.modified()?;
		File::options()
			.write(true)
			.open(&cipher)?
			.set_modified(plain_mtime + Duration::from_secs(1))?;
		Ok(cipher)
	}

	async fn cat(&self, plain: &Path) -> Result<Plaintext> {
		self.record(CrypterCall::Cat(plain.to_path_buf()));
		let cipher = ciphertext_path(plain);
		if !cipher.exists() {
			return Ok(Plaintext::new(fs::read(plain)?));
		}
		Ok(Plaintext::new(Self::read_ciphertext(&cipher)?))
	}

	async fn add_new_key(
		&self,
		identity: &str,
		repo_root: &Path,
		_source_dir: Option<&Path>,
		dest_dir: &Path,
	) -> Result<Vec<String>> {
		self.record(CrypterCall::AddNewKey {
			identity: identity.to_string(),
			dest: dest_dir.to_path_buf(),
		});
		if self.unknown_keys.iter().any(|k| k == identity) {
			return Err(BackendError::other(format!(
				"nothing found when {identity:?} was exported"
			)));
		}
		blackbox_common_registry::append_lines(&dest_dir.join("pubring.kbx"), &[identity])?;
		Ok(vec![Self::keyring_entry(repo_root, dest_dir)])
	}

	async fn remove_key(
		&self,
		identity: &str,
		repo_root: &Path,
		keyring_dir: &Path,
	) -> Result<Vec<String>> {
		self.record(CrypterCall::RemoveKey(identity.to_string()));
		Ok(vec![Self::keyring_entry(repo_root, keyring_dir)])
	}
}

/// Recorded call to the mock repository backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VcsCall {
	SetFileTypeUnix(Vec<String>),
	IgnoreFiles(Vec<String>),
	IgnoreAnywhere(Vec<String>),
	CommitTitle(String),
	NeedsCommit { message: String, files: Vec<String> },
	Flush,
	TestingInit(PathBuf),
}

/// Mock repository backend for testing.
#[derive(Clone)]
pub struct MockVcs {
	/// Whether discover claims every directory.
	pub discoverable: bool,
	/// Whether ignore_files reports a failure after recording the call.
	pub fail_ignore: bool,
	/// Receives flushed commits.
	pub sink: MockCommitSink,
	/// Track calls for verification.
	pub calls: Arc<Mutex<Vec<VcsCall>>>,
	queue: CommitQueue,
}

impl Default for MockVcs {
	fn default() -> Self {
		Self::new()
	}
}

impl MockVcs {
	pub fn new() -> Self {
		Self {
			discoverable: true,
			fail_ignore: false,
			sink: MockCommitSink::new(),
			calls: Arc::new(Mutex::new(Vec::new())),
			queue: CommitQueue::new(),
		}
	}

	pub fn undiscoverable(mut self) -> Self {
		self.discoverable = false;
		self
	}

	pub fn failing_ignore(mut self) -> Self {
		self.fail_ignore = true;
		self
	}

	/// Returns the recorded calls.
	pub fn get_calls(&self) -> Vec<VcsCall> {
		self.calls.lock().unwrap().clone()
	}

	fn record(&self, call: VcsCall) {
		self.calls.lock().unwrap().push(call);
	}
}

#[async_trait]
impl Vcs for MockVcs {
	fn name(&self) -> &str {
		"MOCK"
	}

	async fn discover(&self, dir: &Path) -> Option<PathBuf> {
		self.discoverable.then(|| dir.to_path_buf())
	}

	fn set_file_type_unix(&mut self, _repo_root: &Path, files: &[String]) -> Result<()> {
		self.record(VcsCall::SetFileTypeUnix(files.to_vec()));
		Ok(())
	}

	fn ignore_files(&mut self, _repo_root: &Path, files: &[String]) -> Result<()> {
		self.record(VcsCall::IgnoreFiles(files.to_vec()));
		if self.fail_ignore {
			return Err(BackendError::Other("ignore list is not writable".to_string()));
		}
		Ok(())
	}

	fn ignore_anywhere(&mut self, _repo_root: &Path, patterns: &[String]) -> Result<()> {
		self.record(VcsCall::IgnoreAnywhere(patterns.to_vec()));
		Ok(())
	}

	fn commit_title(&mut self, title: &str) {
		self.record(VcsCall::CommitTitle(title.to_string()));
		self.queue.set_title(title);
	}

	fn needs_commit(&mut self, message: &str, repo_root: &Path, files: Vec<String>) {
		self.record(VcsCall::NeedsCommit {
			message: message.to_string(),
			files: files.clone(),
		});
		self.queue.enqueue(message, repo_root, files);
	}

	fn pending_commits(&self) -> &[PendingCommit] {
		self.queue.pending()
	}

	async fn flush_commits(&mut self) -> Result<FlushSummary> {
		self.record(VcsCall::Flush);
		Ok(self.queue.flush(&mut self.sink).await?)
	}

	async fn testing_init_repo(&self, dir: &Path) -> Result<()> {
		self.record(VcsCall::TestingInit(dir.to_path_buf()));
		Ok(())
	}
}
