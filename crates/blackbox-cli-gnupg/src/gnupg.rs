// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use blackbox_common_backend::{
	ciphertext_path, BackendError, BackendOptions, Crypter, Plaintext, Result,
};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::umask::UmaskGuard;

pub const GNUPG_NAME: &str = "GnuPG";
pub const GNUPG_PRIORITY: i32 = 100;

/// Keyring files that may change when keys are imported or deleted.
const KEYRING_FILES: [&str; 3] = ["pubring.gpg", "pubring.kbx", "trustdb.gpg"];

/// Cipher backend driving the `gpg2` or `gpg` binary.
#[derive(Debug, Clone)]
pub struct GnupgCrypter {
	gpg: PathBuf,
}

pub(crate) fn new_gnupg(options: &BackendOptions) -> Box<dyn Crypter> {
	let crypter = GnupgCrypter::discover();
	if options.debug {
		debug!(gpg = %crypter.gpg.display(), "selected gpg binary");
	}
	Box::new(crypter)
}

impl GnupgCrypter {
	/// Uses `gpg2` if it is on PATH, else `gpg`, else assumes `gpg2`.
	pub fn discover() -> Self {
		let gpg = find_in_path("gpg2")
			.or_else(|| find_in_path("gpg"))
			.unwrap_or_else(|| PathBuf::from("gpg2"));
		Self { gpg }
	}

	pub fn with_binary(gpg: impl Into<PathBuf>) -> Self {
		Self { gpg: gpg.into() }
	}

	pub fn binary(&self) -> &Path {
		&self.gpg
	}

	fn command(&self, args: &[OsString]) -> Command {
		trace!(
			cmd = %format!("{} {}", self.gpg.display(), display_args(args)),
			"running gpg command"
		);
		let mut cmd = Command::new(&self.gpg);
		cmd.args(args);
		cmd
	}

	/// Runs gpg attached to the terminal so pinentry can prompt.
	async fn run_interactive(&self, args: &[OsString]) -> Result<()> {
		let status = self
			.command(args)
			.status()
			.await
			.map_err(|e| self.spawn_error(e))?;
		if status.success() {
			Ok(())
		} else {
			Err(self.failed(args, status.to_string()))
		}
	}

	/// Runs gpg with `input` on stdin and returns its stdout.
	async fn run_piped(&self, args: &[OsString], input: Option<Vec<u8>>) -> Result<Vec<u8>> {
		let mut child = self
			.command(args)
			.stdin(if input.is_some() {
				Stdio::piped()
			} else {
				Stdio::null()
			})
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.spawn()
			.map_err(|e| self.spawn_error(e))?;

		let writer = match (input, child.stdin.take()) {
			(Some(bytes), Some(mut stdin)) => Some(tokio::spawn(async move {
				let result = stdin.write_all(&bytes).await;
				drop(stdin);
				result
			})),
			_ => None,
		};

		let output = child.wait_with_output().await?;
		if let Some(writer) = writer {
			match writer.await {
				Ok(Ok(())) => {}
				Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
				Ok(Err(e)) => return Err(BackendError::Io(e)),
				Err(e) => return Err(BackendError::other(e)),
			}
		}

		if output.status.success() {
			Ok(output.stdout)
		} else {
			let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
			Err(self.failed(args, stderr))
		}
	}

	fn spawn_error(&self, e: std::io::Error) -> BackendError {
		if e.kind() == std::io::ErrorKind::NotFound {
			warn!(gpg = %self.gpg.display(), "gpg not found in PATH");
			BackendError::ToolNotInstalled(self.gpg.display().to_string())
		} else {
			BackendError::Io(e)
		}
	}

	fn failed(&self, args: &[OsString], stderr: String) -> BackendError {
		BackendError::CommandFailed {
			cmd: self.gpg.display().to_string(),
			args: args
				.iter()
				.map(|a| a.to_string_lossy().into_owned())
				.collect(),
			stderr,
		}
	}
}

#[async_trait]
impl Crypter for GnupgCrypter {
	fn name(&self) -> &str {
		GNUPG_NAME
	}

	async fn decrypt(&self, plain: &Path, umask: u32, overwrite: bool) -> Result<()> {
		let args = decrypt_args(plain, overwrite);
		let _umask = UmaskGuard::set(umask);
		self.run_interactive(&args).await?;
		debug!(file = %plain.display(), "decrypted");
		Ok(())
	}

	async fn encrypt(&self, plain: &Path, umask: u32, recipients: &[String]) -> Result<PathBuf> {
		let cipher = ciphertext_path(plain);
		let args = encrypt_args(plain, &cipher, recipients);
		let _umask = UmaskGuard::set(umask);
		self.run_interactive(&args).await?;
		debug!(file = %plain.display(), recipients = recipients.len(), "encrypted");
		Ok(cipher)
	}

	async fn cat(&self, plain: &Path) -> Result<Plaintext> {
		let cipher = ciphertext_path(plain);
		let input = match tokio::fs::read(&cipher).await {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				debug!(file = %plain.display(), "no ciphertext; returning plaintext");
				return Ok(Plaintext::new(tokio::fs::read(plain).await?));
			}
			Err(e) => return Err(BackendError::Io(e)),
		};

		let args = os_args(["--use-agent", "-q", "--decrypt"]);
		let out = self.run_piped(&args, Some(input)).await?;
		Ok(Plaintext::new(out))
	}

	async fn add_new_key(
		&self,
		identity: &str,
		repo_root: &Path,
		source_dir: Option<&Path>,
		dest_dir: &Path,
	) -> Result<Vec<String>> {
		let mut export = os_args(["--export", "-a"]);
		if let Some(src) = source_dir {
			export.push("--homedir".into());
			export.push(src.as_os_str().to_os_string());
		}
		export.push(identity.into());

		debug!(identity, "exporting public key");
		let pubkey = self.run_piped(&export, None).await?;
		if pubkey.is_empty() {
			return Err(BackendError::other(format!(
				"nothing found when {identity:?} was exported from {}",
				source_dir
					.map(|p| p.display().to_string())
					.unwrap_or_else(|| "the default keyring".to_string())
			)));
		}

		let mut import = os_args(["--no-permission-warning", "--homedir"]);
		import.push(dest_dir.as_os_str().to_os_string());
		import.push("--import".into());
		debug!(identity, keyring = %dest_dir.display(), "importing public key");
		self.run_piped(&import, Some(pubkey)).await?;

		Ok(changed_keyring_files(repo_root, dest_dir))
	}

	async fn remove_key(
		&self,
		identity: &str,
		repo_root: &Path,
		keyring_dir: &Path,
	) -> Result<Vec<String>> {
		let mut args = os_args(["--no-permission-warning", "--homedir"]);
		args.push(keyring_dir.as_os_str().to_os_string());
		args.extend(os_args(["--batch", "--yes", "--delete-key"]));
		args.push(identity.into());

		// A key that is already gone is not an error.
		if let Err(e) = self.run_piped(&args, None).await {
			warn!(identity, error = %e, "could not delete key from keyring");
		}
		Ok(changed_keyring_files(repo_root, keyring_dir))
	}
}

fn os_args<const N: usize>(args: [&str; N]) -> Vec<OsString> {
	args.into_iter().map(OsString::from).collect()
}

fn display_args(args: &[OsString]) -> String {
	args.iter()
		.map(|a| a.to_string_lossy())
		.collect::<Vec<_>>()
		.join(" ")
}

fn decrypt_args(plain: &Path, overwrite: bool) -> Vec<OsString> {
	let mut args = os_args(["--use-agent", "-q", "--decrypt", "-o"]);
	args.push(plain.as_os_str().to_os_string());
	if overwrite {
		args.push("--yes".into());
	}
	args.push(ciphertext_path(plain).into_os_string());
	args
}

fn encrypt_args(plain: &Path, cipher: &Path, recipients: &[String]) -> Vec<OsString> {
	let mut args = os_args(["--use-agent", "--yes", "--trust-model=always", "--encrypt", "-o"]);
	args.push(cipher.as_os_str().to_os_string());
	for r in recipients {
		args.push("-r".into());
		args.push(r.into());
	}
	args.push("--encrypt".into());
	args.push(plain.as_os_str().to_os_string());
	args
}

/// Keyring files present in `keyring_dir`, relative to `repo_root` when
/// possible.
fn changed_keyring_files(repo_root: &Path, keyring_dir: &Path) -> Vec<String> {
	let prefix = keyring_dir.strip_prefix(repo_root).unwrap_or(keyring_dir);
	KEYRING_FILES
		.iter()
		.filter(|f| keyring_dir.join(f).exists())
		.map(|f| prefix.join(f).to_string_lossy().into_owned())
		.collect()
}

fn find_in_path(name: &str) -> Option<PathBuf> {
	let paths = std::env::var_os("PATH")?;
	std::env::split_paths(&paths)
		.map(|dir| dir.join(name))
		.find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
	use std::os::unix::fs::PermissionsExt;
	path.metadata()
		.map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
		.unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
	path.is_file()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	fn strings(args: &[OsString]) -> Vec<String> {
		args.iter()
			.map(|a| a.to_string_lossy().into_owned())
			.collect()
	}

	#[test]
	fn test_decrypt_args() {
		assert_eq!(
			strings(&decrypt_args(Path::new("/r/a.txt"), false)),
			vec!["--use-agent", "-q", "--decrypt", "-o", "/r/a.txt", "/r/a.txt.gpg"]
		);
		assert_eq!(
			strings(&decrypt_args(Path::new("/r/a.txt"), true)),
			vec!["--use-agent", "-q", "--decrypt", "-o", "/r/a.txt", "--yes", "/r/a.txt.gpg"]
		);
	}

	/// Test: every recipient is passed with its own -r flag.
	///
	/// Why this test is important: A dropped recipient silently locks that
	/// administrator out of the secret until the next reencrypt.
	#[test]
	fn test_encrypt_args() {
		let args = encrypt_args(
			Path::new("a.txt"),
			Path::new("a.txt.gpg"),
			&["alice@example.com".to_string(), "bob@example.com".to_string()],
		);
		assert_eq!(
			strings(&args),
			vec![
				"--use-agent",
				"--yes",
				"--trust-model=always",
				"--encrypt",
				"-o",
				"a.txt.gpg",
				"-r",
				"alice@example.com",
				"-r",
				"bob@example.com",
				"--encrypt",
				"a.txt"
			]
		);
	}

	#[test]
	fn test_changed_keyring_files() {
		let temp = TempDir::new().unwrap();
		let keyring = temp.path().join(".blackbox");
		fs::create_dir(&keyring).unwrap();
		fs::write(keyring.join("pubring.kbx"), "").unwrap();
		fs::write(keyring.join("trustdb.gpg"), "").unwrap();

		assert_eq!(
			changed_keyring_files(temp.path(), &keyring),
			vec![".blackbox/pubring.kbx", ".blackbox/trustdb.gpg"]
		);
	}

	/// Test: cat falls back to the plaintext when there is no ciphertext.
	///
	/// Why this test is important: Freshly created secrets have no .gpg yet;
	/// `cat` must still show them without invoking gpg at all.
	#[tokio::test]
	async fn test_cat_without_ciphertext_reads_plaintext() {
		let temp = TempDir::new().unwrap();
		let plain = temp.path().join("new.txt");
		fs::write(&plain, "draft").unwrap();

		let crypter = GnupgCrypter::with_binary("/nonexistent/gpg");
		let out = crypter.cat(&plain).await.unwrap();
		assert_eq!(out.expose(), b"draft");
	}

	#[tokio::test]
	async fn test_missing_binary_is_reported() {
		let temp = TempDir::new().unwrap();
		let plain = temp.path().join("a.txt");
		fs::write(temp.path().join("a.txt.gpg"), "junk").unwrap();

		let crypter = GnupgCrypter::with_binary("/nonexistent/gpg");
		let err = crypter.cat(&plain).await.unwrap_err();
		assert!(matches!(err, BackendError::ToolNotInstalled(_)), "got {err:?}");
	}
}
