// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io::Write;

use tokio::process::Command;
use tracing::debug;

use crate::blackbox::Blackbox;
use crate::error::{BoxError, Result};
use crate::names::check_names;
use crate::outcome::Outcome;

impl Blackbox {
	/// Writes the decrypted content of each file to `out`.
	pub async fn cat(&mut self, names: &[String], out: &mut impl Write) -> Result<Outcome> {
		check_names(names)?;
		let files = self.files()?;
		let mut outcome = Outcome::default();
		for name in names {
			if !Self::is_registered(&files, name) {
				outcome.skip(name, "not registered");
				continue;
			}
			match self.crypter.cat(&self.plain_path(name)).await {
				Ok(plaintext) => {
					out.write_all(plaintext.expose())
						.map_err(|e| BoxError::io("stdout", e))?;
					outcome.done(name);
				}
				Err(e) => outcome.skip(name, e),
			}
		}
		out.flush().map_err(|e| BoxError::io("stdout", e))?;
		Ok(outcome)
	}

	/// Writes a unified diff between each ciphertext and its plaintext to
	/// `out`. Unchanged files produce no output.
	pub async fn diff(&mut self, names: &[String], out: &mut impl Write) -> Result<Outcome> {
		check_names(names)?;
		let (names, files) = self.names_or_all(names)?;
		let mut outcome = Outcome::default();
		for name in &names {
			if !Self::is_registered(&files, name) {
				outcome.skip(name, "not registered");
				continue;
			}
			let plain = self.plain_path(name);
			if !plain.exists() {
				outcome.skip(name, "plaintext is missing; nothing to compare");
				continue;
			}
			let decrypted = match self.crypter.cat(&plain).await {
				Ok(p) => p,
				Err(e) => {
					outcome.skip(name, e);
					continue;
				}
			};

			let mut scratch = tempfile::NamedTempFile::new().map_err(|e| BoxError::io("tempfile", e))?;
			scratch
				.write_all(decrypted.expose())
				.map_err(|e| BoxError::io(scratch.path(), e))?;
			drop(decrypted);

			let output = Command::new("diff")
				.arg("-u")
				.arg("--label")
				.arg(format!("{name}.gpg"))
				.arg("--label")
				.arg(name)
				.arg(scratch.path())
				.arg(&plain)
				.output()
				.await
				.map_err(|e| BoxError::Command {
					cmd: "diff".to_string(),
					message: e.to_string(),
				})?;
			match output.status.code() {
				Some(0) => debug!(file = %name, "no changes"),
				Some(1) => out
					.write_all(&output.stdout)
					.map_err(|e| BoxError::io("stdout", e))?,
				_ => {
					let stderr = String::from_utf8_lossy(&output.stderr);
					outcome.skip(name, format!("diff failed: {}", stderr.trim()));
					continue;
				}
			}
			outcome.done(name);
		}
		out.flush().map_err(|e| BoxError::io("stdout", e))?;
		Ok(outcome)
	}

	/// Opens each file in the configured editor, decrypting it first when
	/// only the ciphertext exists. The files are not re-encrypted.
	pub async fn edit(&mut self, names: &[String]) -> Result<Outcome> {
		check_names(names)?;
		let files = self.files()?;
		let mut outcome = Outcome::default();
		for name in names {
			if !Self::is_registered(&files, name) {
				outcome.skip(name, "not registered; use 'blackbox file add' first");
				continue;
			}
			let plain = self.plain_path(name);
			if !plain.exists() {
				if let Err(e) = self
					.crypter
					.decrypt(&plain, self.settings.umask, false)
					.await
				{
					outcome.skip(name, e);
					continue;
				}
			}

			let script = format!("{} \"$@\"", self.settings.editor);
			debug!(editor = %self.settings.editor, file = %name, "starting editor");
			let status = Command::new("sh")
				.arg("-c")
				.arg(&script)
				.arg("sh")
				.arg(&plain)
				.status()
				.await
				.map_err(|e| BoxError::Command {
					cmd: self.settings.editor.clone(),
					message: e.to_string(),
				})?;
			if !status.success() {
				return Err(BoxError::Command {
					cmd: self.settings.editor.clone(),
					message: format!("exited with {status}"),
				});
			}
			outcome.done(name);
		}
		Ok(outcome)
	}
}
