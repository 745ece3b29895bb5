// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secure deletion of plaintext files.

use std::fs;
use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, trace};

/// Secure-erase commands tried in order, with the flags that make each one
/// delete the file after overwriting it.
pub const SHRED_CANDIDATES: [(&str, &str); 4] = [
	("sdelete", "-a"),
	("shred", "-u"),
	("srm", "-f"),
	("rm", "-Pf"),
];

/// Deletes files, overwriting them first when a secure-erase command is
/// available.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Shredder {
	command: Option<(String, String)>,
}

impl Shredder {
	/// Picks the first candidate that successfully erases a scratch file.
	pub async fn probe() -> Self {
		for (program, flag) in SHRED_CANDIDATES {
			match try_candidate(program, flag).await {
				Ok(true) => {
					debug!(program, flag, "selected secure delete command");
					return Self::with_command(program, flag);
				}
				Ok(false) => trace!(program, "secure delete candidate left the file behind"),
				Err(e) => trace!(program, error = %e, "secure delete candidate unavailable"),
			}
		}
		debug!("no secure delete command found; falling back to unlink");
		Self::unlink_only()
	}

	pub fn with_command(program: impl Into<String>, flag: impl Into<String>) -> Self {
		Self {
			command: Some((program.into(), flag.into())),
		}
	}

	/// Plain removal, no overwrite.
	pub fn unlink_only() -> Self {
		Self { command: None }
	}

	/// Command line used, for display.
	pub fn describe(&self) -> String {
		match &self.command {
			Some((program, flag)) => format!("{program} {flag}"),
			None => "(none; files are unlinked)".to_string(),
		}
	}

	/// Erases one regular file.
	pub async fn shred(&self, path: &Path) -> io::Result<()> {
		let meta = fs::symlink_metadata(path)?;
		if !meta.file_type().is_file() {
			return Err(io::Error::new(
				io::ErrorKind::InvalidInput,
				"not a regular file",
			));
		}

		let Some((program, flag)) = &self.command else {
			return fs::remove_file(path);
		};

		let output = Command::new(program)
			.arg(flag)
			.arg(path)
			.stdin(Stdio::null())
			.output()
			.await?;
		if !output.status.success() {
			return Err(io::Error::other(format!(
				"{program} {flag} exited with {}: {}",
				output.status,
				String::from_utf8_lossy(&output.stderr).trim()
			)));
		}
		Ok(())
	}
}

async fn try_candidate(program: &str, flag: &str) -> io::Result<bool> {
	let scratch = tempfile::Builder::new()
		.prefix("shredTemp.")
		.tempfile()?
		.into_temp_path();

	let status = Command::new(program)
		.arg(flag)
		.arg(&*scratch)
		.stdin(Stdio::null())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.status()
		.await?;

	let gone = !scratch.exists();
	// The candidate may already have removed it.
	let _ = scratch.close();
	Ok(status.success() && gone)
}
