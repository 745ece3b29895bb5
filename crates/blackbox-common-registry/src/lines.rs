// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Helpers for plain, unsorted line files such as `.gitignore`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::sorted::{set_mode, REGISTRY_MODE};

/// Creates `path` empty if it does not exist, otherwise bumps its mtime.
pub fn touch(path: &Path) -> Result<()> {
	let existed = path.exists();
	let file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(path)
		.map_err(|e| RegistryError::io(path, e))?;

	if existed {
		file.set_modified(SystemTime::now())
			.map_err(|e| RegistryError::io(path, e))?;
	} else {
		set_mode(path, REGISTRY_MODE)?;
		debug!(path = %path.display(), "created empty file");
	}
	Ok(())
}

/// Appends each line not already present in `path`, creating the file if
/// needed. Returns true if the file changed.
pub fn append_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<bool> {
	let existing = match fs::read_to_string(path) {
		Ok(s) => s,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
		Err(e) => return Err(RegistryError::io(path, e)),
	};

	let mut present: Vec<&str> = existing.lines().collect();
	let mut additions = String::new();
	for line in lines {
		let line = line.as_ref();
		if present.contains(&line) {
			continue;
		}
		present.push(line);
		additions.push_str(line);
		additions.push('\n');
	}

	if additions.is_empty() {
		return Ok(false);
	}

	let mut file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(path)
		.map_err(|e| RegistryError::io(path, e))?;
	if !existing.is_empty() && !existing.ends_with('\n') {
		file.write_all(b"\n").map_err(|e| RegistryError::io(path, e))?;
	}
	file.write_all(additions.as_bytes())
		.map_err(|e| RegistryError::io(path, e))?;

	debug!(path = %path.display(), "appended lines");
	Ok(true)
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_touch_creates_and_preserves() {
		let temp = TempDir::new().unwrap();
		let path = temp.path().join("blackbox-admins.txt");

		touch(&path).unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap(), "");

		fs::write(&path, "alice@example.com\n").unwrap();
		touch(&path).unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap(), "alice@example.com\n");
	}

	/// Test: append_lines skips lines that are already present.
	///
	/// Why this test is important: `file add` runs against an existing
	/// `.gitignore`; re-adding a secret must not grow the file with duplicates.
	#[test]
	fn test_append_lines_skips_existing() {
		let temp = TempDir::new().unwrap();
		let path = temp.path().join(".gitignore");
		fs::write(&path, "/target").unwrap();

		assert!(append_lines(&path, &["/secret.txt", "/target"]).unwrap());
		assert_eq!(
			fs::read_to_string(&path).unwrap(),
			"/target\n/secret.txt\n"
		);

		assert!(!append_lines(&path, &["/secret.txt"]).unwrap());
	}

	#[test]
	fn test_append_lines_creates_file() {
		let temp = TempDir::new().unwrap();
		let path = temp.path().join(".gitattributes");
		assert!(append_lines(&path, &["\"a.txt\" text eol=lf"]).unwrap());
		assert_eq!(
			fs::read_to_string(&path).unwrap(),
			"\"a.txt\" text eol=lf\n"
		);
	}
}
