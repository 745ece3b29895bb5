// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use blackbox_common_backend::CIPHERTEXT_SUFFIX;

use crate::error::{BoxError, Result};

/// Rejects names the registry cannot hold and names that point at a
/// ciphertext instead of its plaintext.
pub fn check_names<S: AsRef<str>>(names: &[S]) -> Result<()> {
	for name in names {
		let name = name.as_ref();
		if name.is_empty() {
			return Err(BoxError::invalid_name(name, "empty file name"));
		}
		if name.contains(['\n', '\r']) {
			return Err(BoxError::invalid_name(name, "file names may not contain line breaks"));
		}
		if let Some(stem) = name.strip_suffix(CIPHERTEXT_SUFFIX) {
			return Err(BoxError::invalid_name(
				name,
				format!("specify {stem:?} not {name:?}"),
			));
		}
	}
	Ok(())
}

/// Like [`check_names`], and also rejects a name given twice.
pub fn check_unique_names<S: AsRef<str>>(names: &[S]) -> Result<()> {
	check_names(names)?;
	let mut seen = HashSet::new();
	for name in names {
		if !seen.insert(name.as_ref()) {
			return Err(BoxError::invalid_name(name.as_ref(), "listed more than once"));
		}
	}
	Ok(())
}

/// Turns a name given relative to `cwd` (or absolute) into a path relative
/// to `repo_root`, using `/` separators.
pub fn repo_relative(repo_root: &Path, cwd: &Path, name: &str) -> Result<String> {
	let joined = if Path::new(name).is_absolute() {
		PathBuf::from(name)
	} else {
		cwd.join(name)
	};
	let cleaned = lexical_clean(&joined);
	let rel = cleaned
		.strip_prefix(repo_root)
		.map_err(|_| BoxError::invalid_name(name, format!("outside the repository at {}", repo_root.display())))?;
	if rel.as_os_str().is_empty() {
		return Err(BoxError::invalid_name(name, "names the repository root"));
	}

	let parts: Vec<String> = rel
		.components()
		.map(|c| c.as_os_str().to_string_lossy().into_owned())
		.collect();
	Ok(parts.join("/"))
}

/// Resolves `.` and `..` without touching the filesystem.
fn lexical_clean(path: &Path) -> PathBuf {
	let mut out = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				out.pop();
			}
			other => out.push(other.as_os_str()),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_check_names_rejects_ciphertext() {
		let err = check_names(&["a.txt", "b.txt.gpg"]).unwrap_err();
		assert!(err.to_string().contains("specify \"b.txt\" not \"b.txt.gpg\""));
	}

	#[test]
	fn test_check_names_rejects_line_breaks() {
		assert!(check_names(&["a\nb"]).is_err());
		assert!(check_names(&["a\rb"]).is_err());
		assert!(check_names(&[""]).is_err());
		assert!(check_names(&["dir/a b"]).is_ok());
	}

	#[test]
	fn test_check_unique_names() {
		assert!(check_unique_names(&["a", "b"]).is_ok());
		assert!(check_unique_names(&["a", "b", "a"]).is_err());
	}

	/// Test: names typed in a subdirectory become repository-relative.
	///
	/// Why this test is important: The files registry is keyed by
	/// repository-relative names; a cwd-relative name would never match.
	#[test]
	fn test_repo_relative() {
		let root = Path::new("/repo");
		assert_eq!(
			repo_relative(root, Path::new("/repo/sub"), "s.txt").unwrap(),
			"sub/s.txt"
		);
		assert_eq!(
			repo_relative(root, Path::new("/repo/sub"), "../top.txt").unwrap(),
			"top.txt"
		);
		assert_eq!(
			repo_relative(root, Path::new("/elsewhere"), "/repo/a/./b").unwrap(),
			"a/b"
		);
		assert!(repo_relative(root, Path::new("/repo"), "../x").is_err());
		assert!(repo_relative(root, Path::new("/repo"), ".").is_err());
	}
}
