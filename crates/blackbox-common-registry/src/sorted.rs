// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::error::{RegistryError, Result};

/// File mode applied to every registry rewrite.
pub const REGISTRY_MODE: u32 = 0o660;

/// A registry persisted as a strictly ascending, newline-delimited list.
///
/// The on-disk form is authoritative: content that is not strictly sorted is
/// reported as corrupt rather than repaired. Every mutation rewrites the whole
/// file through a temporary sibling and a rename, so readers never observe a
/// half-written registry.
#[derive(Debug, Clone)]
pub struct SortedFile {
	path: PathBuf,
}

impl SortedFile {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn exists(&self) -> bool {
		self.path.is_file()
	}

	/// Reads and validates the registry.
	pub fn load(&self) -> Result<Vec<String>> {
		let bytes = fs::read(&self.path).map_err(|e| RegistryError::io(&self.path, e))?;
		let content = String::from_utf8(bytes)
			.map_err(|_| RegistryError::corrupt(&self.path, "content is not valid UTF-8"))?;
		let entries = parse(&self.path, &content)?;
		trace!(path = %self.path.display(), count = entries.len(), "loaded registry");
		Ok(entries)
	}

	pub fn contains(&self, entry: &str) -> Result<bool> {
		Ok(contains_sorted(&self.load()?, entry))
	}

	/// Adds `entries`, keeping the file sorted.
	///
	/// Fails without touching the file if any entry is invalid, already
	/// present, or repeated within `entries`.
	pub fn append<S: AsRef<str>>(&self, entries: &[S]) -> Result<Vec<String>> {
		let mut current = self.load()?;

		let mut incoming: Vec<&str> = Vec::with_capacity(entries.len());
		for entry in entries {
			let entry = entry.as_ref();
			validate_entry(entry)?;
			if contains_sorted(&current, entry) || incoming.contains(&entry) {
				return Err(RegistryError::Duplicate {
					path: self.path.clone(),
					entry: entry.to_string(),
				});
			}
			incoming.push(entry);
		}

		if incoming.is_empty() {
			return Ok(current);
		}

		current.extend(incoming.iter().map(|e| e.to_string()));
		current.sort();
		self.write(&current)?;

		debug!(
			path = %self.path.display(),
			added = incoming.len(),
			total = current.len(),
			"appended to registry"
		);
		Ok(current)
	}

	/// Removes `entries`. Every entry must currently be listed.
	pub fn remove<S: AsRef<str>>(&self, entries: &[S]) -> Result<Vec<String>> {
		let mut current = self.load()?;

		for entry in entries {
			let entry = entry.as_ref();
			match current.binary_search_by(|probe| probe.as_str().cmp(entry)) {
				Ok(idx) => {
					current.remove(idx);
				}
				Err(_) => {
					return Err(RegistryError::NotFound {
						path: self.path.clone(),
						entry: entry.to_string(),
					});
				}
			}
		}

		self.write(&current)?;
		debug!(
			path = %self.path.display(),
			removed = entries.len(),
			total = current.len(),
			"removed from registry"
		);
		Ok(current)
	}

	fn write(&self, entries: &[String]) -> Result<()> {
		let dir = match self.path.parent() {
			Some(p) if !p.as_os_str().is_empty() => p,
			_ => Path::new("."),
		};

		let mut tmp = NamedTempFile::new_in(dir).map_err(|e| RegistryError::io(dir, e))?;
		for entry in entries {
			writeln!(tmp, "{entry}").map_err(|e| RegistryError::io(tmp.path(), e))?;
		}
		tmp.as_file()
			.sync_all()
			.map_err(|e| RegistryError::io(tmp.path(), e))?;
		set_mode(tmp.path(), REGISTRY_MODE)?;
		tmp.persist(&self.path)
			.map_err(|e| RegistryError::io(&self.path, e.error))?;
		Ok(())
	}
}

/// Parses registry content, rejecting anything that is not strictly sorted.
pub fn parse(path: &Path, content: &str) -> Result<Vec<String>> {
	let body = content.strip_suffix('\n').unwrap_or(content);
	if body.is_empty() {
		return Ok(Vec::new());
	}

	let mut entries: Vec<String> = Vec::new();
	for (idx, line) in body.split('\n').enumerate() {
		let lineno = idx + 1;
		if line.is_empty() {
			return Err(RegistryError::corrupt(path, format!("blank line {lineno}")));
		}
		if line.contains('\r') {
			return Err(RegistryError::corrupt(
				path,
				format!("carriage return on line {lineno}"),
			));
		}
		if let Some(prev) = entries.last() {
			if prev.as_str() == line {
				return Err(RegistryError::corrupt(
					path,
					format!("duplicate entry {line:?} on line {lineno}"),
				));
			}
			if prev.as_str() > line {
				return Err(RegistryError::corrupt(
					path,
					format!("entry {line:?} on line {lineno} is out of order"),
				));
			}
		}
		entries.push(line.to_string());
	}
	Ok(entries)
}

/// Binary-search membership test over an already sorted list.
pub fn contains_sorted(sorted: &[String], entry: &str) -> bool {
	sorted
		.binary_search_by(|probe| probe.as_str().cmp(entry))
		.is_ok()
}

/// Checks that `entry` can be stored as a single registry line.
pub fn validate_entry(entry: &str) -> Result<()> {
	if entry.is_empty() {
		return Err(RegistryError::InvalidEntry {
			entry: entry.to_string(),
			reason: "entry is empty",
		});
	}
	if entry.contains('\n') || entry.contains('\r') {
		return Err(RegistryError::InvalidEntry {
			entry: entry.to_string(),
			reason: "entry contains a line terminator",
		});
	}
	Ok(())
}

#[cfg(unix)]
pub(crate) fn set_mode(path: &Path, mode: u32) -> Result<()> {
	use std::os::unix::fs::PermissionsExt;
	fs::set_permissions(path, fs::Permissions::from_mode(mode))
		.map_err(|e| RegistryError::io(path, e))
}

#[cfg(not(unix))]
pub(crate) fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
	Ok(())
}
