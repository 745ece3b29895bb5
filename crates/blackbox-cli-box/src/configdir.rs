// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locating the directory that holds the registries and keyring.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{BoxError, Result};

/// Directory levels walked upward before giving up.
pub const MAX_DIR_LEVELS: usize = 100;

pub const DEFAULT_CONFIG_DIR: &str = ".blackbox";
pub const LEGACY_CONFIG_DIR: &str = "keyrings/live";

/// Names of config dirs to look for, most specific first.
pub fn candidates(team: Option<&str>) -> Vec<String> {
	let mut out = Vec::with_capacity(3);
	if let Some(team) = team.filter(|t| !t.is_empty()) {
		out.push(format!("{DEFAULT_CONFIG_DIR}-{team}"));
	}
	out.push(DEFAULT_CONFIG_DIR.to_string());
	out.push(LEGACY_CONFIG_DIR.to_string());
	out
}

/// A located config dir and the repository base it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
	pub repo_root: PathBuf,
	pub config_dir: PathBuf,
}

/// Walks from `start` toward `/` looking for a config dir.
pub fn find_config_dir(start: &Path, team: Option<&str>) -> Result<Located> {
	let names = candidates(team);
	debug!(start = %start.display(), candidates = ?names, "searching for config dir");

	let mut dir = start.to_path_buf();
	for _ in 0..MAX_DIR_LEVELS {
		for name in &names {
			let candidate = dir.join(name);
			trace!(candidate = %candidate.display(), "trying");
			if is_dir(&candidate)? {
				return Ok(Located {
					repo_root: dir,
					config_dir: candidate,
				});
			}
		}
		if !dir.pop() {
			break;
		}
	}

	Err(BoxError::ConfigDirNotFound {
		start: start.to_path_buf(),
	})
}

/// Config dir for a repository that has not been initialized yet.
pub fn generate_config_dir(repo_root: &Path, configured: Option<&Path>, team: Option<&str>) -> PathBuf {
	match configured {
		Some(dir) if dir.is_absolute() => dir.to_path_buf(),
		Some(dir) => repo_root.join(dir),
		None => match team.filter(|t| !t.is_empty()) {
			Some(team) => repo_root.join(format!("{DEFAULT_CONFIG_DIR}-{team}")),
			None => repo_root.join(DEFAULT_CONFIG_DIR),
		},
	}
}

/// Checks an explicitly configured config dir, resolving it against `cwd`.
pub fn existing_config_dir(cwd: &Path, configured: &Path) -> Result<PathBuf> {
	let dir = cwd.join(configured);
	match std::fs::metadata(&dir) {
		Ok(meta) if meta.is_dir() => Ok(dir),
		Ok(_) => Err(BoxError::ConfigDir {
			path: dir,
			source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
		}),
		Err(source) => Err(BoxError::ConfigDir { path: dir, source }),
	}
}

fn is_dir(path: &Path) -> Result<bool> {
	match std::fs::metadata(path) {
		Ok(meta) => Ok(meta.is_dir()),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
		Err(e) if e.raw_os_error() == Some(libc::ENOTDIR) => Ok(false),
		Err(source) => Err(BoxError::ConfigDir {
			path: path.to_path_buf(),
			source,
		}),
	}
}
