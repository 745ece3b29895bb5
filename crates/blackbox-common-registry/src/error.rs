// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or mutating a registry file.
#[derive(Debug, Error)]
pub enum RegistryError {
	#[error("registry {} is corrupt: {reason}", path.display())]
	Corrupt { path: PathBuf, reason: String },

	#[error("{entry:?} is already listed in {}", path.display())]
	Duplicate { path: PathBuf, entry: String },

	#[error("{entry:?} is not listed in {}", path.display())]
	NotFound { path: PathBuf, entry: String },

	#[error("invalid registry entry {entry:?}: {reason}")]
	InvalidEntry { entry: String, reason: &'static str },

	#[error("I/O error on {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

pub type Result<T> = std::result::Result<T, RegistryError>;

impl RegistryError {
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io {
			path: path.into(),
			source,
		}
	}

	pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
		Self::Corrupt {
			path: path.into(),
			reason: reason.into(),
		}
	}

	/// True when the registry file itself is unreadable as a registry.
	pub fn is_corrupt(&self) -> bool {
		matches!(self, Self::Corrupt { .. })
	}
}
