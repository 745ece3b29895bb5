// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use blackbox_common_backend::BackendError;
use blackbox_common_registry::RegistryError;
use thiserror::Error;

/// Errors that stop a verb before or instead of completing it.
///
/// Per-file problems inside a bulk verb are not errors; they are recorded
/// as skips on the [`crate::Outcome`].
#[derive(Debug, Error)]
pub enum BoxError {
	#[error(transparent)]
	Registry(#[from] RegistryError),

	#[error(transparent)]
	Backend(#[from] BackendError),

	#[error("{0:?} is not registered with blackbox")]
	NotRegistered(String),

	#[error("{0:?} is already registered")]
	AlreadyRegistered(String),

	#[error("invalid name {name:?}: {reason}")]
	InvalidName { name: String, reason: String },

	#[error("no .blackbox directory found in {} or above", start.display())]
	ConfigDirNotFound { start: PathBuf },

	#[error("config dir {}: {source}", path.display())]
	ConfigDir {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("this command is disabled when the config dir is given explicitly; run it from the repository without --config")]
	ConfigReadOnly,

	#[error("the admin list is empty; add one with 'blackbox admin add'")]
	NoAdmins,

	#[error("unknown group {0:?}")]
	UnknownGroup(String),

	#[error("{cmd} failed: {message}")]
	Command { cmd: String, message: String },

	#[error("I/O error on {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("aborted by user")]
	Aborted,
}

pub type Result<T> = std::result::Result<T, BoxError>;

impl BoxError {
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io {
			path: path.into(),
			source,
		}
	}

	pub(crate) fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidName {
			name: name.into(),
			reason: reason.into(),
		}
	}
}
