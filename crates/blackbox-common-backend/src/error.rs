// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use blackbox_cli_commit::CommitError;
use blackbox_common_registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
	#[error("no {kind} backend named {name:?} (available: {})", available.join(", "))]
	Unresolved {
		kind: &'static str,
		name: String,
		available: Vec<String>,
	},

	#[error("{0} is not installed or not in PATH")]
	ToolNotInstalled(String),

	#[error("{cmd} {} failed: {stderr}", args.join(" "))]
	CommandFailed {
		cmd: String,
		args: Vec<String>,
		stderr: String,
	},

	#[error("{0}")]
	Other(String),

	#[error(transparent)]
	Commit(#[from] CommitError),

	#[error(transparent)]
	Registry(#[from] RegistryError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BackendError>;

impl BackendError {
	pub fn other<E: std::fmt::Display>(e: E) -> Self {
		Self::Other(e.to_string())
	}
}
