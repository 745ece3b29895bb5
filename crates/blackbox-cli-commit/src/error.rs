// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Error type returned by a [`crate::CommitSink`].
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum CommitError {
	#[error("adding files ({files:?}) failed: {source}")]
	Add {
		files: Vec<String>,
		#[source]
		source: SinkError,
	},

	#[error("commit files ({files:?}) failed: {source}")]
	Commit {
		files: Vec<String>,
		#[source]
		source: SinkError,
	},

	#[error("unknown commit mode: {0}")]
	UnknownMode(String),
}
