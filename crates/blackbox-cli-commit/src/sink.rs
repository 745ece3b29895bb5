// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::SinkError;

/// Carries out the stage and commit steps of a flush.
///
/// `dir` is the repository root the file names are relative to.
#[async_trait]
pub trait CommitSink: Send {
	async fn add(&mut self, dir: &Path, files: &[String]) -> Result<(), SinkError>;

	async fn commit(&mut self, message: &str, dir: &Path, files: &[String])
		-> Result<(), SinkError>;
}

/// Recorded call to the mock sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkCall {
	Add {
		dir: PathBuf,
		files: Vec<String>,
	},
	Commit {
		message: String,
		dir: PathBuf,
		files: Vec<String>,
	},
}

/// Mock sink for testing.
#[derive(Clone, Default)]
pub struct MockCommitSink {
	/// If set, commit fails when the message contains this text.
	pub fail_on: Option<String>,
	/// Track calls for verification.
	pub calls: Arc<Mutex<Vec<SinkCall>>>,
}

impl MockCommitSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn failing_on(mut self, needle: impl Into<String>) -> Self {
		self.fail_on = Some(needle.into());
		self
	}

	/// Returns the recorded calls.
	pub fn get_calls(&self) -> Vec<SinkCall> {
		self.calls.lock().unwrap().clone()
	}

	/// Returns only the recorded commit calls as (message, files).
	pub fn commits(&self) -> Vec<(String, Vec<String>)> {
		self.get_calls()
			.into_iter()
			.filter_map(|c| match c {
				SinkCall::Commit { message, files, .. } => Some((message, files)),
				SinkCall::Add { .. } => None,
			})
			.collect()
	}

	fn record(&self, call: SinkCall) {
		self.calls.lock().unwrap().push(call);
	}
}

#[async_trait]
impl CommitSink for MockCommitSink {
	async fn add(&mut self, dir: &Path, files: &[String]) -> Result<(), SinkError> {
		self.record(SinkCall::Add {
			dir: dir.to_path_buf(),
			files: files.to_vec(),
		});
		Ok(())
	}

	async fn commit(
		&mut self,
		message: &str,
		dir: &Path,
		files: &[String],
	) -> Result<(), SinkError> {
		self.record(SinkCall::Commit {
			message: message.to_string(),
			dir: dir.to_path_buf(),
			files: files.to_vec(),
		});
		match &self.fail_on {
			Some(needle) if message.contains(needle.as_str()) => {
				Err(format!("mock commit failure: {message}").into())
			}
			_ => Ok(()),
		}
	}
}
