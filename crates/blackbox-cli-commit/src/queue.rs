// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CommitError;
use crate::sink::CommitSink;

/// A commit requested by a verb, to be carried out at flush time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommit {
	pub message: String,
	pub dir: PathBuf,
	pub files: Vec<String>,
}

/// One commit as it will be executed by [`CommitQueue::flush`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCommit {
	pub message: String,
	pub dir: PathBuf,
	/// File groups staged before the commit, one per original request.
	pub adds: Vec<Vec<String>>,
	/// Files named on the commit itself.
	pub files: Vec<String>,
}

/// Outcome of a successful flush.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushSummary {
	pub commits: usize,
	pub merged: bool,
}

/// Ordered list of pending commits plus an optional umbrella title.
///
/// Verbs only enqueue; nothing touches version control until [`flush`] runs.
/// When a title is set and every pending commit shares one directory, the
/// batch collapses into a single commit whose message is the title followed
/// by one `    * ` line per original message.
///
/// [`flush`]: CommitQueue::flush
#[derive(Debug, Clone, Default)]
pub struct CommitQueue {
	items: Vec<PendingCommit>,
	title: Option<String>,
}

impl CommitQueue {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn enqueue(&mut self, message: impl Into<String>, dir: impl Into<PathBuf>, files: Vec<String>) {
		let item = PendingCommit {
			message: message.into(),
			dir: dir.into(),
			files,
		};
		debug!(message = %item.message, files = item.files.len(), "queued commit");
		self.items.push(item);
	}

	pub fn set_title(&mut self, title: impl Into<String>) {
		self.title = Some(title.into());
	}

	pub fn title(&self) -> Option<&str> {
		self.title.as_deref()
	}

	pub fn pending(&self) -> &[PendingCommit] {
		&self.items
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Groups the pending commits without executing anything.
	pub fn plan(&self) -> Vec<PlannedCommit> {
		if let Some(title) = self.mergeable_title() {
			let mut message = title.to_string();
			let mut files: Vec<String> = Vec::new();
			for item in &self.items {
				message.push_str("\n    * ");
				message.push_str(&item.message);
				for f in &item.files {
					if !files.contains(f) {
						files.push(f.clone());
					}
				}
			}
			return vec![PlannedCommit {
				message,
				dir: self.items[0].dir.clone(),
				adds: self.items.iter().map(|i| i.files.clone()).collect(),
				files,
			}];
		}

		self.items
			.iter()
			.map(|i| PlannedCommit {
				message: i.message.clone(),
				dir: i.dir.clone(),
				adds: vec![i.files.clone()],
				files: i.files.clone(),
			})
			.collect()
	}

	fn mergeable_title(&self) -> Option<&str> {
		let title = self.title.as_deref()?;
		if self.items.len() < 2 {
			return None;
		}
		let dir: &Path = &self.items[0].dir;
		self.items
			.iter()
			.all(|i| i.dir == dir)
			.then_some(title)
	}

	/// Executes the plan through `sink`, draining the queue.
	///
	/// The first failing step aborts the rest; commits already made stay.
	pub async fn flush<S>(&mut self, sink: &mut S) -> Result<FlushSummary, CommitError>
	where
		S: CommitSink + ?Sized,
	{
		let plan = self.plan();
		let merged = self.mergeable_title().is_some();
		self.items.clear();
		self.title = None;

		let mut summary = FlushSummary {
			commits: 0,
			merged,
		};
		for step in plan {
			for files in &step.adds {
				sink.add(&step.dir, files)
					.await
					.map_err(|source| CommitError::Add {
						files: files.clone(),
						source,
					})?;
			}
			sink.commit(&step.message, &step.dir, &step.files)
				.await
				.map_err(|source| CommitError::Commit {
					files: step.files.clone(),
					source,
				})?;
			summary.commits += 1;
		}

		if summary.commits > 0 {
			info!(commits = summary.commits, merged, "flushed commits");
		}
		Ok(summary)
	}
}
