// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use blackbox_cli_commit::CommitMode;
use tracing::debug;

use crate::crypter::Crypter;
use crate::error::{BackendError, Result};
use crate::vcs::Vcs;

/// Options handed to every backend constructor.
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
	pub debug: bool,
	pub commit_mode: CommitMode,
}

/// Builds a backend instance.
pub type Constructor<T> = fn(&BackendOptions) -> Box<T>;

pub struct BackendDescriptor<T: ?Sized> {
	pub name: &'static str,
	pub priority: i32,
	pub constructor: Constructor<T>,
}

/// Named backends ordered by descending priority.
///
/// Built once at startup from each backend crate's `register` function and
/// read-only afterwards.
pub struct Catalog<T: ?Sized> {
	kind: &'static str,
	entries: Vec<BackendDescriptor<T>>,
}

pub type CrypterCatalog = Catalog<dyn Crypter>;
pub type VcsCatalog = Catalog<dyn Vcs>;

impl<T: ?Sized> Catalog<T> {
	pub fn new(kind: &'static str) -> Self {
		Self {
			kind,
			entries: Vec::new(),
		}
	}

	/// Adds a backend. Equal priorities keep registration order.
	pub fn register(&mut self, name: &'static str, priority: i32, constructor: Constructor<T>) {
		debug!(kind = self.kind, name, priority, "registered backend");
		self.entries.push(BackendDescriptor {
			name,
			priority,
			constructor,
		});
		self.entries.sort_by(|a, b| b.priority.cmp(&a.priority));
	}

	/// Looks a backend up by name, ignoring case.
	pub fn descriptor(&self, name: &str) -> Option<&BackendDescriptor<T>> {
		self.entries
			.iter()
			.find(|e| e.name.eq_ignore_ascii_case(name))
	}

	/// Instantiates the backend called `name`, ignoring case.
	pub fn resolve(&self, name: &str, options: &BackendOptions) -> Result<Box<T>> {
		match self.descriptor(name) {
			Some(entry) => Ok((entry.constructor)(options)),
			None => Err(BackendError::Unresolved {
				kind: self.kind,
				name: name.to_string(),
				available: self.names().iter().map(|n| n.to_string()).collect(),
			}),
		}
	}

	pub fn names(&self) -> Vec<&'static str> {
		self.entries.iter().map(|e| e.name).collect()
	}

	pub fn iter(&self) -> impl Iterator<Item = &BackendDescriptor<T>> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Probes every repository backend in priority order and returns the first
/// one that recognizes `dir`, along with the repository root it reported.
pub async fn discover_vcs(
	catalog: &VcsCatalog,
	dir: &Path,
	options: &BackendOptions,
) -> Option<(Box<dyn Vcs>, PathBuf)> {
	for entry in catalog.iter() {
		let vcs = (entry.constructor)(options);
		if let Some(root) = vcs.discover(dir).await {
			debug!(vcs = entry.name, root = %root.display(), "discovered repository");
			return Some((vcs, root));
		}
	}
	None
}
