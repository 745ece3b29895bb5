// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;

use crate::blackbox::Blackbox;
use crate::error::Result;
use crate::names::check_names;
use crate::status::{classify, FileStatus};

/// One row of a status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
	pub name: String,
	pub status: FileStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl Blackbox {
	/// Classifies the named files, or every registered file when `names` is
	/// empty. Names that are not registered report `NOTREG`. With a
	/// `filter`, only entries of that status are returned.
	pub fn status(&mut self, names: &[String], filter: Option<FileStatus>) -> Result<Vec<StatusEntry>> {
		check_names(names)?;
		let (names, files) = self.names_or_all(names)?;

		let entries = names
			.into_iter()
			.map(|name| {
				if !Self::is_registered(&files, &name) {
					return StatusEntry {
						name,
						status: FileStatus::NotReg,
						error: None,
					};
				}
				let classified = classify(&self.plain_path(&name));
				StatusEntry {
					name,
					status: classified.status,
					error: classified.error.map(|e| e.to_string()),
				}
			})
			.filter(|entry| filter.map_or(true, |f| entry.status == f))
			.collect();
		Ok(entries)
	}
}

/// Renders entries as a bare name list or as an aligned table.
///
/// The table gains an ERROR column only when some entry carries an error.
pub fn render_status(entries: &[StatusEntry], name_only: bool) -> String {
	let mut out = String::new();
	if name_only {
		for entry in entries {
			out.push_str(&entry.name);
			out.push('\n');
		}
		return out;
	}

	let with_errors = entries.iter().any(|e| e.error.is_some());
	let status_width = entries
		.iter()
		.map(|e| e.status.as_str().len())
		.chain(std::iter::once("STATUS".len()))
		.max()
		.unwrap_or(0);
	let name_width = entries
		.iter()
		.map(|e| e.name.chars().count())
		.chain(std::iter::once("NAME".len()))
		.max()
		.unwrap_or(0);

	let mut line = |status: &str, name: &str, error: Option<&str>| {
		let row = match (with_errors, error) {
			(true, error) => format!(
				"{status:<status_width$}  {name:<name_width$}  {}",
				error.unwrap_or("")
			),
			(false, _) => format!("{status:<status_width$}  {name}"),
		};
		out.push_str(row.trim_end());
		out.push('\n');
	};

	line("STATUS", "NAME", Some("ERROR"));
	for entry in entries {
		line(entry.status.as_str(), &entry.name, entry.error.as_deref());
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::blackbox::testing::Fixture;
	use std::fs::File;
	use std::time::{Duration, SystemTime};

	fn names(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	fn touch_at(fx: &Fixture, name: &str, secs: u64) {
		fx.write(name, "x");
		File::options()
			.write(true)
			.open(fx.root().join(name))
			.unwrap()
			.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
			.unwrap();
	}

	/// Test: the type filter keeps only matching entries.
	///
	/// Why this test is important: `status --type DECRYPTED` is how users find
	/// plaintexts that still need encrypting before a commit.
	#[test]
	fn test_status_filter() {
		let fx = Fixture::new(&[], &["a.txt", "b.txt"]);
		touch_at(&fx, "a.txt.gpg", 1_000);
		touch_at(&fx, "a.txt", 2_000);
		touch_at(&fx, "b.txt.gpg", 1_000);
		let mut bx = fx.blackbox();

		let all = bx.status(&[], None).unwrap();
		assert_eq!(
			all.iter().map(|e| (e.name.as_str(), e.status)).collect::<Vec<_>>(),
			vec![("a.txt", FileStatus::Decrypted), ("b.txt", FileStatus::Shredded)]
		);

		let decrypted = bx.status(&[], Some(FileStatus::Decrypted)).unwrap();
		assert_eq!(decrypted.len(), 1);
		assert_eq!(decrypted[0].name, "a.txt");

		let shredded = bx.status(&[], Some(FileStatus::Shredded)).unwrap();
		assert_eq!(
			shredded.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
			vec!["b.txt"]
		);
	}

	#[test]
	fn test_status_explicit_unregistered() {
		let fx = Fixture::new(&[], &["a.txt"]);
		let mut bx = fx.blackbox();
		let entries = bx.status(&names(&["a.txt", "x.txt"]), None).unwrap();
		assert_eq!(entries[0].status, FileStatus::BothMissing);
		assert_eq!(entries[1].status, FileStatus::NotReg);
	}

	#[test]
	fn test_render_table_and_names() {
		let entries = vec![
			StatusEntry {
				name: "a.txt".into(),
				status: FileStatus::Decrypted,
				error: None,
			},
			StatusEntry {
				name: "b.txt".into(),
				status: FileStatus::Shredded,
				error: None,
			},
		];
		assert_eq!(render_status(&entries, true), "a.txt\nb.txt\n");
		assert_eq!(
			render_status(&entries, false),
			"STATUS     NAME\nDECRYPTED  a.txt\nSHREDDED   b.txt\n"
		);
	}

	#[test]
	fn test_render_error_column() {
		let entries = vec![StatusEntry {
			name: "a".into(),
			status: FileStatus::GpgError,
			error: Some("permission denied".into()),
		}];
		assert_eq!(
			render_status(&entries, false),
			"STATUS    NAME  ERROR\nGPGERROR  a     permission denied\n"
		);
	}

	#[test]
	fn test_entry_json() {
		let entry = StatusEntry {
			name: "a".into(),
			status: FileStatus::Encrypted,
			error: None,
		};
		assert_eq!(
			serde_json::to_string(&entry).unwrap(),
			r#"{"name":"a","status":"ENCRYPTED"}"#
		);
	}
}
